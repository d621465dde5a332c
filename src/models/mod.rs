pub mod daily;
pub mod kpi;
pub mod report;

pub use daily::*;
pub use kpi::*;
pub use report::*;

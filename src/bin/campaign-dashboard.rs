//! Command-line front end for the campaign dashboard.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use campaign_dashboard::fixtures::{self, FixtureConfig};
use campaign_dashboard::report::{render_json, render_options_text, render_text};
use campaign_dashboard::{config, logging, shell};
use campaign_dashboard::{Dashboard, DashboardRequest, PeriodInput};

#[derive(Parser, Debug)]
#[command(
    name = "campaign-dashboard",
    version,
    about = "Executive campaign analytics over a daily marketing mart"
)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Mart location: .duckdb/.db file, .csv/.csv.gz/.parquet export, or http(s) URL
    #[arg(long, global = true, env = "CAMPAIGN_DASHBOARD_SOURCE")]
    source: Option<String>,

    /// Table or view to read (may be schema-qualified)
    #[arg(
        long,
        global = true,
        env = "CAMPAIGN_DASHBOARD_TABLE",
        default_value = config::DEFAULT_TABLE
    )]
    table: String,

    /// Directory for downloaded remote exports
    #[arg(long, global = true, env = "CAMPAIGN_DASHBOARD_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Reuse previously downloaded exports instead of fetching
    #[arg(long, global = true)]
    offline: bool,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the dashboard once
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List the values the filters accept
    Options,
    /// Write the filtered rows to campaign_daily_filtered.csv
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Interactive session; reads commands from stdin
    Shell {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Write synthetic raw fixtures
    GenerateFixtures(FixtureArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// all, YYYY-MM-DD, or START..END (default: last 60 days of data)
    #[arg(long)]
    period: Option<PeriodInput>,
    /// Exact campaign name ("All" for no filter)
    #[arg(long)]
    campaign: Option<String>,
    /// Exact campaign id ("All" for no filter)
    #[arg(long)]
    campaign_id: Option<String>,
    /// Skip the previous-period comparison
    #[arg(long)]
    no_compare: bool,
    /// Case-insensitive search over the data table
    #[arg(long)]
    search: Option<String>,
}

impl FilterArgs {
    /// The request these flags describe, with `--period` kept inside the
    /// dates the mart covers.
    fn into_request(self, dashboard: &Dashboard) -> Result<DashboardRequest> {
        let all = |value: Option<String>| value.filter(|v| !v.eq_ignore_ascii_case("all"));
        let period = self
            .period
            .map(|input| dashboard.bounded_period(input))
            .transpose()?;
        Ok(DashboardRequest {
            period,
            campaign_name: all(self.campaign),
            campaign_id: all(self.campaign_id),
            compare_previous: !self.no_compare,
            search: self.search,
        })
    }
}

#[derive(Args, Debug)]
struct FixtureArgs {
    #[arg(long, default_value = "data/raw")]
    out_dir: PathBuf,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 1200)]
    customers: usize,
    #[arg(long, default_value_t = 8000)]
    transactions: usize,
    /// Distinct customers sampled for activation
    #[arg(long, default_value_t = 600)]
    activations: usize,
    /// Activation rows duplicated on purpose
    #[arg(long, default_value_t = 50)]
    duplicates: usize,
    /// Write .csv.gz files
    #[arg(long)]
    gzip: bool,
    /// Also derive mrt_campaign_daily from the generated data
    #[arg(long)]
    daily_mart: bool,
}

impl From<FixtureArgs> for FixtureConfig {
    fn from(args: FixtureArgs) -> Self {
        FixtureConfig {
            out_dir: args.out_dir,
            seed: args.seed,
            customers: args.customers,
            transactions: args.transactions,
            activations: args.activations,
            duplicate_activations: args.duplicates,
            gzip: args.gzip,
            daily_mart: args.daily_mart,
        }
    }
}

fn open_dashboard(args: &SourceArgs) -> Result<Dashboard> {
    let Some(source) = args.source.as_deref() else {
        bail!("no mart source given; pass --source or set CAMPAIGN_DASHBOARD_SOURCE");
    };
    let mut builder = Dashboard::builder()
        .source(source)
        .table(args.table.as_str())
        .offline(args.offline);
    if let Some(dir) = &args.cache_dir {
        builder = builder.cache_dir(dir);
    }
    let dashboard = builder.build().context("failed to set up the dashboard")?;
    tracing::debug!(%dashboard, "dashboard ready");
    Ok(dashboard)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.source.verbose);

    match cli.command {
        Command::GenerateFixtures(args) => {
            let written = fixtures::write_fixtures(&args.into())?;
            for path in written {
                println!("{}", path.display());
            }
        }
        Command::Options => {
            let dashboard = open_dashboard(&cli.source)?;
            print!("{}", render_options_text(&dashboard.options()?));
        }
        Command::Report { filters, format } => {
            let dashboard = open_dashboard(&cli.source)?;
            let page = dashboard.render(&filters.into_request(&dashboard)?)?;
            match format {
                Format::Text => print!("{}", render_text(&page)),
                Format::Json => println!("{}", render_json(&page)?),
            }
        }
        Command::Export { filters, out_dir } => {
            let dashboard = open_dashboard(&cli.source)?;
            match dashboard.export(&filters.into_request(&dashboard)?, &out_dir)? {
                Some(path) => println!("{}", path.display()),
                None => eprintln!("No data for the selected period and filters; nothing exported."),
            }
        }
        Command::Shell { filters } => {
            let dashboard = open_dashboard(&cli.source)?;
            let stdin = io::stdin();
            shell::run(&dashboard, filters.into_request(&dashboard)?, stdin.lock(), io::stdout().lock())?;
        }
    }
    Ok(())
}

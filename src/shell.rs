//! Line-oriented interactive session over a [`Dashboard`].
//!
//! Each command mutates the current [`DashboardRequest`] and the page is
//! rendered again from scratch, the same way a widget change reruns the whole
//! pipeline. Only the mart fetch is cached between commands.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::error::Result;
use crate::period::PeriodInput;
use crate::report::{render_options_text, render_text};
use crate::{Dashboard, DashboardRequest};

const HELP: &str = "\
Commands:
  period <all|YYYY-MM-DD|START..END|default>  set the date filter
  campaign <NAME|all>                         filter by campaign name
  id <ID|all>                                 filter by campaign id
  compare <on|off>                            toggle the previous-period comparison
  search [QUERY]                              search the data table (empty clears)
  export [DIR]                                write the shown rows as CSV (default .)
  refresh                                     drop the cached mart and reload
  show                                        render the page again
  options                                     list filter values
  help                                        this text
  quit                                        leave the session
";

#[derive(Debug, PartialEq)]
enum Command {
    Period(Option<PeriodInput>),
    Campaign(Option<String>),
    Id(Option<String>),
    Compare(bool),
    Search(Option<String>),
    Export(PathBuf),
    Refresh,
    Show,
    Options,
    Help,
    Quit,
}

/// `all` (any case) clears a categorical filter.
fn choice(arg: &str) -> Option<String> {
    if arg.is_empty() || arg.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(arg.to_string())
    }
}

fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((w, a)) => (w, a.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "period" if arg.eq_ignore_ascii_case("default") => Ok(Command::Period(None)),
        "period" => arg
            .parse::<PeriodInput>()
            .map(|p| Command::Period(Some(p)))
            .map_err(|e| e.to_string()),
        "campaign" => Ok(Command::Campaign(choice(arg))),
        "id" => Ok(Command::Id(choice(arg))),
        "compare" => match arg.to_ascii_lowercase().as_str() {
            "on" => Ok(Command::Compare(true)),
            "off" => Ok(Command::Compare(false)),
            other => Err(format!("compare expects on or off, got '{other}'")),
        },
        "search" => Ok(Command::Search(Some(arg.to_string()).filter(|q| !q.is_empty()))),
        "export" => Ok(Command::Export(PathBuf::from(if arg.is_empty() { "." } else { arg }))),
        "refresh" => Ok(Command::Refresh),
        "show" => Ok(Command::Show),
        "options" => Ok(Command::Options),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

/// Run the session until `quit` or end of input.
///
/// Command mistakes and failed exports are reported on `output` and the
/// session continues; I/O failures and data-source errors end it. Entered
/// periods are kept inside the dates the mart covers.
pub fn run<R: BufRead, W: Write>(
    dashboard: &Dashboard,
    mut request: DashboardRequest,
    input: R,
    mut output: W,
) -> Result<()> {
    writeln!(output, "{}", render_text(&dashboard.render(&request)?))?;
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            write!(output, "> ")?;
            output.flush()?;
            continue;
        }

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(output, "error: {message}")?;
                write!(output, "> ")?;
                output.flush()?;
                continue;
            }
        };
        tracing::debug!(?command, "shell command");

        let rerender = match command {
            Command::Quit => break,
            Command::Help => {
                write!(output, "{HELP}")?;
                false
            }
            Command::Options => {
                writeln!(output, "{}", render_options_text(&dashboard.options()?))?;
                false
            }
            Command::Export(dir) => {
                match dashboard.export(&request, &dir) {
                    Ok(Some(path)) => writeln!(output, "exported to {}", path.display())?,
                    Ok(None) => writeln!(output, "nothing to export")?,
                    Err(e) => {
                        tracing::warn!(dir = %dir.display(), error = %e, "export failed");
                        writeln!(output, "error: {e}")?;
                    }
                }
                false
            }
            Command::Refresh => {
                dashboard.refresh();
                true
            }
            Command::Show => true,
            Command::Period(None) => {
                request.period = None;
                true
            }
            Command::Period(Some(input)) => {
                let bounded = dashboard.bounded_period(input)?;
                if bounded != input {
                    let options = dashboard.options()?;
                    writeln!(
                        output,
                        "note: dates limited to {} → {}",
                        options.min_date, options.max_date
                    )?;
                }
                request.period = Some(bounded);
                true
            }
            Command::Campaign(name) => {
                request.campaign_name = name;
                true
            }
            Command::Id(id) => {
                request.campaign_id = id;
                true
            }
            Command::Compare(on) => {
                request.compare_previous = on;
                true
            }
            Command::Search(query) => {
                request.search = query;
                true
            }
        };

        if rerender {
            writeln!(output, "{}", render_text(&dashboard.render(&request)?))?;
        }
        write!(output, "> ")?;
        output.flush()?;
    }

    writeln!(output)?;
    Ok(())
}

mod app;
mod attendance;
mod calendar;
mod client;
mod config;
mod detail;
mod excuse;
mod help;
mod jumpto;
mod popup;
mod theme;
mod view;
use crate::app::App;
use crate::calendar::YearMonth;
use crate::client::{ApiClient, Role, DEFAULT_SERVER};
use crate::config::{Config, Options};
use crate::view::{ClassView, StudentView};
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

const LOG_FILTER_VAR: &str = "ATTENDCAL_LOG";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(Options),
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = Options::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('s') | Arg::Long("server") => {
                    opts.server = Some(parser.value()?.string()?);
                }
                Arg::Short('u') | Arg::Long("user") => {
                    opts.user = Some(parser.value()?.string()?);
                }
                Arg::Long("log-file") => opts.log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if opts.month.is_none() => {
                    opts.month = Some(value.parse::<YearMonth>()?);
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => {
                // Must be called while the process is still single-threaded
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                let config = Config::from_env(opts)?;
                init_logging(config.log_file.as_deref())?;
                let month = config.month.unwrap_or_else(|| YearMonth::containing(today));
                let client =
                    ApiClient::new(&config.server).context("failed to set up HTTP client")?;
                let user = client
                    .login(&config.username, &config.password)
                    .with_context(|| {
                        format!("failed to log in to {} as {}", config.server, config.username)
                    })?;
                let r = match user.role {
                    Role::Student => with_terminal(|mut terminal| {
                        terminal.hide_cursor().context("failed to hide cursor")?;
                        App::new(StudentView::new(&client), today, month).run(terminal)?;
                        Ok(())
                    }),
                    Role::Teacher => with_terminal(|mut terminal| {
                        terminal.hide_cursor().context("failed to hide cursor")?;
                        App::new(ClassView::new(&client), today, month).run(terminal)?;
                        Ok(())
                    }),
                    Role::Admin => Err(anyhow::anyhow!(
                        "{} is an admin account; log in as a student or teacher",
                        user.username
                    )),
                };
                if let Err(e) = client.logout() {
                    tracing::warn!(error = %e, "Failed to log out");
                }
                r
            }
            Command::Help => {
                println!("Usage: attendcal [OPTIONS] [YYYY-MM]");
                println!();
                println!("Month-by-month view of school attendance");
                println!();
                println!("Options:");
                println!("  -s, --server URL     Attendance server [env: ATTENDCAL_SERVER]");
                println!("                       [default: {DEFAULT_SERVER}]");
                println!("  -u, --user NAME      Account to log in as [env: ATTENDCAL_USER]");
                println!("      --log-file PATH  Write logs to PATH [env: ATTENDCAL_LOG_FILE]");
                println!("  -h, --help           Display this help message and exit");
                println!("  -V, --version        Show the program version and exit");
                println!();
                println!("The password is read from ATTENDCAL_PASSWORD.  Log verbosity is");
                println!("controlled by ATTENDCAL_LOG (default: info).");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

/// Sends log events to `path`, if given.  Nothing is logged otherwise, as the
/// terminal belongs to the calendar.
fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}

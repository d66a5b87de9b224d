//! Startup settings gathered from the command line and the environment
use crate::calendar::YearMonth;
use crate::client::DEFAULT_SERVER;
use anyhow::Context;
use std::fmt;
use std::path::PathBuf;

pub(crate) const SERVER_VAR: &str = "ATTENDCAL_SERVER";
pub(crate) const USER_VAR: &str = "ATTENDCAL_USER";
pub(crate) const PASSWORD_VAR: &str = "ATTENDCAL_PASSWORD";
pub(crate) const LOG_FILE_VAR: &str = "ATTENDCAL_LOG_FILE";

/// Settings given on the command line.  Each takes precedence over its
/// environment variable.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Options {
    pub(crate) server: Option<String>,
    pub(crate) user: Option<String>,
    pub(crate) log_file: Option<PathBuf>,
    pub(crate) month: Option<YearMonth>,
}

#[derive(Clone, Eq, PartialEq)]
pub(crate) struct Config {
    pub(crate) server: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) log_file: Option<PathBuf>,
    /// Month to show first; the current month if `None`
    pub(crate) month: Option<YearMonth>,
}

impl Config {
    pub(crate) fn from_env(opts: Options) -> anyhow::Result<Config> {
        Config::resolve(opts, |name| std::env::var(name).ok())
    }

    /// Fills in whatever `opts` lacks using `lookup`, which maps an
    /// environment variable name to its value.  Empty values count as unset.
    pub(crate) fn resolve<F>(opts: Options, lookup: F) -> anyhow::Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let server = opts
            .server
            .or_else(|| var(SERVER_VAR))
            .unwrap_or_else(|| String::from(DEFAULT_SERVER));
        let username = opts
            .user
            .or_else(|| var(USER_VAR))
            .with_context(|| format!("no account given; pass --user or set {USER_VAR}"))?;
        let password =
            var(PASSWORD_VAR).with_context(|| format!("{PASSWORD_VAR} environment variable not set"))?;
        let log_file = opts.log_file.or_else(|| var(LOG_FILE_VAR).map(PathBuf::from));
        Ok(Config {
            server,
            username,
            password,
            log_file,
            month: opts.month,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("log_file", &self.log_file)
            .field("month", &self.month)
            .finish()
    }
}

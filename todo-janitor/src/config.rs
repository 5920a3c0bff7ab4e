use std::str::FromStr;

use envconfig::Envconfig;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "PORT", default = "3302")]
    pub port: u16,

    #[envconfig(from = "CLEANUP_INTERVAL_SECS", default = "1200")]
    pub cleanup_interval_secs: u64,

    #[envconfig(from = "RUN_ON_STARTUP", default = "true")]
    pub run_on_startup: bool,

    #[envconfig(from = "ON_DELETE_ERROR", default = "abort")]
    pub on_delete_error: OnDeleteError,

    #[envconfig(from = "COSMOS_DB_ACCOUNT")]
    pub cosmos_db_account: String,

    #[envconfig(from = "COSMOS_DB_KEY")]
    pub cosmos_db_key: String,

    #[envconfig(from = "COSMOS_DB_NAME")]
    pub cosmos_db_name: String,

    #[envconfig(from = "COSMOS_CONTAINER")]
    pub cosmos_container: String,
}

impl Config {
    pub fn bind(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// What a cleanup run does when a single delete fails: abort the rest of the
/// run (the next tick re-selects the leftovers) or log and keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDeleteError {
    Abort,
    Continue,
}

impl FromStr for OnDeleteError {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(OnDeleteError::Abort),
            "continue" => Ok(OnDeleteError::Continue),
            invalid => Err(format!("invalid on-delete-error policy: {}", invalid)),
        }
    }
}

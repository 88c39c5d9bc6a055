use std::{net::SocketAddr, path::PathBuf};

/// Runtime settings resolved from the command line and environment.
#[derive(Clone, Debug)]
pub struct Context {
    pub database: PathBuf,
    pub api_listen: SocketAddr,
    pub log_file: Option<PathBuf>,
    pub reset: bool,
}

impl Context {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        Self {
            database: cli.database.clone(),
            api_listen: cli.api_listen,
            log_file: cli.log_file.clone(),
            reset: cli.reset,
        }
    }
}

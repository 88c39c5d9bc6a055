use clap::Parser;
use std::{env, net::SocketAddr, path::PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Virtual HR backend: tasks and interviews over HTTP",
    long_about = "Serves a small JSON API for HR tasks and candidate interviews, persisted in SQLite."
)]
pub struct Cli {
    #[arg(
        long,
        env = "VHR_DATABASE",
        default_value = ".virtual-hr/virtual_hr.sqlite",
        value_name = "PATH",
        help = "SQLite database file (parent directories are created)"
    )]
    pub database: PathBuf,

    #[arg(
        long = "api-listen",
        env = "VHR_API_LISTEN",
        value_name = "ADDR",
        default_value = "127.0.0.1:8000",
        help = "REST API listen address (host:port)"
    )]
    pub api_listen: SocketAddr,

    #[arg(
        long = "log-file",
        env = "VHR_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = false,
        help = "Delete the SQLite database before starting"
    )]
    pub reset: bool,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    match dotenvy::from_filename(&dotenv_path) {
        Ok(_) => log::info!("Loaded env from {}", dotenv_path),
        Err(err) if err.not_found() => {}
        Err(err) => log::warn!("Ignoring {}: {}", dotenv_path, err),
    }
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_flags() {
        let cli = Cli::try_parse_from(["virtual-hr"]).unwrap();
        assert_eq!(
            cli.database,
            PathBuf::from(".virtual-hr/virtual_hr.sqlite")
        );
        assert_eq!(cli.api_listen, "127.0.0.1:8000".parse().unwrap());
        assert!(cli.log_file.is_none());
        assert!(!cli.reset);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "virtual-hr",
            "--database",
            "/tmp/hr.sqlite",
            "--api-listen",
            "0.0.0.0:9000",
            "--log-file",
            "/tmp/hr.log",
            "--reset",
        ])
        .unwrap();
        assert_eq!(cli.database, PathBuf::from("/tmp/hr.sqlite"));
        assert_eq!(cli.api_listen, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/hr.log")));
        assert!(cli.reset);
    }

    #[test]
    fn rejects_malformed_listen_address() {
        assert!(Cli::try_parse_from(["virtual-hr", "--api-listen", "localhost"]).is_err());
    }
}

use crate::{cli, context, rest, storage};
use anyhow::{Context as AnyhowContext, Result};
use tokio_util::sync::CancellationToken;

/// The running service: resolved configuration plus the injected store handle.
pub struct App {
    config: context::Context,
    storage: storage::SqliteStorage,
    shutdown: CancellationToken,
}

impl App {
    /// Builds the App from CLI arguments.
    /// Owns the startup side effects: log file, data directory, schema bootstrap.
    pub fn from_cli() -> Result<Self> {
        let cli = cli::parse();
        let ctx = context::Context::from_cli(&cli);

        crate::logging::set_log_file(ctx.log_file.as_deref()).context("opening log file")?;
        log_startup_info(&ctx);

        let storage = init_storage(&ctx)?;
        Ok(Self::new(ctx, storage))
    }

    pub fn new(config: context::Context, storage: storage::SqliteStorage) -> Self {
        Self {
            config,
            storage,
            shutdown: CancellationToken::new(),
        }
    }

    /// Serves until Ctrl-C, then drains in-flight requests.
    pub async fn run_daemon(&self) -> Result<()> {
        let signal_token = self.shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::info!("🧨 Ctrl-C received, shutting down...");
                    signal_token.cancel();
                }
                Err(e) => log::error!("Unable to listen for Ctrl-C: {}", e),
            }
        });

        rest::serve(
            self.config.api_listen,
            self.storage.clone(),
            self.shutdown.clone(),
        )
        .await
        .context("REST server failed")?;

        log::info!("✅ Shutdown complete");
        Ok(())
    }
}

fn log_startup_info(ctx: &context::Context) {
    log::info!("🚀 Starting virtual-hr");
    log::info!("🗄️ Database: {}", ctx.database.display());
    log::info!("🌐 REST API: http://{}", ctx.api_listen);
    if let Some(path) = ctx.log_file.as_deref() {
        log::info!("📝 Log file: {}", path.display());
    }
}

fn init_storage(ctx: &context::Context) -> Result<storage::SqliteStorage> {
    if let Some(parent) = ctx.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data dir {}", parent.display()))?;
    }
    let sqlite = storage::SqliteStorage::new(&ctx.database);
    if ctx.reset {
        log::warn!("♻️ Resetting database {}", ctx.database.display());
        sqlite.reset_all().context("resetting storage")?;
    }
    sqlite.init().context("initializing storage")?;
    Ok(sqlite)
}

pub async fn run() -> Result<()> {
    let app = App::from_cli()?;
    app.run_daemon().await
}

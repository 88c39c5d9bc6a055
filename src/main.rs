mod app;
mod cli;
mod context;
mod logging;
mod rest;
mod storage;
mod types;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    app::run().await
}

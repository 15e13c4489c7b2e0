use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use news_server::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,news_server=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = ServerConfig::parse();

    news_server::start_server(config).await.context("News server failed")?;

    Ok(())
}

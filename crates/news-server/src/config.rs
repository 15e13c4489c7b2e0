//! Server configuration from flags and environment

use crate::error::{Result, ServerError};
use clap::{Parser, ValueEnum};
use news_client::{ArticleFetcher, NewsApiSource, NewsClientConfig, SyntheticSource};
use std::net::SocketAddr;

/// Where headlines come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Locally generated articles, no network access
    Synthetic,
    /// The NewsAPI `top-headlines` endpoint
    Newsapi,
}

/// Command-line configuration for `newsdeck-server`
#[derive(Parser, Debug, Clone)]
#[command(name = "newsdeck-server", version, about = "Serve personalized top headlines")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "NEWSDECK_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Headline source
    #[arg(long, env = "NEWSDECK_SOURCE", value_enum, default_value_t = SourceKind::Synthetic)]
    pub source: SourceKind,

    /// NewsAPI key, required with `--source newsapi`
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// NewsAPI base URL
    #[arg(long, env = "NEWS_API_URL", default_value = "https://newsapi.org")]
    pub news_api_url: String,

    /// Allowed CORS origin; repeat for several. Any origin when omitted.
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Build the fetcher for the configured source
    pub fn build_fetcher(&self) -> Result<ArticleFetcher> {
        match self.source {
            SourceKind::Synthetic => Ok(ArticleFetcher::new(SyntheticSource::new())),
            SourceKind::Newsapi => {
                let key = self
                    .news_api_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| {
                        ServerError::Config(
                            "NEWS_API_KEY is required when the source is newsapi".to_string(),
                        )
                    })?;

                let client_config = NewsClientConfig::new(&self.news_api_url);
                Ok(ArticleFetcher::new(NewsApiSource::with_config(client_config, key)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["newsdeck-server"]).unwrap();
        assert_eq!(config.bind, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.news_api_url, "https://newsapi.org");
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_flags() {
        let config = ServerConfig::try_parse_from([
            "newsdeck-server",
            "--bind",
            "0.0.0.0:8080",
            "--source",
            "newsapi",
            "--news-api-key",
            "secret",
            "--cors-origin",
            "http://localhost:5173",
            "--cors-origin",
            "https://news.example",
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.source, SourceKind::Newsapi);
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.build_fetcher().unwrap().source_name(), "newsapi");
    }

    #[test]
    fn test_newsapi_without_key_rejected() {
        let config = ServerConfig::try_parse_from(["newsdeck-server", "--source", "newsapi"])
            .unwrap();
        let config = ServerConfig { news_api_key: None, ..config };

        assert!(matches!(config.build_fetcher(), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_synthetic_fetcher() {
        let config = ServerConfig::try_parse_from(["newsdeck-server", "--source", "synthetic"])
            .unwrap();
        assert_eq!(config.build_fetcher().unwrap().source_name(), "synthetic");
    }
}

//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;

use crate::catalog::DEFAULT_API_URL;

/// scriptdeck - browse a script catalog and watch it for new uploads
#[derive(Debug, Parser)]
#[command(name = "scriptdeck")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Catalog list endpoint
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Seconds between auto-refresh polls
    #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Start with auto-refresh turned off
    #[arg(long)]
    pub no_auto_refresh: bool,

    /// Page to open first
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Log file (default: scriptdeck.log in the system temp directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub poll_interval: Duration,
    pub auto_refresh: bool,
    pub start_page: u32,
    pub log_file: PathBuf,
    pub verbose: bool,
}

impl TryFrom<Args> for Config {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self> {
        let api_url = Url::parse(&args.api_url)
            .with_context(|| format!("invalid --api-url {:?}", args.api_url))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            anyhow::bail!("--api-url must be http or https, got {}", api_url.scheme());
        }

        Ok(Self {
            api_url,
            poll_interval: Duration::from_secs(args.interval),
            auto_refresh: !args.no_auto_refresh,
            start_page: args.page,
            log_file: args
                .log_file
                .unwrap_or_else(|| std::env::temp_dir().join("scriptdeck.log")),
            verbose: args.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(argv: &[&str]) -> Result<Config> {
        let args = Args::try_parse_from(std::iter::once("scriptdeck").chain(argv.iter().copied()))?;
        Config::try_from(args)
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(cfg.poll_interval, Duration::from_secs(60));
        assert!(cfg.auto_refresh);
        assert_eq!(cfg.start_page, 1);
        assert!(cfg.log_file.ends_with("scriptdeck.log"));
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = config(&[
            "--api-url",
            "http://localhost:8080/scripts",
            "-i",
            "15",
            "--no-auto-refresh",
            "--page",
            "3",
            "--log-file",
            "/tmp/x.log",
        ])
        .unwrap();
        assert_eq!(cfg.api_url.host_str(), Some("localhost"));
        assert_eq!(cfg.poll_interval, Duration::from_secs(15));
        assert!(!cfg.auto_refresh);
        assert_eq!(cfg.start_page, 3);
        assert_eq!(cfg.log_file, PathBuf::from("/tmp/x.log"));
    }

    #[test]
    fn rejects_zero_interval_and_page() {
        assert!(config(&["--interval", "0"]).is_err());
        assert!(config(&["--page", "0"]).is_err());
    }

    #[test]
    fn rejects_non_http_url() {
        assert!(config(&["--api-url", "not a url"]).is_err());
        assert!(config(&["--api-url", "ftp://example.com/scripts"]).is_err());
    }
}

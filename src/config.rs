// src/config.rs

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::fetch::{PageSource, StatusFetcher};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Scrape channel statistics from an Arris Surfboard cable modem"
)]
pub struct Args {
    /// IP address or host name of the modem.
    #[arg(long, env = "SURFBOARD_MODEM_ADDRESS", default_value = "192.168.100.1")]
    pub modem_address: String,

    #[arg(long, default_value = "/cgi-bin/status")]
    pub status_path: String,

    /// Timeout in milliseconds for fetching the status page.
    #[arg(long, env = "SURFBOARD_TIMEOUT_MS", default_value_t = 2000)]
    pub timeout: u64,

    /// Seconds between collection passes.
    #[arg(long, default_value_t = 15)]
    pub interval: u64,

    /// Run a single pass and exit.
    #[arg(long)]
    pub once: bool,

    /// Parse a saved status page instead of contacting the modem.
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub status_url: Url,
    pub timeout: Duration,
    pub interval: Duration,
    pub once: bool,
    pub from_file: Option<PathBuf>,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        if args.timeout == 0 {
            bail!("--timeout must be greater than zero");
        }
        if args.interval == 0 && !args.once {
            bail!("--interval must be greater than zero");
        }
        let address = args.modem_address.trim();
        if address.is_empty() {
            bail!("--modem-address must not be empty");
        }

        let path = if args.status_path.starts_with('/') {
            args.status_path.clone()
        } else {
            format!("/{}", args.status_path)
        };
        let raw = format!("http://{}{}", address, path);
        let status_url =
            Url::parse(&raw).with_context(|| format!("invalid modem address {:?}", raw))?;

        Ok(Self {
            status_url,
            timeout: Duration::from_millis(args.timeout),
            interval: Duration::from_secs(args.interval),
            once: args.once,
            from_file: args.from_file,
        })
    }

    pub fn page_source(&self) -> Result<PageSource> {
        Ok(match &self.from_file {
            Some(path) => PageSource::File(path.clone()),
            None => PageSource::Http(StatusFetcher::new(self.status_url.clone(), self.timeout)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Config> {
        let mut full = vec!["surfboard_scraper"];
        full.extend_from_slice(argv);
        Config::from_args(Args::try_parse_from(full)?)
    }

    #[test]
    fn test_defaults() {
        let cfg = parse(&[]).unwrap();
        assert_eq!(cfg.status_url.as_str(), "http://192.168.100.1/cgi-bin/status");
        assert_eq!(cfg.timeout, Duration::from_secs(2));
        assert_eq!(cfg.interval, Duration::from_secs(15));
        assert!(!cfg.once);
        assert!(cfg.from_file.is_none());
        assert!(matches!(cfg.page_source().unwrap(), PageSource::Http(_)));
    }

    #[test]
    fn test_overrides() {
        let cfg = parse(&[
            "--modem-address",
            "10.0.0.1:8080",
            "--status-path",
            "cmconnectionstatus.html",
            "--timeout",
            "500",
            "--once",
        ])
        .unwrap();
        assert_eq!(
            cfg.status_url.as_str(),
            "http://10.0.0.1:8080/cmconnectionstatus.html"
        );
        assert_eq!(cfg.timeout, Duration::from_millis(500));
        assert!(cfg.once);
    }

    #[test]
    fn test_from_file() {
        let cfg = parse(&["--from-file", "saved.html"]).unwrap();
        match cfg.page_source().unwrap() {
            PageSource::File(p) => assert_eq!(p, PathBuf::from("saved.html")),
            other => panic!("expected file source, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse(&["--timeout", "0"]).is_err());
        assert!(parse(&["--interval", "0"]).is_err());
        assert!(parse(&["--interval", "0", "--once"]).is_ok());
        assert!(parse(&["--modem-address", "bad host name"]).is_err());
        assert!(parse(&["--modem-address", " "]).is_err());
        assert!(parse(&["--timeout", "soon"]).is_err());
    }
}

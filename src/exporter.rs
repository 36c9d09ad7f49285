// src/exporter.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    future::Future,
    time::{Duration, Instant},
};
use tokio::{
    sync::Mutex,
    time::{interval, MissedTickBehavior},
};
use tracing::{error, info, instrument};

use crate::fetch::PageSource;
use crate::metrics::{Measurement, MetricId};
use crate::process::parse_status_page;

/// Everything one collection pass produced.
#[derive(Debug, Clone, Serialize)]
pub struct Pass {
    pub collected_at: DateTime<Utc>,
    pub up: bool,
    pub measurements: Vec<Measurement>,
}

/// Runs collection passes against one page source, one pass at a time.
#[derive(Debug)]
pub struct Exporter {
    source: PageSource,
    // held across fetch + parse so passes never overlap
    lock: Mutex<()>,
}

impl Exporter {
    pub fn new(source: PageSource) -> Self {
        Self {
            source,
            lock: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &PageSource {
        &self.source
    }

    /// Collect every `period` until `shutdown` resolves, handing each pass
    /// to `on_pass`. `shutdown` is polled for the whole run, including while
    /// a pass is in flight; an interrupted pass is discarded.
    /// Returns the number of completed passes.
    pub async fn run_until<F, E>(&self, period: Duration, shutdown: F, mut on_pass: E) -> usize
    where
        F: Future,
        E: FnMut(&Pass),
    {
        tokio::pin!(shutdown);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut passes = 0;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested during pass");
                    break;
                }
                pass = self.collect() => {
                    on_pass(&pass);
                    passes += 1;
                }
            }
        }

        info!(passes, "shutdown");
        passes
    }

    /// One fetch attempt, no retries.
    ///
    /// Unreachable: only `up = 0`. Reachable: `up = 1`, every channel
    /// measurement, then the pass duration.
    #[instrument(level = "info", skip(self), fields(source = %self.source.describe()))]
    pub async fn collect(&self) -> Pass {
        let _guard = self.lock.lock().await;
        let collected_at = Utc::now();
        let start = Instant::now();

        let body = match self.source.load().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to collect stats from surfboard: {:#}", e);
                return Pass {
                    collected_at,
                    up: false,
                    measurements: vec![Measurement::gauge(MetricId::Up, 0.0)],
                };
            }
        };

        let mut measurements = vec![Measurement::gauge(MetricId::Up, 1.0)];
        measurements.extend(parse_status_page(&body));
        let elapsed = start.elapsed();
        measurements.push(Measurement::gauge(
            MetricId::ScrapeDuration,
            elapsed.as_secs_f64(),
        ));

        info!(
            measurements = measurements.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "collected"
        );
        Pass {
            collected_at,
            up: true,
            measurements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::test_server::{closed, hang, serve, status_url};
    use crate::fetch::StatusFetcher;
    use std::sync::Arc;
    use std::time::Duration;
    use tracing_subscriber::{fmt, EnvFilter};

    const STATUS_PAGE: &str = include_str!("../testdata/status.html");

    fn init_logging() {
        let _ = fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    }

    fn http_exporter(addr: std::net::SocketAddr, timeout: Duration) -> Exporter {
        let fetcher = StatusFetcher::new(status_url(addr), timeout).unwrap();
        Exporter::new(PageSource::Http(fetcher))
    }

    fn assert_unreachable(pass: &Pass) {
        assert!(!pass.up);
        assert_eq!(pass.measurements, vec![Measurement::gauge(MetricId::Up, 0.0)]);
    }

    #[tokio::test]
    async fn test_reachable_pass() {
        init_logging();
        let addr = serve("200 OK", STATUS_PAGE.to_string()).await;
        let exporter = http_exporter(addr, Duration::from_secs(2));

        let pass = exporter.collect().await;
        assert!(pass.up);

        let ms = &pass.measurements;
        assert_eq!(ms[0], Measurement::gauge(MetricId::Up, 1.0));
        assert_eq!(ms.last().unwrap().metric, MetricId::ScrapeDuration);
        assert!(ms.last().unwrap().value >= 0.0);
        // up + channel measurements + duration
        assert_eq!(ms.len(), 1 + 48 + 1);
        assert_eq!(
            ms.iter().filter(|m| m.metric == MetricId::Up).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_refused_is_unreachable() {
        init_logging();
        let exporter = http_exporter(closed().await, Duration::from_secs(2));
        assert_unreachable(&exporter.collect().await);
    }

    #[tokio::test]
    async fn test_error_status_is_unreachable() {
        let addr = serve("404 Not Found", STATUS_PAGE.to_string()).await;
        let exporter = http_exporter(addr, Duration::from_secs(2));
        assert_unreachable(&exporter.collect().await);
    }

    #[tokio::test]
    async fn test_timeout_is_unreachable() {
        let exporter = http_exporter(hang().await, Duration::from_millis(200));
        assert_unreachable(&exporter.collect().await);
    }

    #[tokio::test]
    async fn test_passes_are_serialized() {
        let exporter = Arc::new(http_exporter(hang().await, Duration::from_millis(300)));

        let started = std::time::Instant::now();
        let (a, b) = tokio::join!(
            {
                let e = Arc::clone(&exporter);
                async move { e.collect().await }
            },
            {
                let e = Arc::clone(&exporter);
                async move { e.collect().await }
            }
        );
        assert_unreachable(&a);
        assert_unreachable(&b);
        // the second pass waited for the first one's timeout
        assert!(started.elapsed() >= Duration::from_millis(550));
    }

    #[tokio::test]
    async fn test_passes_are_independent() {
        let addr = serve("200 OK", STATUS_PAGE.to_string()).await;
        let exporter = http_exporter(addr, Duration::from_secs(2));

        let strip = |p: Pass| -> Vec<Measurement> {
            p.measurements
                .into_iter()
                .filter(|m| m.metric != MetricId::ScrapeDuration)
                .collect()
        };
        let first = strip(exporter.collect().await);
        let second = strip(exporter.collect().await);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_shutdown_during_pass_stops_loop() {
        init_logging();
        // every pass hangs until the 5s timeout
        let exporter = http_exporter(hang().await, Duration::from_secs(5));
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let _ = tx.send(());
        });

        let started = std::time::Instant::now();
        let mut seen = 0;
        let passes = exporter
            .run_until(Duration::from_millis(50), rx, |_| seen += 1)
            .await;

        assert_eq!(passes, 0);
        assert_eq!(seen, 0);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_run_until_collects_each_tick() {
        let addr = serve("200 OK", STATUS_PAGE.to_string()).await;
        let exporter = http_exporter(addr, Duration::from_secs(2));
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let mut tx = Some(tx);
        let mut ups = Vec::new();
        let passes = exporter
            .run_until(Duration::from_millis(10), rx, |pass| {
                ups.push(pass.up);
                if ups.len() == 3 {
                    if let Some(tx) = tx.take() {
                        let _ = tx.send(());
                    }
                }
            })
            .await;

        assert_eq!(passes, 3);
        assert_eq!(ups, vec![true, true, true]);
        assert_eq!(exporter.source().describe(), status_url(addr).to_string());
    }

    #[tokio::test]
    async fn test_file_source_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.html");
        std::fs::write(&path, STATUS_PAGE).unwrap();

        let pass = Exporter::new(PageSource::File(path)).collect().await;
        assert!(pass.up);
        assert_eq!(pass.measurements.len(), 50);

        let missing = Exporter::new(PageSource::File(dir.path().join("gone.html")));
        assert_unreachable(&missing.collect().await);
    }
}

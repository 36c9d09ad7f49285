// src/metrics/mod.rs

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

pub const NAMESPACE: &str = "surfboard";

/// Label attached to every per-channel measurement.
pub const CHANNEL_LABEL: &str = "channel";

/// How a consumer should treat successive values of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Gauge,
    Counter,
}

/// Every metric this crate can emit. Serializes as its fully-qualified name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricId {
    Up,
    ScrapeDuration,
    DownFrequency,
    DownPower,
    DownSnr,
    DownCodewordsCorrected,
    DownCodewordsUncorrectable,
    UpFrequency,
    UpPower,
}

/// Static description of a metric: fully-qualified name, help text, labels.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDesc {
    pub fq_name: String,
    pub help: &'static str,
    pub kind: ValueKind,
    pub labels: &'static [&'static str],
}

impl MetricDesc {
    fn new(
        subsystem: &str,
        name: &str,
        help: &'static str,
        kind: ValueKind,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            fq_name: fq_name(NAMESPACE, subsystem, name),
            help,
            kind,
            labels,
        }
    }
}

/// Join namespace, subsystem and name with `_`, skipping empty parts.
pub fn fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

static DESCRIPTORS: Lazy<BTreeMap<MetricId, MetricDesc>> = Lazy::new(|| {
    use MetricId::*;
    use ValueKind::*;
    const CH: &[&str] = &[CHANNEL_LABEL];

    BTreeMap::from([
        (Up, MetricDesc::new("", "up", "Could the surfboard be reached.", Gauge, &[])),
        (
            ScrapeDuration,
            MetricDesc::new(
                "",
                "scrape_duration_seconds",
                "Time Surfboard scrape took, in seconds",
                Gauge,
                &[],
            ),
        ),
        (
            DownFrequency,
            MetricDesc::new("downstream", "frequency_hertz", "Downstream frequency in Hertz", Gauge, CH),
        ),
        (
            DownPower,
            MetricDesc::new("downstream", "power_dbmv", "Downstream power level in dBmv", Gauge, CH),
        ),
        (
            DownSnr,
            MetricDesc::new("downstream", "snr_db", "Downstream signal to noise ratio in dB", Gauge, CH),
        ),
        (
            DownCodewordsCorrected,
            MetricDesc::new(
                "downstream",
                "codewords_corrected_total",
                "Downstream codewords corrected",
                Counter,
                CH,
            ),
        ),
        (
            DownCodewordsUncorrectable,
            MetricDesc::new(
                "downstream",
                "codewords_uncorrectable_total",
                "Downstream codewords uncorrectable",
                Counter,
                CH,
            ),
        ),
        (
            UpFrequency,
            MetricDesc::new("upstream", "frequency_hertz", "Upstream frequency in Hertz", Gauge, CH),
        ),
        (
            UpPower,
            MetricDesc::new("upstream", "power_dbmv", "Upstream power level in dBmv", Gauge, CH),
        ),
    ])
});

/// Process-wide descriptor table, built on first use and never mutated.
pub fn descriptors() -> &'static BTreeMap<MetricId, MetricDesc> {
    &DESCRIPTORS
}

impl MetricId {
    pub fn desc(self) -> &'static MetricDesc {
        // every variant is inserted above
        &DESCRIPTORS[&self]
    }
}

impl Serialize for MetricId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.desc().fq_name)
    }
}

/// One emitted sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub metric: MetricId,
    pub kind: ValueKind,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl Measurement {
    /// Unlabelled gauge, e.g. `up` or the scrape duration.
    pub fn gauge(metric: MetricId, value: f64) -> Self {
        Self {
            metric,
            kind: ValueKind::Gauge,
            value,
            channel: None,
        }
    }

    /// Per-channel sample; `channel` is the 1-based row number.
    pub fn for_channel(metric: MetricId, kind: ValueKind, value: f64, channel: usize) -> Self {
        Self {
            metric,
            kind,
            value,
            channel: Some(channel.to_string()),
        }
    }

    pub fn fq_name(&self) -> &'static str {
        &self.metric.desc().fq_name
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::section::Section;
use super::utils::{Scale, DECIMAL_PATTERN, INTEGER_PATTERN};
use crate::metrics::{MetricId, ValueKind};

/// How one table column becomes a measurement.
#[derive(Debug)]
pub struct MetricRule {
    pub metric: MetricId,
    pub kind: ValueKind,
    pub pattern: &'static Regex,
    pub scale: Scale,
}

static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(DECIMAL_PATTERN).expect("decimal pattern is valid"));
static INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(INTEGER_PATTERN).expect("integer pattern is valid"));

static RULES: Lazy<BTreeMap<(Section, usize), MetricRule>> = Lazy::new(|| {
    use MetricId::*;
    use Section::*;

    let gauge = |metric, scale| MetricRule {
        metric,
        kind: ValueKind::Gauge,
        pattern: &DECIMAL,
        scale,
    };
    let counter = |metric| MetricRule {
        metric,
        kind: ValueKind::Counter,
        pattern: &INTEGER,
        scale: Scale::Identity,
    };

    BTreeMap::from([
        ((Downstream, 4), gauge(DownFrequency, Scale::MegaToUnit)),
        ((Downstream, 5), gauge(DownPower, Scale::Identity)),
        ((Downstream, 6), gauge(DownSnr, Scale::Identity)),
        ((Downstream, 7), counter(DownCodewordsCorrected)),
        ((Downstream, 8), counter(DownCodewordsUncorrectable)),
        ((Upstream, 5), gauge(UpFrequency, Scale::MegaToUnit)),
        ((Upstream, 6), gauge(UpPower, Scale::Identity)),
    ])
});

/// All rules, ordered by section then column.
pub fn rules() -> &'static BTreeMap<(Section, usize), MetricRule> {
    &RULES
}

pub fn rule_for(section: Section, column: usize) -> Option<&'static MetricRule> {
    RULES.get(&(section, column))
}

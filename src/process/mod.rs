// src/process/mod.rs

pub mod collect;
pub mod rules;
pub mod section;
pub mod utils;

use tracing::{debug, instrument};

use crate::metrics::Measurement;
use crate::tokens::{tokenize, Token};
use collect::{CellCollector, ChannelTable};
use rules::rules;
use utils::extract_or_zero;

/// Run the section classifier and cell collector over a token stream.
///
/// Tokens after the first `EndOfDocument` are ignored.
pub fn collect_channels(tokens: &[Token]) -> ChannelTable {
    let mut collector = CellCollector::new();
    for (i, token) in tokens.iter().enumerate() {
        collector.feed(token, tokens.get(i + 1));
        if *token == Token::EndOfDocument {
            break;
        }
    }
    collector.finish()
}

/// Apply every metric rule to its column, one measurement per row.
/// Channel labels are the 1-based row positions.
pub fn map_measurements(table: &ChannelTable) -> Vec<Measurement> {
    let mut out = Vec::new();
    for (&(section, column), rule) in rules() {
        for (i, raw) in table.column(section, column).iter().enumerate() {
            let value = rule.scale.apply(extract_or_zero(rule.pattern, raw));
            out.push(Measurement::for_channel(rule.metric, rule.kind, value, i + 1));
        }
    }
    out
}

/// Tokenize, collect and map a status page in one go.
#[instrument(level = "debug", skip(html), fields(len = html.len()))]
pub fn parse_status_page(html: &str) -> Vec<Measurement> {
    let tokens = tokenize(html);
    let table = collect_channels(&tokens);
    debug!(
        downstream = table.row_count(section::Section::Downstream),
        upstream = table.row_count(section::Section::Upstream),
        "collected channel rows"
    );
    map_measurements(&table)
}

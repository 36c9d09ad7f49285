use crate::tokens::Token;
use tracing::debug;

/// The channel tables found on the status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Downstream,
    Upstream,
}

impl Section {
    pub const ALL: [Section; 2] = [Section::Downstream, Section::Upstream];

    /// Map a header cell's `colspan` to the table it introduces.
    pub fn from_span(span: &str) -> Option<Section> {
        match span.trim() {
            "9" => Some(Section::Downstream),
            "7" => Some(Section::Upstream),
            _ => None,
        }
    }

    pub fn column_count(self) -> usize {
        match self {
            Section::Downstream => 9,
            Section::Upstream => 7,
        }
    }
}

/// Tracks which channel table the token stream is currently inside.
#[derive(Debug, Default)]
pub struct SectionClassifier {
    current: Option<Section>,
}

impl SectionClassifier {
    pub fn current(&self) -> Option<Section> {
        self.current
    }

    /// Returns the section entered if `token` is a recognised `th colspan`
    /// header. Re-entering the current section also reports it, so callers
    /// can reset their cursor.
    pub fn observe(&mut self, token: &Token) -> Option<Section> {
        if !token.is_start_tag("th") {
            return None;
        }
        let section = token.attr("colspan").and_then(Section::from_span)?;
        debug!(?section, previous = ?self.current, "entering channel table");
        self.current = Some(section);
        Some(section)
    }
}

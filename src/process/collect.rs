use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::section::{Section, SectionClassifier};
use super::utils::clean_str;
use crate::tokens::Token;

/// Raw cell text per section, stored column-major.
///
/// Every section holds exactly `column_count()` columns and all columns of a
/// section have the same length: row `i` of the table is `columns[c][i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTable {
    sections: BTreeMap<Section, Vec<Vec<String>>>,
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelTable {
    pub fn new() -> Self {
        let sections = Section::ALL
            .iter()
            .map(|&s| (s, vec![Vec::new(); s.column_count()]))
            .collect();
        Self { sections }
    }

    pub fn columns(&self, section: Section) -> &[Vec<String>] {
        self.sections
            .get(&section)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn column(&self, section: Section, column: usize) -> &[String] {
        self.columns(section)
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn row_count(&self, section: Section) -> usize {
        self.column(section, 0).len()
    }

    /// Row `row` of `section` as a list of cells, if it exists.
    pub fn row(&self, section: Section, row: usize) -> Option<Vec<&str>> {
        self.columns(section)
            .iter()
            .map(|col| col.get(row).map(String::as_str))
            .collect()
    }

    fn push_row(&mut self, section: Section, slots: Vec<Option<String>>) {
        let columns = self
            .sections
            .entry(section)
            .or_insert_with(|| vec![Vec::new(); section.column_count()]);
        for (col, slot) in columns.iter_mut().zip(slots) {
            col.push(slot.unwrap_or_default());
        }
    }
}

/// Position inside the active section. `row` and `column` advance together:
/// passing the last column commits the row and starts the next one.
#[derive(Debug)]
struct Cursor {
    section: Section,
    row: usize,
    column: usize,
    slots: Vec<Option<String>>,
}

impl Cursor {
    fn new(section: Section, row: usize) -> Self {
        Self {
            section,
            row,
            column: 0,
            slots: vec![None; section.column_count()],
        }
    }
}

/// Folds data cells of the active section into a [`ChannelTable`].
///
/// A cell fills its slot only when the token right after its start tag is
/// non-blank text; other cells still occupy their column. Rows without any
/// filled slot (header rows with `<strong>` titles, spacer rows) are dropped.
#[derive(Debug, Default)]
pub struct CellCollector {
    classifier: SectionClassifier,
    cursor: Option<Cursor>,
    table: ChannelTable,
}

impl CellCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one token. `next` is the token that follows it, if any.
    pub fn feed(&mut self, token: &Token, next: Option<&Token>) {
        if let Some(section) = self.classifier.observe(token) {
            self.commit_row();
            let row = self.table.row_count(section);
            self.cursor = Some(Cursor::new(section, row));
            return;
        }

        match token {
            Token::EndOfDocument => self.commit_row(),
            t if t.is_start_tag("tr") => self.commit_row(),
            t if t.is_start_tag("td") => self.cell(next),
            _ => {}
        }
    }

    fn cell(&mut self, next: Option<&Token>) {
        let Some(cursor) = self.cursor.as_mut() else {
            trace!("data cell outside a channel table, ignored");
            return;
        };

        match next {
            Some(Token::Text(raw)) => {
                let text = clean_str(raw);
                if !text.is_empty() {
                    trace!(
                        section = ?cursor.section,
                        row = cursor.row,
                        column = cursor.column,
                        %text,
                        "cell"
                    );
                    cursor.slots[cursor.column] = Some(text);
                }
            }
            _ => trace!(
                section = ?cursor.section,
                column = cursor.column,
                "cell without direct text"
            ),
        }

        cursor.column += 1;
        if cursor.column == cursor.section.column_count() {
            self.commit_row();
        }
    }

    fn commit_row(&mut self) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };
        let slots = std::mem::replace(&mut cursor.slots, vec![None; cursor.section.column_count()]);
        cursor.column = 0;

        if slots.iter().all(Option::is_none) {
            return;
        }
        let missing = slots.iter().filter(|s| s.is_none()).count();
        if missing > 0 {
            debug!(
                section = ?cursor.section,
                row = cursor.row,
                missing,
                "row has empty cells"
            );
        }
        let section = cursor.section;
        cursor.row += 1;
        self.table.push_row(section, slots);
    }

    pub fn finish(mut self) -> ChannelTable {
        self.commit_row();
        self.table
    }
}

use serde::{Deserialize, Serialize};

/// Declared width of the ranked columns in the officer and posting tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    /// Number of `Nth choice` columns on the officer table.
    pub choice_columns: usize,
    /// Number of `Match N` columns on the posting table.
    pub ranked_columns: usize,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            choice_columns: 10,
            ranked_columns: 20,
        }
    }
}

impl TableLayout {
    pub fn new(choice_columns: usize, ranked_columns: usize) -> Self {
        Self {
            choice_columns,
            ranked_columns,
        }
    }

    pub fn choice_headers(&self) -> Vec<String> {
        (1..=self.choice_columns).map(choice_header).collect()
    }

    pub fn ranked_headers(&self) -> Vec<String> {
        (1..=self.ranked_columns)
            .map(|position| format!("Match {position}"))
            .collect()
    }
}

pub(crate) fn choice_header(position: usize) -> String {
    format!("{} choice", ordinal(position))
}

fn ordinal(value: usize) -> String {
    let suffix = match (value % 10, value % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{value}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_headers_use_english_ordinals() {
        let headers = TableLayout::new(4, 0).choice_headers();
        assert_eq!(headers, ["1st choice", "2nd choice", "3rd choice", "4th choice"]);
        assert_eq!(choice_header(11), "11th choice");
        assert_eq!(choice_header(22), "22nd choice");
    }

    #[test]
    fn ranked_headers_are_numbered() {
        assert_eq!(TableLayout::new(0, 2).ranked_headers(), ["Match 1", "Match 2"]);
    }
}

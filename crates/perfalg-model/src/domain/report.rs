use serde::{Deserialize, Serialize};

use crate::StatsRow;

/// Result of a statistics aggregation query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Aggregated rows in first-seen order.
    pub rows: Vec<StatsRow>,
    /// Number of completed entries folded into `rows`.
    pub reported: usize,
    /// Number of recorded entries, completed or not.
    pub out_of: usize,
    /// Column labels of by-round properties, matching `StatsRow::by_round`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
}

impl Report {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Find the first row with the given name.
    pub fn row(&self, name: &str) -> Option<&StatsRow> {
        self.rows.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_camel_case() {
        let report = Report {
            rows: vec![],
            reported: 2,
            out_of: 3,
            columns: vec![],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"outOf\":3"));
        assert!(!json.contains("columns"));

        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}

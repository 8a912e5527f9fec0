//! Core data types for the wallet ledger
//!
//! - `Entry`: one recorded ledger line
//! - `EntryId`: caller-supplied identifier (number or text)
//! - `Summary`: snapshot of the derived aggregates

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Identifier of an entry.
///
/// Persisted as a bare JSON number or string. The ledger never generates or
/// checks ids; uniqueness is up to whoever creates the entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{}", n),
            EntryId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for EntryId {
    type Err = std::convert::Infallible;

    /// Integers written in canonical form parse as `Number`; anything else,
    /// including `007`, `+5` and `-0`, is kept as `Text`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => EntryId::Number(n),
            _ => EntryId::Text(s.to_string()),
        })
    }
}

impl From<i64> for EntryId {
    fn from(n: i64) -> Self {
        EntryId::Number(n)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        EntryId::Text(s.to_string())
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        EntryId::Text(s)
    }
}

/// A single ledger line.
///
/// Positive `amount` is income, negative is expense, zero is neither.
/// Any other fields (label, category, date, ...) live in `details` and are
/// carried through persistence untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub amount: f64,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Entry {
    pub fn new(id: impl Into<EntryId>, amount: f64) -> Self {
        Self {
            id: id.into(),
            amount,
            details: Map::new(),
        }
    }

    /// Builder method: attach an arbitrary detail field
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Builder method: set the `label` detail
    pub fn label(self, label: impl Into<String>) -> Self {
        self.detail("label", label.into())
    }

    /// Builder method: set the `category` detail
    pub fn category(self, category: impl Into<String>) -> Self {
        self.detail("category", category.into())
    }

    /// Builder method: set the `date` detail (ISO 8601 date)
    pub fn date(self, date: chrono::NaiveDate) -> Self {
        self.detail("date", date.format("%Y-%m-%d").to_string())
    }

    /// Read a detail field as a string, if present and textual
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// Snapshot of the derived aggregates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_entries: usize,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
}

impl Summary {
    /// Compute all aggregates from a slice of entries
    pub fn from_entries(entries: &[Entry]) -> Self {
        let total_income = total_income(entries);
        let total_expense = total_expense(entries);
        Self {
            total_entries: entries.len(),
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entries={}, income={:.2}, expense={:.2}, balance={:.2}",
            self.total_entries, self.total_income, self.total_expense, self.balance
        )
    }
}

/// Sum of positive amounts
pub fn total_income(entries: &[Entry]) -> f64 {
    entries
        .iter()
        .filter(|e| e.is_income())
        .map(|e| e.amount)
        .sum()
}

/// Sum of the absolute values of negative amounts
pub fn total_expense(entries: &[Entry]) -> f64 {
    entries
        .iter()
        .filter(|e| e.is_expense())
        .map(|e| e.amount.abs())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_parsing() {
        assert_eq!("42".parse::<EntryId>().unwrap(), EntryId::Number(42));
        assert_eq!("-7".parse::<EntryId>().unwrap(), EntryId::Number(-7));
        assert_eq!(
            "abc-1".parse::<EntryId>().unwrap(),
            EntryId::Text("abc-1".to_string())
        );
        assert_eq!(EntryId::Number(42).to_string(), "42");
    }

    #[test]
    fn test_non_canonical_integers_stay_text() {
        for raw in ["007", "+5", "-0", "00"] {
            assert_eq!(raw.parse::<EntryId>().unwrap(), EntryId::Text(raw.to_string()));
        }
        assert_eq!("0".parse::<EntryId>().unwrap(), EntryId::Number(0));
    }

    #[test]
    fn test_number_and_text_ids_differ() {
        assert_ne!(EntryId::from(1), EntryId::from("1"));
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = Entry::new(1700000000000, -25000.0)
            .label("Makan siang")
            .category("food");

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 1700000000000i64);
        assert_eq!(json["amount"], -25000.0);
        assert_eq!(json["label"], "Makan siang");
        assert_eq!(json["category"], "food");
    }

    #[test]
    fn test_entry_keeps_unknown_fields() {
        let raw = r#"{"id":"a1","amount":150.5,"note":"gaji","tags":["x"]}"#;
        let entry: Entry = serde_json::from_str(raw).unwrap();

        assert_eq!(entry.id, EntryId::Text("a1".to_string()));
        assert_eq!(entry.amount, 150.5);
        assert_eq!(entry.detail_str("note"), Some("gaji"));
        assert_eq!(entry.details["tags"], serde_json::json!(["x"]));
        assert!(!entry.details.contains_key("id"));
    }

    #[test]
    fn test_entry_requires_id_and_amount() {
        assert!(serde_json::from_str::<Entry>(r#"{"amount":1}"#).is_err());
        assert!(serde_json::from_str::<Entry>(r#"{"id":1}"#).is_err());
    }

    #[test]
    fn test_date_detail() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let entry = Entry::new(1, 10.0).date(date);
        assert_eq!(entry.detail_str("date"), Some("2024-03-09"));
    }

    #[test]
    fn test_summary_from_entries() {
        let entries = vec![
            Entry::new(1, 100.0),
            Entry::new(2, -40.0),
            Entry::new(3, 0.0),
            Entry::new(4, 25.0),
        ];
        let summary = Summary::from_entries(&entries);

        assert_eq!(summary.total_entries, 4);
        assert_eq!(summary.total_income, 125.0);
        assert_eq!(summary.total_expense, 40.0);
        assert_eq!(summary.balance, 85.0);
    }

    #[test]
    fn test_summary_empty() {
        let summary = Summary::from_entries(&[]);
        assert_eq!(summary.total_entries, 0);
        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expense, 0.0);
        assert_eq!(summary.balance, 0.0);
    }
}

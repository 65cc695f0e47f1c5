//! Instrument records and the symbol keyed collection they live in

use crate::core::profile::CompanyProfile;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Column holding the rewritten description.
pub const REWRITTEN_DESCRIPTION_FIELD: &str = "description-new";

/// One listed instrument: the fields of the bulk list entry plus whatever the
/// enrichment stages add. Field order is insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InstrumentRecord {
    fields: Map<String, Value>,
}

impl InstrumentRecord {
    pub fn new(symbol: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("symbol".to_string(), Value::String(symbol.to_string()));
        Self { fields }
    }

    /// Wraps a bulk list entry. Returns `None` unless it is an object with a string symbol.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) if fields.get("symbol").is_some_and(Value::is_string) => {
                Some(Self { fields })
            }
            _ => None,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value.into());
        self
    }

    pub fn symbol(&self) -> &str {
        self.fields
            .get("symbol")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Sets a field. The symbol is the collection key and never changes.
    fn set(&mut self, key: &str, value: Value) {
        if key == "symbol" {
            return;
        }
        self.fields.insert(key.to_string(), value);
    }

    /// Writes all six profile fields; a null profile value becomes a JSON null.
    pub fn apply_profile(&mut self, profile: &CompanyProfile) {
        for (key, value) in profile.entries() {
            let value = value.map_or(Value::Null, |v| Value::String(v.to_string()));
            self.set(key, value);
        }
    }

    pub fn has_profile(&self) -> bool {
        CompanyProfile::FIELDS.iter().all(|f| self.contains(f))
    }

    /// The description to rewrite, if there is a non blank one.
    pub fn description(&self) -> Option<&str> {
        self.get_str("description").filter(|d| !d.trim().is_empty())
    }

    pub fn set_rewritten_description(&mut self, text: String) {
        self.set(REWRITTEN_DESCRIPTION_FIELD, Value::String(text));
    }

    pub fn rewritten_description(&self) -> Option<&str> {
        self.get_str(REWRITTEN_DESCRIPTION_FIELD)
    }
}

/// Records keyed by symbol, iterated in first insertion order.
///
/// Records are only ever added or updated in place, never removed.
#[derive(Debug, Clone, Default)]
pub struct RecordCollection {
    records: Vec<InstrumentRecord>,
    index: HashMap<String, usize>,
}

impl RecordCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record. A record with the same symbol is replaced in its original
    /// position and returned.
    pub fn insert(&mut self, record: InstrumentRecord) -> Option<InstrumentRecord> {
        match self.index.get(record.symbol()) {
            Some(&idx) => Some(std::mem::replace(&mut self.records[idx], record)),
            None => {
                self.index
                    .insert(record.symbol().to_string(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&InstrumentRecord> {
        self.index.get(symbol).map(|&idx| &self.records[idx])
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut InstrumentRecord> {
        self.index.get(symbol).map(|&idx| &mut self.records[idx])
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.records.iter().map(|r| r.symbol().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<InstrumentRecord> {
        self.records
    }
}

impl FromIterator<InstrumentRecord> for RecordCollection {
    fn from_iter<I: IntoIterator<Item = InstrumentRecord>>(iter: I) -> Self {
        let mut collection = RecordCollection::new();
        for record in iter {
            if let Some(previous) = collection.insert(record) {
                tracing::warn!(
                    symbol = %previous.symbol(),
                    "Duplicate symbol in listing, keeping the later entry"
                );
            }
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> CompanyProfile {
        CompanyProfile {
            currency: Some("USD".into()),
            industry: Some("Machinery".into()),
            sector: Some("Industrials".into()),
            country: Some("US".into()),
            image: None,
            description: Some("Acme Corp makes widgets.".into()),
        }
    }

    #[test]
    fn test_from_value_requires_string_symbol() {
        assert!(InstrumentRecord::from_value(json!({"symbol": "ACME", "type": "stock"})).is_some());
        assert!(InstrumentRecord::from_value(json!({"symbol": 42})).is_none());
        assert!(InstrumentRecord::from_value(json!({"name": "No symbol"})).is_none());
        assert!(InstrumentRecord::from_value(json!(["ACME"])).is_none());
    }

    #[test]
    fn test_apply_profile_keeps_static_fields() {
        let mut record = InstrumentRecord::new("ACME")
            .with("name", "Acme Corp")
            .with("type", "stock");
        assert!(!record.has_profile());

        record.apply_profile(&profile());

        assert!(record.has_profile());
        assert_eq!(record.get_str("name"), Some("Acme Corp"));
        assert_eq!(record.get_str("type"), Some("stock"));
        assert_eq!(record.get_str("sector"), Some("Industrials"));
        assert_eq!(record.get("image"), Some(&Value::Null));
        assert_eq!(record.description(), Some("Acme Corp makes widgets."));
    }

    #[test]
    fn test_apply_profile_is_idempotent() {
        let mut once = InstrumentRecord::new("ACME").with("name", "Acme Corp");
        once.apply_profile(&profile());
        let mut twice = once.clone();
        twice.apply_profile(&profile());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_symbol_cannot_be_overwritten() {
        let record = InstrumentRecord::new("ACME").with("symbol", "OTHER");
        assert_eq!(record.symbol(), "ACME");
    }

    #[test]
    fn test_blank_description_is_not_rewritable() {
        let record = InstrumentRecord::new("ACME").with("description", "   ");
        assert!(record.description().is_none());
        let record = InstrumentRecord::new("ACME").with("description", Value::Null);
        assert!(record.description().is_none());
    }

    #[test]
    fn test_collection_last_write_wins_in_first_position() {
        let collection: RecordCollection = vec![
            InstrumentRecord::new("AAA").with("name", "first"),
            InstrumentRecord::new("BBB"),
            InstrumentRecord::new("AAA").with("name", "second"),
        ]
        .into_iter()
        .collect();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.symbols(), vec!["AAA", "BBB"]);
        assert_eq!(
            collection.get("AAA").and_then(|r| r.get_str("name")),
            Some("second")
        );
    }

    #[test]
    fn test_collection_get_mut_updates_in_place() {
        let mut collection = RecordCollection::new();
        collection.insert(InstrumentRecord::new("ACME"));
        collection
            .get_mut("ACME")
            .unwrap()
            .set_rewritten_description("Short.".to_string());
        assert_eq!(
            collection.get("ACME").unwrap().rewritten_description(),
            Some("Short.")
        );
        assert!(collection.get_mut("MISSING").is_none());
        assert!(!collection.contains("MISSING"));
    }
}

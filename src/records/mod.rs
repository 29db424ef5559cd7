// SPDX-License-Identifier: GPL-3.0-or-later
// src/records/mod.rs
//
// Loosely-typed rows exchanged with the record store, and the typed
// boundary that turns them into domain values.

mod alias;
mod decode;
mod fields;
mod schema;

use std::fmt;

use serde_json::Value;

use crate::fl;

use alias::{lookup, resolve_key};
pub use alias::normalize_key;
pub use decode::{FromRecord, ToRecord};
pub use fields::{RecordField, ResultField, StudentField, TeacherField};
pub use schema::{EditorSchema, UnknownField};

/// One row of a collection, keyed by column name.
pub type Record = serde_json::Map<String, Value>;

/// Remote collections the application reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Teachers,
    Students,
    Lessons,
    Results,
}

impl Collection {
    pub const ALL: [Self; 4] = [Self::Teachers, Self::Students, Self::Lessons, Self::Results];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Teachers => "teachers",
            Self::Students => "students",
            Self::Lessons => "lessons",
            Self::Results => "results",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    pub fn label(self) -> String {
        match self {
            Self::Teachers => fl!("collection-teachers"),
            Self::Students => fl!("collection-students"),
            Self::Lessons => fl!("collection-lessons"),
            Self::Results => fl!("collection-results"),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a cell the way it would appear in the sheet.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Identifier the store uses to address a row for deletion.
pub fn row_id(record: &Record) -> Option<String> {
    ["id", "stt", "STT"]
        .iter()
        .find_map(|key| record.get(*key))
        .map(value_to_text)
        .filter(|id| !id.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collection_names_roundtrip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::parse(collection.as_str()), Some(collection));
        }
        assert_eq!(Collection::parse(" Lessons "), Some(Collection::Lessons));
        assert_eq!(Collection::parse("grades"), None);
    }

    #[test]
    fn cells_render_as_text() {
        assert_eq!(value_to_text(&json!(null)), "");
        assert_eq!(value_to_text(&json!("x")), "x");
        assert_eq!(value_to_text(&json!(8.5)), "8.5");
        assert_eq!(value_to_text(&json!(3)), "3");
        assert_eq!(value_to_text(&json!(["a"])), "[\"a\"]");
    }

    #[test]
    fn row_id_prefers_explicit_id() {
        let Value::Object(row) = json!({"stt": 4, "id": "abc"}) else {
            unreachable!()
        };
        assert_eq!(row_id(&row).as_deref(), Some("abc"));

        let Value::Object(row) = json!({"STT": 12}) else {
            unreachable!()
        };
        assert_eq!(row_id(&row).as_deref(), Some("12"));

        let Value::Object(row) = json!({"name": "x"}) else {
            unreachable!()
        };
        assert_eq!(row_id(&row), None);
    }
}

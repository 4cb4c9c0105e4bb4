use crate::error::FailureKind;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One result row: column name to stringified cell, in column order.
///
/// Column names are not guaranteed unique, so this is a list of pairs rather
/// than a map; it still serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowMap {
    entries: Vec<(String, Option<String>)>,
}

impl RowMap {
    /// Pair `columns` with `values` positionally. Surplus values are dropped and
    /// missing ones become null, so the entry count always equals the column count.
    pub fn zip(columns: &[String], values: Vec<Option<String>>) -> Self {
        let mut values = values.into_iter();
        let entries = columns
            .iter()
            .map(|c| (c.clone(), values.next().flatten()))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First cell under `column`.
    pub fn get(&self, column: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_deref())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v.as_deref()))
    }
}

impl Serialize for RowMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (column, value) in &self.entries {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Uniform result of a query: what route handlers turn into a JSON body.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Envelope {
    Success {
        /// Echo of the procedure name or query text that was run.
        reporte: String,
        data: Vec<RowMap>,
    },
    Error {
        #[serde(skip)]
        kind: FailureKind,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl Envelope {
    pub fn success(reporte: impl Into<String>, data: Vec<RowMap>) -> Self {
        Envelope::Success {
            reporte: reporte.into(),
            data,
        }
    }

    pub fn error(kind: FailureKind, message: impl Into<String>, detail: Option<String>) -> Self {
        Envelope::Error {
            kind,
            message: message.into(),
            detail,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Envelope::Success { .. } => None,
            Envelope::Error { kind, .. } => Some(*kind),
        }
    }

    /// Rows of a successful envelope; empty for errors.
    pub fn data(&self) -> &[RowMap] {
        match self {
            Envelope::Success { data, .. } => data,
            Envelope::Error { .. } => &[],
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Envelope::Success { .. } => None,
            Envelope::Error { message, .. } => Some(message),
        }
    }
}

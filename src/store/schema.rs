use csv::StringRecord;
use thiserror::Error;

pub type RecordId = u32;

pub const ID_FIELD: &str = "ID";
const UNUSED: &str = "Unused";

/// Lifecycle of a record between two saves. Never written to disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordStatus {
    Active,
    New,
    Updated,
    Deleted,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::New => "new",
            RecordStatus::Updated => "updated",
            RecordStatus::Deleted => "deleted",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry<R> {
    pub record: R,
    pub status: RecordStatus,
}

impl<R> Entry<R> {
    pub fn active(record: R) -> Self {
        Self {
            record,
            status: RecordStatus::Active,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("missing field `{0}`")]
    Missing(&'static str),
    #[error("invalid value `{value}` for field `{field}`")]
    Invalid { field: &'static str, value: String },
}

/// A data row addressed by header name.
pub struct Row<'a> {
    headers: &'a StringRecord,
    values: &'a StringRecord,
}

impl<'a> Row<'a> {
    pub fn new(headers: &'a StringRecord, values: &'a StringRecord) -> Self {
        Self { headers, values }
    }

    pub fn get(&self, name: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h.trim() == name)?;
        self.values.get(idx)
    }

    pub fn require(&self, name: &'static str) -> Result<&'a str, FieldError> {
        self.get(name).ok_or(FieldError::Missing(name))
    }

    /// Lenient integer read: missing or unparsable values fall back to zero.
    pub fn counter(&self, name: &str) -> u32 {
        self.get(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// A typed row of a flat-file store. The `ID` column is owned by the store.
pub trait Record: Clone {
    /// Column names following the leading `ID` column, in file order.
    const FIELDS: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> Result<Self, FieldError>;

    /// Values for `FIELDS`, same order and length.
    fn to_row(&self) -> Vec<String>;

    fn field(&self, name: &str) -> Option<String> {
        let idx = Self::FIELDS.iter().position(|f| *f == name)?;
        self.to_row().into_iter().nth(idx)
    }
}

pub fn headers<R: Record>() -> Vec<&'static str> {
    std::iter::once(ID_FIELD)
        .chain(R::FIELDS.iter().copied())
        .collect()
}

/// The reserved first data row: issued-id counter, last save time, last saver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provenance {
    pub issued: RecordId,
    pub saved_at: String,
    pub saved_by: String,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            issued: 0,
            saved_at: "never".to_string(),
            saved_by: "no one".to_string(),
        }
    }
}

impl Provenance {
    pub fn from_row(values: &StringRecord) -> Option<Self> {
        let issued = values.get(0)?.trim().parse().ok()?;
        Some(Self {
            issued,
            saved_at: values.get(1)?.to_string(),
            saved_by: values.get(2)?.to_string(),
        })
    }

    pub fn to_row(&self, width: usize) -> Vec<String> {
        let mut row = vec![
            self.issued.to_string(),
            self.saved_at.clone(),
            self.saved_by.clone(),
        ];
        row.resize(width.max(row.len()), UNUSED.to_string());
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_pads_to_header_width() {
        let p = Provenance {
            issued: 7,
            saved_at: "2024-01-01 10:00:00".to_string(),
            saved_by: "ann".to_string(),
        };
        let row = p.to_row(5);
        assert_eq!(row, vec!["7", "2024-01-01 10:00:00", "ann", "Unused", "Unused"]);
    }

    #[test]
    fn provenance_rejects_non_numeric_counter() {
        let values = StringRecord::from(vec!["abc", "x", "y"]);
        assert!(Provenance::from_row(&values).is_none());
    }

    #[test]
    fn row_lookup_by_header_name() {
        let headers = StringRecord::from(vec!["ID", "Name", "Type"]);
        let values = StringRecord::from(vec!["3", "bob", "user"]);
        let row = Row::new(&headers, &values);
        assert_eq!(row.get("Name"), Some("bob"));
        assert_eq!(row.get("Missing"), None);
        assert_eq!(row.require("Nope"), Err(FieldError::Missing("Nope")));
        assert_eq!(row.counter("ID"), 3);
        assert_eq!(row.counter("Name"), 0);
    }
}

//! Error types raised while loading and querying the source tables.

use std::{fmt, io};

use crate::forecast::Column;

/// A source table failed schema validation.
///
/// Raised eagerly by the loaders; the offending file (or partition) is named in
/// [`origin`](Self::origin), and the 1-based data record number is attached when
/// the failure is tied to a specific row.
#[derive(Debug, derive_more::Error)]
pub struct DataFormatError {
    /// File or partition the data came from.
    pub origin: String,
    /// 1-based record number (header excluded), if the failure is row specific.
    pub record: Option<u64>,
    pub kind: DataFormatErrorKind,
}

impl DataFormatError {
    pub(crate) fn new(origin: impl Into<String>, kind: DataFormatErrorKind) -> Self {
        Self {
            origin: origin.into(),
            record: None,
            kind,
        }
    }

    pub(crate) fn at_record(
        origin: impl Into<String>,
        record: u64,
        kind: DataFormatErrorKind,
    ) -> Self {
        Self {
            origin: origin.into(),
            record: Some(record),
            kind,
        }
    }
}

impl fmt::Display for DataFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record {
            Some(record) => write!(f, "{} (record {record}): {}", self.origin, self.kind),
            None => write!(f, "{}: {}", self.origin, self.kind),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum DataFormatErrorKind {
    #[display("failed to read file: {source}")]
    Io { source: io::Error },
    #[display("malformed CSV: {source}")]
    Csv { source: csv::Error },
    #[display("required column `{column}` is absent")]
    MissingColumn { column: &'static str },
    #[display("neither `timestamp` nor `fcast_date` column is present")]
    MissingTimeColumn,
    #[display("required value in column `{column}` is empty")]
    MissingValue { column: &'static str },
    #[display("value {value:?} in column `{column}` is not {expected}")]
    InvalidValue {
        column: &'static str,
        value: String,
        expected: &'static str,
    },
    #[display("question id {ifp_id:?} appears more than once")]
    DuplicateQuestion { ifp_id: String },
}

impl DataFormatErrorKind {
    pub(crate) fn invalid(column: &'static str, value: &str, expected: &'static str) -> Self {
        Self::InvalidValue {
            column,
            value: value.to_owned(),
            expected,
        }
    }
}

/// An operation needs columns that are absent from its input table.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("missing required columns: {columns}")]
pub struct MissingColumnError {
    pub columns: ColumnList,
}

/// Sorted list of column names, displayed comma separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnList(pub Vec<Column>);

impl fmt::Display for ColumnList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, column) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(column.name())?;
        }
        Ok(())
    }
}

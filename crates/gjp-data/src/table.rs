//! Row-level access to delimited source files.
//!
//! Source files are read as raw bytes and decoded lossily, so a stray
//! non-UTF-8 byte in free text never aborts a load. Cells containing `NA` or
//! nothing at all are treated as nulls.

use std::{collections::HashMap, io, str::FromStr};

use crate::error::{DataFormatError, DataFormatErrorKind};

const NULL_MARKERS: [&str; 2] = ["NA", ""];

/// Header of a delimited file, mapping column names to field positions.
#[derive(Debug, Clone, Default)]
pub(crate) struct Header {
    positions: HashMap<String, usize>,
}

impl Header {
    fn from_byte_record(record: &csv::ByteRecord) -> Self {
        let positions = record
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let name = String::from_utf8_lossy(name);
                (name.trim_start_matches('\u{feff}').trim().to_owned(), idx)
            })
            .collect();
        Self { positions }
    }

    pub(crate) fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

/// A delimited file whose header has been read but whose rows have not.
pub(crate) struct CsvTable<R> {
    origin: String,
    header: Header,
    reader: csv::Reader<R>,
}

impl<R> CsvTable<R>
where
    R: io::Read,
{
    pub(crate) fn new(
        origin: impl Into<String>,
        mut reader: csv::Reader<R>,
    ) -> Result<Self, DataFormatError> {
        let origin = origin.into();
        let header = match reader.byte_headers() {
            Ok(record) => Header::from_byte_record(record),
            Err(source) => {
                return Err(DataFormatError::new(
                    origin,
                    DataFormatErrorKind::Csv { source },
                ));
            }
        };
        Ok(Self {
            origin,
            header,
            reader,
        })
    }

    pub(crate) fn origin(&self) -> &str {
        &self.origin
    }

    pub(crate) fn header(&self) -> &Header {
        &self.header
    }

    pub(crate) fn require_column(&self, column: &'static str) -> Result<(), DataFormatError> {
        if self.header.contains(column) {
            Ok(())
        } else {
            Err(DataFormatError::new(
                self.origin.clone(),
                DataFormatErrorKind::MissingColumn { column },
            ))
        }
    }

    /// Parses every remaining record with `parse_row`, stopping at the first failure.
    pub(crate) fn parse_rows<T, F>(mut self, mut parse_row: F) -> Result<Vec<T>, DataFormatError>
    where
        F: FnMut(&Row<'_>) -> Result<T, DataFormatErrorKind>,
    {
        let mut rows = vec![];
        let mut raw = csv::ByteRecord::new();
        let mut record_no = 0;
        loop {
            record_no += 1;
            match self.reader.read_byte_record(&mut raw) {
                Ok(true) => {}
                Ok(false) => break,
                Err(source) => {
                    return Err(DataFormatError::at_record(
                        self.origin,
                        record_no,
                        DataFormatErrorKind::Csv { source },
                    ));
                }
            }
            let record = csv::StringRecord::from_byte_record_lossy(raw.clone());
            let row = Row {
                header: &self.header,
                record: &record,
            };
            match parse_row(&row) {
                Ok(value) => rows.push(value),
                Err(kind) => {
                    return Err(DataFormatError::at_record(self.origin, record_no, kind));
                }
            }
        }
        Ok(rows)
    }
}

/// A single decoded record.
pub(crate) struct Row<'a> {
    header: &'a Header,
    record: &'a csv::StringRecord,
}

impl Row<'_> {
    /// Cell content, or `None` if the column is absent or the cell is null.
    pub(crate) fn value(&self, column: &str) -> Option<&str> {
        let value = self.record.get(self.header.position(column)?)?.trim();
        (!NULL_MARKERS.contains(&value)).then_some(value)
    }

    pub(crate) fn required(&self, column: &'static str) -> Result<&str, DataFormatErrorKind> {
        self.value(column)
            .ok_or(DataFormatErrorKind::MissingValue { column })
    }

    pub(crate) fn parse_with<T, F>(
        &self,
        column: &'static str,
        expected: &'static str,
        parse: F,
    ) -> Result<Option<T>, DataFormatErrorKind>
    where
        F: FnOnce(&str) -> Option<T>,
    {
        self.value(column)
            .map(|value| {
                parse(value).ok_or_else(|| DataFormatErrorKind::invalid(column, value, expected))
            })
            .transpose()
    }

    pub(crate) fn parse<T>(
        &self,
        column: &'static str,
        expected: &'static str,
    ) -> Result<Option<T>, DataFormatErrorKind>
    where
        T: FromStr,
    {
        self.parse_with(column, expected, |value| value.parse().ok())
    }

    pub(crate) fn parse_required<T>(
        &self,
        column: &'static str,
        expected: &'static str,
    ) -> Result<T, DataFormatErrorKind>
    where
        T: FromStr,
    {
        self.parse(column, expected)?
            .ok_or(DataFormatErrorKind::MissingValue { column })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(data: &str) -> CsvTable<&[u8]> {
        let reader = csv::ReaderBuilder::new().from_reader(data.as_bytes());
        CsvTable::new("test.csv", reader).unwrap()
    }

    #[test]
    fn test_null_markers() {
        let rows = table("a,b,c\n1,NA,\n")
            .parse_rows(|row| {
                Ok((
                    row.value("a").map(str::to_owned),
                    row.value("b").map(str::to_owned),
                    row.value("c").map(str::to_owned),
                    row.value("missing").map(str::to_owned),
                ))
            })
            .unwrap();
        assert_eq!(rows, [(Some("1".to_owned()), None, None, None)]);
    }

    #[test]
    fn test_parse_failure_reports_record_number() {
        let err = table("n\n1\n2\nx\n")
            .parse_rows(|row| row.parse_required::<u32>("n", "an integer"))
            .unwrap_err();
        assert_eq!(err.record, Some(3));
        assert!(matches!(
            err.kind,
            DataFormatErrorKind::InvalidValue { column: "n", .. }
        ));
    }

    #[test]
    fn test_require_column() {
        let table = table("a,b\n");
        assert!(table.require_column("a").is_ok());
        let err = table.require_column("z").unwrap_err();
        assert!(matches!(
            err.kind,
            DataFormatErrorKind::MissingColumn { column: "z" }
        ));
    }

    #[test]
    fn test_lossy_decoding() {
        let data: &[u8] = b"title\ncaf\xe9\n";
        let reader = csv::ReaderBuilder::new().from_reader(data);
        let rows = CsvTable::new("test.csv", reader)
            .unwrap()
            .parse_rows(|row| Ok(row.required("title")?.to_owned()))
            .unwrap();
        assert_eq!(rows, ["caf\u{fffd}"]);
    }
}

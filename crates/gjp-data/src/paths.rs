//! Locations of the source files inside the data directory.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::forecast::Year;

const DATAVERSE_DIR: &str = "dataverse_files";
const QUESTIONS_FILE: &str = "ifps.csv";

/// Resolves the dataset files relative to a data root.
///
/// ```text
/// <data_dir>/dataverse_files/ifps.csv
/// <data_dir>/dataverse_files/survey_fcasts.yr{1..4}.csv
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    data_dir: PathBuf,
}

impl DataPaths {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn questions_csv(&self) -> PathBuf {
        self.data_dir.join(DATAVERSE_DIR).join(QUESTIONS_FILE)
    }

    #[must_use]
    pub fn forecast_partition_csv(&self, year: Year) -> PathBuf {
        self.data_dir
            .join(DATAVERSE_DIR)
            .join(PartitionName(year).to_string())
    }
}

/// File name of a yearly forecast partition, e.g. `survey_fcasts.yr2.csv`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PartitionName(pub Year);

impl fmt::Display for PartitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "survey_fcasts.yr{}.csv", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = DataPaths::new("/srv/gjp");
        assert_eq!(
            paths.questions_csv(),
            Path::new("/srv/gjp/dataverse_files/ifps.csv")
        );
        let year = Year::new(3).unwrap();
        assert_eq!(
            paths.forecast_partition_csv(year),
            Path::new("/srv/gjp/dataverse_files/survey_fcasts.yr3.csv")
        );
    }
}

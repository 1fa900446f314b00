//! Reuse of loaded tables across queries.
//!
//! Loading the forecast partitions is by far the most expensive step, so a
//! [`DatasetCache`] keeps the most recently loaded catalog and forecast log and
//! hands out shared references to them. Each table has a single slot: asking
//! for a different year selection replaces the cached log.

use std::sync::Arc;

use crate::{
    error::DataFormatError,
    forecast::{ForecastLog, Years},
    paths::DataPaths,
    question::Catalog,
};

#[derive(Debug)]
pub struct DatasetCache {
    paths: DataPaths,
    catalog: Option<Arc<Catalog>>,
    forecasts: Option<(Years, Arc<ForecastLog>)>,
}

impl DatasetCache {
    #[must_use]
    pub fn new(paths: DataPaths) -> Self {
        Self {
            paths,
            catalog: None,
            forecasts: None,
        }
    }

    #[must_use]
    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// The question catalog, loaded on first use.
    pub fn catalog(&mut self) -> Result<Arc<Catalog>, DataFormatError> {
        if let Some(catalog) = &self.catalog {
            tracing::trace!("question catalog served from cache");
            return Ok(Arc::clone(catalog));
        }
        let catalog = Arc::new(Catalog::load(self.paths.questions_csv())?);
        self.catalog = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// The forecast log for `years`, reloaded when the selection changes.
    pub fn forecasts(&mut self, years: &Years) -> Result<Arc<ForecastLog>, DataFormatError> {
        match &self.forecasts {
            Some((cached_years, log)) if cached_years == years => {
                tracing::trace!("forecast log served from cache");
                return Ok(Arc::clone(log));
            }
            _ => {}
        }
        let log = Arc::new(ForecastLog::load(&self.paths, years)?);
        self.forecasts = Some((years.clone(), Arc::clone(&log)));
        Ok(log)
    }

    /// Drops every cached table; the next access reloads from disk.
    pub fn reset(&mut self) {
        self.catalog = None;
        self.forecasts = None;
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::*;
    use crate::{
        forecast::Year,
        question::tests::{HEADER, KURDISTAN},
    };

    fn data_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gjp-data-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("dataverse_files")).unwrap();
        dir
    }

    fn write_questions(paths: &DataPaths) {
        fs::write(paths.questions_csv(), format!("{HEADER}\r{KURDISTAN}\r")).unwrap();
    }

    fn write_partition(paths: &DataPaths, year: u8, rows: &[&str]) {
        let mut data = "ifp_id,user_id,fcast_type,answer_option,value,fcast_date".to_owned();
        for row in rows {
            data.push('\n');
            data.push_str(row);
        }
        let path = paths.forecast_partition_csv(Year::new(year).unwrap());
        fs::write(path, data).unwrap();
    }

    #[test]
    fn test_catalog_is_loaded_once() {
        let dir = data_dir("catalog");
        let paths = DataPaths::new(&dir);
        write_questions(&paths);

        let mut cache = DatasetCache::new(paths.clone());
        let first = cache.catalog().unwrap();
        fs::remove_file(paths.questions_csv()).unwrap();
        let second = cache.catalog().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        cache.reset();
        assert!(cache.catalog().is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_forecasts_slot_is_keyed_by_years() {
        let dir = data_dir("forecasts");
        let paths = DataPaths::new(&dir);
        write_partition(&paths, 1, &["6413-0,u1,0,a,0.4,2011-09-02"]);
        write_partition(
            &paths,
            2,
            &["6413-0,u2,0,a,0.6,2012-09-02", "6413-0,u2,1,a,0.7,2012-09-03"],
        );

        let mut cache = DatasetCache::new(paths);
        let year1 = Years::new([Year::new(1).unwrap()]).unwrap();
        let both = Years::new([Year::new(1).unwrap(), Year::new(2).unwrap()]).unwrap();

        let a = cache.forecasts(&year1).unwrap();
        let b = cache.forecasts(&year1).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 1);

        let c = cache.forecasts(&both).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.len(), 3);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_partition_names_the_file() {
        let dir = data_dir("missing");
        let mut cache = DatasetCache::new(DataPaths::new(&dir));
        let years = Years::new([Year::new(4).unwrap()]).unwrap();
        let err = cache.forecasts(&years).unwrap_err();
        assert!(err.to_string().contains("survey_fcasts.yr4.csv"));
        let _ = fs::remove_dir_all(&dir);
    }
}

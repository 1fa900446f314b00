//! Survey forecasts: one event per user action on a question.
//!
//! Forecasts are published as one file per tournament year. The partitions are
//! loaded independently and concatenated into a single [`ForecastLog`]. Older
//! partitions do not carry every column (most notably the fine-grained
//! `timestamp`), so a log tracks its [`Schema`] explicitly and downstream
//! operations consult it rather than assuming a fixed layout.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fs::File,
    io,
};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    AnswerOption,
    error::{ColumnList, DataFormatError, DataFormatErrorKind, MissingColumnError},
    paths::{DataPaths, PartitionName},
    question::{Catalog, QuestionStatus},
    table::{CsvTable, Row},
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Forecast type (`fcast_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum ForecastType {
    /// Intended to mark a user's first forecast on a question.
    ///
    /// The flag is populated inconsistently upstream; some users have no `New`
    /// row at all, so it must not be used to find first forecasts.
    #[display("new")]
    New,
    /// Subsequent forecast by a user.
    #[display("update")]
    Update,
    /// Update with no change in value.
    #[display("affirm")]
    Affirm,
    /// User withdraws; scoring stops after this date.
    #[display("withdraw")]
    Withdraw,
}

impl ForecastType {
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::New),
            1 => Some(Self::Update),
            2 => Some(Self::Affirm),
            4 => Some(Self::Withdraw),
            _ => None,
        }
    }
}

/// Tournament year, `1..=4`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct Year(u8);

impl Year {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 4;

    #[must_use]
    pub fn new(year: u8) -> Option<Self> {
        (Self::FIRST..=Self::LAST)
            .contains(&year)
            .then_some(Self(year))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

/// A non-empty set of yearly partitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Years(BTreeSet<Year>);

impl Years {
    /// Returns `None` if `years` is empty.
    #[must_use]
    pub fn new<I>(years: I) -> Option<Self>
    where
        I: IntoIterator<Item = Year>,
    {
        let years = years.into_iter().collect::<BTreeSet<_>>();
        (!years.is_empty()).then_some(Self(years))
    }

    #[must_use]
    pub fn all() -> Self {
        Self((Year::FIRST..=Year::LAST).map(Year).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = Year> + '_ {
        self.0.iter().copied()
    }
}

impl Default for Years {
    fn default() -> Self {
        Self::all()
    }
}

/// Columns of the forecast files, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    IfpId,
    Ctt,
    Cond,
    Training,
    Team,
    UserId,
    ForecastId,
    FcastType,
    AnswerOption,
    Value,
    FcastDate,
    Expertise,
    QStatus,
    Viewtime,
    Year,
    Timestamp,
}

impl Column {
    pub const ALL: [Column; 16] = [
        Column::IfpId,
        Column::Ctt,
        Column::Cond,
        Column::Training,
        Column::Team,
        Column::UserId,
        Column::ForecastId,
        Column::FcastType,
        Column::AnswerOption,
        Column::Value,
        Column::FcastDate,
        Column::Expertise,
        Column::QStatus,
        Column::Viewtime,
        Column::Year,
        Column::Timestamp,
    ];

    /// Columns a partition must have to be loaded at all.
    const LOAD_REQUIRED: [Column; 5] = [
        Column::IfpId,
        Column::UserId,
        Column::FcastType,
        Column::AnswerOption,
        Column::Value,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Column::IfpId => "ifp_id",
            Column::Ctt => "ctt",
            Column::Cond => "cond",
            Column::Training => "training",
            Column::Team => "team",
            Column::UserId => "user_id",
            Column::ForecastId => "forecast_id",
            Column::FcastType => "fcast_type",
            Column::AnswerOption => "answer_option",
            Column::Value => "value",
            Column::FcastDate => "fcast_date",
            Column::Expertise => "expertise",
            Column::QStatus => "q_status",
            Column::Viewtime => "viewtime",
            Column::Year => "year",
            Column::Timestamp => "timestamp",
        }
    }

    /// Whether a present column may contain nulls.
    fn is_nullable(self) -> bool {
        matches!(self, Column::Team | Column::Expertise | Column::Viewtime)
    }
}

/// The set of columns present in a forecast table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema(BTreeSet<Column>);

impl Schema {
    #[must_use]
    pub fn new<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = Column>,
    {
        Self(columns.into_iter().collect())
    }

    #[must_use]
    pub fn all() -> Self {
        Self::new(Column::ALL)
    }

    #[must_use]
    pub fn contains(&self, column: Column) -> bool {
        self.0.contains(&column)
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.0.iter().copied()
    }

    /// Fails with the columns of `required` that are absent.
    pub fn require(&self, required: &[Column]) -> Result<(), MissingColumnError> {
        let mut missing = required
            .iter()
            .copied()
            .filter(|c| !self.contains(*c))
            .collect::<Vec<_>>();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort_unstable();
        missing.dedup();
        Err(MissingColumnError {
            columns: ColumnList(missing),
        })
    }

    #[must_use]
    pub fn intersection(&self, other: &Schema) -> Schema {
        Schema(self.0.intersection(&other.0).copied().collect())
    }
}

/// A single forecast event.
///
/// Fields backing optional columns are `None` whenever the column is absent
/// from the owning log's schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastEvent {
    pub ifp_id: String,
    pub user_id: String,
    pub answer_option: AnswerOption,
    /// Probability estimate in `[0, 1]`.
    pub value: f64,
    pub fcast_type: ForecastType,
    /// Forecast identifier, increasing within a partition.
    pub forecast_id: Option<i64>,
    pub fcast_date: Option<NaiveDate>,
    pub timestamp: Option<NaiveDateTime>,
    /// User condition assignment code.
    pub ctt: Option<String>,
    pub cond: Option<u32>,
    pub training: Option<String>,
    pub team: Option<String>,
    /// Self-rated expertise, `1..=5`.
    pub expertise: Option<u8>,
    pub q_status: Option<QuestionStatus>,
    pub viewtime: Option<f64>,
    pub year: Option<Year>,
}

impl ForecastEvent {
    #[must_use]
    pub fn new(
        ifp_id: impl Into<String>,
        user_id: impl Into<String>,
        answer_option: AnswerOption,
        value: f64,
        fcast_type: ForecastType,
    ) -> Self {
        Self {
            ifp_id: ifp_id.into(),
            user_id: user_id.into(),
            answer_option,
            value,
            fcast_type,
            forecast_id: None,
            fcast_date: None,
            timestamp: None,
            ctt: None,
            cond: None,
            training: None,
            team: None,
            expertise: None,
            q_status: None,
            viewtime: None,
            year: None,
        }
    }

    #[must_use]
    pub fn with_forecast_id(mut self, forecast_id: i64) -> Self {
        self.forecast_id = Some(forecast_id);
        self
    }

    #[must_use]
    pub fn with_fcast_date(mut self, fcast_date: NaiveDate) -> Self {
        self.fcast_date = Some(fcast_date);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    fn from_row(row: &Row<'_>, schema: &Schema) -> Result<Self, DataFormatErrorKind> {
        let required = |column: Column| {
            cell(row, schema, column)?.ok_or(DataFormatErrorKind::MissingValue {
                column: column.name(),
            })
        };

        let fcast_type = parse_cell(
            cell(row, schema, Column::FcastType)?,
            Column::FcastType,
            "one of 0, 1, 2, 4",
            |v| v.parse().ok().and_then(ForecastType::from_code),
        )?
        .ok_or(DataFormatErrorKind::MissingValue {
            column: Column::FcastType.name(),
        })?;
        let answer_option = parse_cell(
            Some(required(Column::AnswerOption)?),
            Column::AnswerOption,
            "an option letter a..e",
            AnswerOption::parse,
        )?
        .ok_or(DataFormatErrorKind::MissingValue {
            column: Column::AnswerOption.name(),
        })?;
        let value = parse_cell(
            Some(required(Column::Value)?),
            Column::Value,
            "a probability in [0, 1]",
            |v| {
                v.parse::<f64>()
                    .ok()
                    .filter(|p| (0.0..=1.0).contains(p))
            },
        )?
        .ok_or(DataFormatErrorKind::MissingValue {
            column: Column::Value.name(),
        })?;
        // Some ids are written in scientific notation.
        let forecast_id = parse_cell(
            cell(row, schema, Column::ForecastId)?,
            Column::ForecastId,
            "an integer id",
            parse_float_id,
        )?;
        let fcast_date = parse_cell(
            cell(row, schema, Column::FcastDate)?,
            Column::FcastDate,
            "a date in yyyy-mm-dd format",
            |v| NaiveDate::parse_from_str(v, DATE_FORMAT).ok(),
        )?;
        let timestamp = parse_cell(
            cell(row, schema, Column::Timestamp)?,
            Column::Timestamp,
            "a timestamp in yyyy-mm-dd HH:MM:SS format",
            |v| NaiveDateTime::parse_from_str(v, TIMESTAMP_FORMAT).ok(),
        )?;
        let cond = parse_cell(
            cell(row, schema, Column::Cond)?,
            Column::Cond,
            "a condition number >= 1",
            |v| v.parse::<u32>().ok().filter(|c| *c >= 1),
        )?;
        let expertise = parse_cell(
            cell(row, schema, Column::Expertise)?,
            Column::Expertise,
            "an expertise rating in 1..=5",
            |v| v.parse::<u8>().ok().filter(|e| (1..=5).contains(e)),
        )?;
        let q_status = parse_cell(
            cell(row, schema, Column::QStatus)?,
            Column::QStatus,
            "one of closed, voided",
            QuestionStatus::parse,
        )?;
        let viewtime = parse_cell(
            cell(row, schema, Column::Viewtime)?,
            Column::Viewtime,
            "a number",
            |v| v.parse::<f64>().ok(),
        )?;
        let year = parse_cell(
            cell(row, schema, Column::Year)?,
            Column::Year,
            "a year in 1..=4",
            |v| v.parse().ok().and_then(Year::new),
        )?;

        Ok(Self {
            ifp_id: required(Column::IfpId)?.to_owned(),
            user_id: required(Column::UserId)?.to_owned(),
            answer_option,
            value,
            fcast_type,
            forecast_id,
            fcast_date,
            timestamp,
            ctt: cell(row, schema, Column::Ctt)?.map(str::to_owned),
            cond,
            training: cell(row, schema, Column::Training)?.map(str::to_owned),
            team: cell(row, schema, Column::Team)?.map(str::to_owned),
            expertise,
            q_status,
            viewtime,
            year,
        })
    }

    /// Clears the fields of columns absent from `schema`.
    fn restrict_to(&mut self, schema: &Schema) {
        macro_rules! clear_absent {
            ($($column:ident => $field:ident),* $(,)?) => {
                $(if !schema.contains(Column::$column) { self.$field = None; })*
            };
        }
        clear_absent!(
            ForecastId => forecast_id,
            FcastDate => fcast_date,
            Timestamp => timestamp,
            Ctt => ctt,
            Cond => cond,
            Training => training,
            Team => team,
            Expertise => expertise,
            QStatus => q_status,
            Viewtime => viewtime,
            Year => year,
        );
    }
}

/// Cell content of a column present in `schema`; nulls are rejected for non-nullable columns.
fn cell<'r>(
    row: &'r Row<'_>,
    schema: &Schema,
    column: Column,
) -> Result<Option<&'r str>, DataFormatErrorKind> {
    if !schema.contains(column) {
        return Ok(None);
    }
    match row.value(column.name()) {
        None if !column.is_nullable() => Err(DataFormatErrorKind::MissingValue {
            column: column.name(),
        }),
        value => Ok(value),
    }
}

fn parse_cell<T, F>(
    value: Option<&str>,
    column: Column,
    expected: &'static str,
    parse: F,
) -> Result<Option<T>, DataFormatErrorKind>
where
    F: FnOnce(&str) -> Option<T>,
{
    value
        .map(|value| {
            parse(value).ok_or_else(|| DataFormatErrorKind::invalid(column.name(), value, expected))
        })
        .transpose()
}

#[expect(clippy::cast_possible_truncation)]
fn parse_float_id(value: &str) -> Option<i64> {
    let id = value.parse::<f64>().ok()?;
    (id.is_finite() && id.fract() == 0.0 && id.abs() < 2f64.powi(53)).then_some(id as i64)
}

/// Number of forecasts submitted by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserForecastCount {
    pub user_id: String,
    pub count: usize,
}

/// An immutable table of forecast events with an explicit schema.
#[derive(Debug, Clone, Default)]
pub struct ForecastLog {
    schema: Schema,
    events: Vec<ForecastEvent>,
}

impl ForecastLog {
    /// Builds a log; fields of columns outside `schema` are cleared.
    #[must_use]
    pub fn new(schema: Schema, mut events: Vec<ForecastEvent>) -> Self {
        for event in &mut events {
            event.restrict_to(&schema);
        }
        Self { schema, events }
    }

    /// Loads the given yearly partitions and concatenates them in year order.
    pub fn load(paths: &DataPaths, years: &Years) -> Result<Self, DataFormatError> {
        let partitions = years
            .iter()
            .map(|year| {
                let path = paths.forecast_partition_csv(year);
                let origin = format!("partition {}", PartitionName(year));
                let file = File::open(&path).map_err(|source| {
                    DataFormatError::new(&origin, DataFormatErrorKind::Io { source })
                })?;
                let log = Self::from_reader(origin, io::BufReader::new(file))?;
                tracing::info!(
                    path = %path.display(),
                    year = %year,
                    events = log.len(),
                    "loaded forecast partition"
                );
                Ok(log)
            })
            .collect::<Result<Vec<_>, DataFormatError>>()?;
        let log = Self::concat(partitions);
        tracing::debug!(
            events = log.len(),
            columns = log.schema.0.len(),
            "concatenated forecast partitions"
        );
        Ok(log)
    }

    /// Parses a single partition from CSV data.
    pub fn from_reader<R>(origin: impl Into<String>, reader: R) -> Result<Self, DataFormatError>
    where
        R: io::Read,
    {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let table = CsvTable::new(origin, reader)?;
        for column in Column::LOAD_REQUIRED {
            table.require_column(column.name())?;
        }
        let schema = Schema::new(
            Column::ALL
                .into_iter()
                .filter(|c| table.header().contains(c.name())),
        );
        if !schema.contains(Column::FcastDate) && !schema.contains(Column::Timestamp) {
            return Err(DataFormatError::new(
                table.origin(),
                DataFormatErrorKind::MissingTimeColumn,
            ));
        }
        let events = table.parse_rows(|row| ForecastEvent::from_row(row, &schema))?;
        Ok(Self { schema, events })
    }

    /// Concatenates logs in order.
    ///
    /// The resulting schema holds the columns common to every input, so all
    /// events of a log can be ordered by the same key.
    #[must_use]
    pub fn concat<I>(logs: I) -> Self
    where
        I: IntoIterator<Item = ForecastLog>,
    {
        let mut logs = logs.into_iter();
        let Some(first) = logs.next() else {
            return Self::default();
        };
        let (mut schema, mut events) = (first.schema, first.events);
        for log in logs {
            schema = schema.intersection(&log.schema);
            events.extend(log.events);
        }
        Self::new(schema, events)
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn events(&self) -> &[ForecastEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// A copy of the log narrowed to `columns`.
    #[must_use]
    pub fn project(&self, columns: &[Column]) -> ForecastLog {
        let schema = self
            .schema
            .intersection(&Schema::new(columns.iter().copied()));
        Self::new(schema, self.events.clone())
    }

    /// Events on studied questions only (an inner join against the studied catalog).
    #[must_use]
    pub fn filter_studied(&self, catalog: &Catalog) -> ForecastLog {
        let events = self
            .events
            .iter()
            .filter(|e| catalog.is_studied(&e.ifp_id))
            .cloned()
            .collect::<Vec<_>>();
        tracing::debug!(
            total = self.len(),
            studied = events.len(),
            "filtered studied forecasts"
        );
        Self {
            schema: self.schema.clone(),
            events,
        }
    }

    /// Forecast counts per user, most active first.
    #[must_use]
    pub fn forecast_counts_by_user(&self) -> Vec<UserForecastCount> {
        let mut counts = HashMap::<&str, usize>::new();
        for event in &self.events {
            *counts.entry(event.user_id.as_str()).or_default() += 1;
        }
        let mut counts = counts
            .into_iter()
            .map(|(user_id, count)| UserForecastCount {
                user_id: user_id.to_owned(),
                count,
            })
            .collect::<Vec<_>>();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.user_id.cmp(&b.user_id)));
        counts
    }

    #[must_use]
    pub fn most_active_user_id(&self) -> Option<String> {
        self.forecast_counts_by_user()
            .into_iter()
            .next()
            .map(|c| c.user_id)
    }

    #[must_use]
    pub fn unique_users(&self) -> usize {
        self.events
            .iter()
            .map(|e| e.user_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Event counts per year, for events that carry one.
    #[must_use]
    pub fn counts_by_year(&self) -> BTreeMap<Year, usize> {
        let mut counts = BTreeMap::new();
        for year in self.events.iter().filter_map(|e| e.year) {
            *counts.entry(year).or_default() += 1;
        }
        counts
    }

    /// Number of (question, user) pairs that never received a `New` event.
    #[must_use]
    pub fn pairs_without_new(&self) -> usize {
        let mut has_new = HashMap::<(&str, &str), bool>::new();
        for event in &self.events {
            *has_new
                .entry((event.ifp_id.as_str(), event.user_id.as_str()))
                .or_default() |= event.fcast_type == ForecastType::New;
        }
        has_new.values().filter(|has| !**has).count()
    }

    /// Studied events, in chronological order when a timestamp is available.
    #[must_use]
    pub fn simple(&self, catalog: &Catalog) -> ForecastLog {
        let mut log = self.filter_studied(catalog);
        if log.schema.contains(Column::Timestamp) {
            log.events.sort_by_key(|e| e.timestamp);
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::tests::question;

    const HEADER: &str = "ifp_id,ctt,cond,training,team,user_id,forecast_id,fcast_type,answer_option,value,fcast_date,expertise,q_status,viewtime,year,timestamp";

    fn parse(header: &str, rows: &[&str]) -> Result<ForecastLog, DataFormatError> {
        let mut data = header.to_owned();
        for row in rows {
            data.push('\n');
            data.push_str(row);
        }
        ForecastLog::from_reader("survey_fcasts.yr1.csv", data.as_bytes())
    }

    #[test]
    fn test_parse_full_row() {
        let log = parse(
            HEADER,
            &["1001-0,1a,1,a,NA,3001,1.02e5,0,a,0.75,2011-09-02,3,Closed,12.5,1,2011-09-02 10:11:12"],
        )
        .unwrap();
        assert_eq!(log.schema(), &Schema::all());
        let event = &log.events()[0];
        assert_eq!(event.forecast_id, Some(102_000));
        assert_eq!(event.fcast_type, ForecastType::New);
        assert_eq!(event.answer_option, AnswerOption::A);
        assert_eq!(event.team, None);
        assert_eq!(event.q_status, Some(QuestionStatus::Closed));
        assert_eq!(event.year, Year::new(1));
        assert_eq!(
            event.timestamp,
            NaiveDate::from_ymd_opt(2011, 9, 2)
                .unwrap()
                .and_hms_opt(10, 11, 12)
        );
    }

    #[test]
    fn test_partition_without_timestamp_column() {
        let log = parse(
            "ifp_id,user_id,forecast_id,fcast_type,answer_option,value,fcast_date",
            &["1001-0,3001,5,1,b,0.2,2011-09-02"],
        )
        .unwrap();
        assert!(!log.schema().contains(Column::Timestamp));
        assert!(log.schema().contains(Column::FcastDate));
        assert_eq!(log.events()[0].timestamp, None);
    }

    #[test]
    fn test_rejects_partition_without_time_columns() {
        let err = parse(
            "ifp_id,user_id,fcast_type,answer_option,value",
            &["1001-0,3001,0,a,0.5"],
        )
        .unwrap_err();
        assert!(matches!(err.kind, DataFormatErrorKind::MissingTimeColumn));
        assert_eq!(err.origin, "survey_fcasts.yr1.csv");
    }

    #[test]
    fn test_rejects_probability_out_of_range() {
        let err = parse(
            "ifp_id,user_id,fcast_type,answer_option,value,fcast_date",
            &["1001-0,3001,0,a,0.5,2011-09-02", "1001-0,3001,0,b,1.5,2011-09-02"],
        )
        .unwrap_err();
        assert_eq!(err.record, Some(2));
        assert!(matches!(
            err.kind,
            DataFormatErrorKind::InvalidValue { column: "value", .. }
        ));
    }

    #[test]
    fn test_rejects_unknown_forecast_type() {
        let err = parse(
            "ifp_id,user_id,fcast_type,answer_option,value,fcast_date",
            &["1001-0,3001,3,a,0.5,2011-09-02"],
        )
        .unwrap_err();
        assert!(matches!(
            err.kind,
            DataFormatErrorKind::InvalidValue {
                column: "fcast_type",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_null_in_present_time_column() {
        let err = parse(
            "ifp_id,user_id,fcast_type,answer_option,value,fcast_date",
            &["1001-0,3001,0,a,0.5,NA"],
        )
        .unwrap_err();
        assert!(matches!(
            err.kind,
            DataFormatErrorKind::MissingValue {
                column: "fcast_date"
            }
        ));
    }

    fn event(ifp_id: &str, user_id: &str, fcast_type: ForecastType) -> ForecastEvent {
        ForecastEvent::new(ifp_id, user_id, AnswerOption::A, 0.5, fcast_type)
    }

    #[test]
    fn test_concat_keeps_common_columns() {
        let day = NaiveDate::from_ymd_opt(2013, 1, 1).unwrap();
        let older = ForecastLog::new(
            Schema::new([Column::IfpId, Column::UserId, Column::FcastDate]),
            vec![event("1", "u1", ForecastType::New).with_fcast_date(day)],
        );
        let newer = ForecastLog::new(
            Schema::all(),
            vec![
                event("1", "u2", ForecastType::New)
                    .with_fcast_date(day)
                    .with_timestamp(day.and_hms_opt(1, 0, 0).unwrap()),
            ],
        );
        let log = ForecastLog::concat([older, newer]);
        assert_eq!(log.len(), 2);
        assert!(log.schema().contains(Column::FcastDate));
        assert!(!log.schema().contains(Column::Timestamp));
        assert!(log.events().iter().all(|e| e.timestamp.is_none()));
    }

    #[test]
    fn test_project_and_require() {
        let log = ForecastLog::new(Schema::all(), vec![]);
        assert!(log.schema().require(&[Column::UserId]).is_ok());
        let narrowed = log.project(&[Column::IfpId, Column::Value]);
        let err = narrowed
            .schema()
            .require(&[Column::IfpId, Column::UserId, Column::AnswerOption])
            .unwrap_err();
        assert_eq!(err.columns.0, [Column::UserId, Column::AnswerOption]);
        assert_eq!(
            err.to_string(),
            "missing required columns: user_id, answer_option"
        );
    }

    #[test]
    fn test_filter_studied_joins_on_question() {
        let catalog = Catalog::from_questions(vec![
            question("1001-0", QuestionStatus::Closed, 2),
            question("1002-0", QuestionStatus::Voided, 2),
            question("1003-0", QuestionStatus::Closed, 3),
        ])
        .unwrap();
        let log = ForecastLog::new(
            Schema::all(),
            vec![
                event("1001-0", "u1", ForecastType::New),
                event("1002-0", "u1", ForecastType::New),
                event("1003-0", "u1", ForecastType::New),
                event("9999-0", "u1", ForecastType::New),
                event("1001-0", "u2", ForecastType::Update),
            ],
        );
        let studied = log.filter_studied(&catalog);
        assert_eq!(studied.len(), 2);
        assert!(studied.events().iter().all(|e| e.ifp_id == "1001-0"));
    }

    #[test]
    fn test_forecast_counts_by_user() {
        let log = ForecastLog::new(
            Schema::all(),
            vec![
                event("1", "u1", ForecastType::New),
                event("1", "u2", ForecastType::New),
                event("2", "u2", ForecastType::New),
                event("1", "u3", ForecastType::New),
                event("2", "u3", ForecastType::Update),
                event("3", "u3", ForecastType::Affirm),
            ],
        );
        let counts = log.forecast_counts_by_user();
        let counts = counts
            .iter()
            .map(|c| (c.user_id.as_str(), c.count))
            .collect::<Vec<_>>();
        assert_eq!(counts, [("u3", 3), ("u2", 2), ("u1", 1)]);
        assert_eq!(log.most_active_user_id().as_deref(), Some("u3"));
        assert_eq!(log.unique_users(), 3);
    }

    #[test]
    fn test_pairs_without_new() {
        let log = ForecastLog::new(
            Schema::all(),
            vec![
                event("1", "u1", ForecastType::New),
                event("1", "u1", ForecastType::Update),
                event("1", "u2", ForecastType::Update),
                event("1", "u2", ForecastType::Affirm),
            ],
        );
        assert_eq!(log.pairs_without_new(), 1);
    }

    #[test]
    fn test_simple_orders_studied_events_by_timestamp() {
        let catalog = Catalog::from_questions(vec![
            question("1001-0", QuestionStatus::Closed, 2),
            question("1002-0", QuestionStatus::Voided, 2),
        ])
        .unwrap();
        let day = NaiveDate::from_ymd_opt(2014, 11, 3).unwrap();
        let log = ForecastLog::new(
            Schema::all(),
            vec![
                event("1001-0", "u1", ForecastType::Update)
                    .with_timestamp(day.and_hms_opt(12, 0, 0).unwrap()),
                event("1002-0", "u1", ForecastType::New)
                    .with_timestamp(day.and_hms_opt(8, 0, 0).unwrap()),
                event("1001-0", "u2", ForecastType::New)
                    .with_timestamp(day.and_hms_opt(9, 30, 0).unwrap()),
            ],
        );
        let simple = log.simple(&catalog);
        let users = simple
            .events()
            .iter()
            .map(|e| e.user_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(users, ["u2", "u1"]);
    }
}

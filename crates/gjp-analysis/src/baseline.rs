//! Baseline extraction: each user's earliest forecast on a question.
//!
//! A baseline is chosen purely by chronological order. The `fcast_type` flag
//! that is supposed to mark first forecasts is not populated reliably (many
//! users have no `New` event at all), so it is never consulted here.
//!
//! # Ordering Key
//!
//! Events are ordered by whichever of the following columns the log's schema
//! contains, in this order of precedence:
//!
//! ```text
//! timestamp  >  fcast_date  >  forecast_id
//! ```
//!
//! Every event of a log uses the same key because the schema is shared. A
//! missing value orders after every present one. When two events have equal
//! keys, the one encountered first in log order (partition, then file order)
//! is kept.
//!
//! # Examples
//!
//! ```
//! use gjp_analysis::baseline;
//! use gjp_data::{
//!     AnswerOption,
//!     forecast::{Column, ForecastEvent, ForecastLog, ForecastType, Schema},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let log = ForecastLog::new(
//!     Schema::new([
//!         Column::IfpId,
//!         Column::UserId,
//!         Column::AnswerOption,
//!         Column::Value,
//!         Column::ForecastId,
//!     ]),
//!     vec![
//!         ForecastEvent::new("1001-0", "u1", AnswerOption::A, 0.7, ForecastType::Update)
//!             .with_forecast_id(12),
//!         ForecastEvent::new("1001-0", "u1", AnswerOption::A, 0.4, ForecastType::Update)
//!             .with_forecast_id(10),
//!     ],
//! );
//!
//! let p_a = baseline::baseline_p_a(&log)?;
//! assert_eq!(p_a.len(), 1);
//! assert_eq!(p_a[0].p_a, 0.4);
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use gjp_data::{
    AnswerOption,
    error::MissingColumnError,
    forecast::{Column, ForecastEvent, ForecastLog, Schema},
    question::{Catalog, QuestionStatus},
};
use gjp_stats::descriptive::DescriptiveStats;
use serde::Serialize;

/// Columns every baseline operation reads.
pub const REQUIRED_COLUMNS: [Column; 4] = [
    Column::IfpId,
    Column::UserId,
    Column::AnswerOption,
    Column::Value,
];

/// A user's earliest forecast for one option of one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineRecord {
    pub ifp_id: String,
    pub user_id: String,
    pub answer_option: AnswerOption,
    pub value: f64,
    /// Present only when the log carries the `timestamp` column.
    pub timestamp: Option<NaiveDateTime>,
    /// Present only when the log carries the `fcast_date` column.
    pub fcast_date: Option<NaiveDate>,
    pub forecast_id: Option<i64>,
}

impl BaselineRecord {
    fn from_event(event: &ForecastEvent) -> Self {
        Self {
            ifp_id: event.ifp_id.clone(),
            user_id: event.user_id.clone(),
            answer_option: event.answer_option,
            value: event.value,
            timestamp: event.timestamp,
            fcast_date: event.fcast_date,
            forecast_id: event.forecast_id,
        }
    }

    /// Best available time of the baseline: the timestamp, else the start of its date.
    #[must_use]
    pub fn time(&self) -> Option<NaiveDateTime> {
        self.timestamp
            .or_else(|| self.fcast_date.and_then(|d| d.and_hms_opt(0, 0, 0)))
    }
}

/// A user's baseline probability for option "a" of a binary question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineProbability {
    pub ifp_id: String,
    pub user_id: String,
    pub p_a: f64,
}

/// Summary of the baselines of one option of one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineAggregate {
    pub ifp_id: String,
    pub answer_option: AnswerOption,
    pub mean: f64,
    pub median: f64,
    pub n_users: usize,
}

/// An optional value that orders after every present value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Last<T> {
    Present(T),
    Missing,
}

impl<T> From<Option<T>> for Last<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Self::Present)
    }
}

type EventKey = (Last<NaiveDateTime>, Last<NaiveDate>, Last<i64>);

/// Which time columns take part in the ordering key.
#[derive(Debug, Clone, Copy)]
struct OrderingKey {
    timestamp: bool,
    fcast_date: bool,
    forecast_id: bool,
}

impl OrderingKey {
    fn for_schema(schema: &Schema) -> Self {
        Self {
            timestamp: schema.contains(Column::Timestamp),
            fcast_date: schema.contains(Column::FcastDate),
            forecast_id: schema.contains(Column::ForecastId),
        }
    }

    fn key(self, event: &ForecastEvent) -> EventKey {
        (
            event.timestamp.filter(|_| self.timestamp).into(),
            event.fcast_date.filter(|_| self.fcast_date).into(),
            event.forecast_id.filter(|_| self.forecast_id).into(),
        )
    }

    fn column_names(self) -> Vec<&'static str> {
        [
            (self.timestamp, Column::Timestamp),
            (self.fcast_date, Column::FcastDate),
            (self.forecast_id, Column::ForecastId),
        ]
        .into_iter()
        .filter_map(|(used, column)| used.then(|| column.name()))
        .collect()
    }
}

/// Earliest event of each (question, user, option) group accepted by `filter`,
/// ordered by group.
fn earliest_events<'a, F>(
    log: &'a ForecastLog,
    mut filter: F,
) -> Result<Vec<&'a ForecastEvent>, MissingColumnError>
where
    F: FnMut(&ForecastEvent) -> bool,
{
    log.schema().require(&REQUIRED_COLUMNS)?;
    let ordering = OrderingKey::for_schema(log.schema());
    tracing::debug!(key = ?ordering.column_names(), "ordering forecasts for baselines");

    let mut earliest = BTreeMap::<(&str, &str, AnswerOption), (EventKey, &ForecastEvent)>::new();
    for event in log.events().iter().filter(|e| filter(e)) {
        let key = ordering.key(event);
        let group = (
            event.ifp_id.as_str(),
            event.user_id.as_str(),
            event.answer_option,
        );
        match earliest.get_mut(&group) {
            // Strictly earlier only: on equal keys the first event seen stays.
            Some(current) if key < current.0 => *current = (key, event),
            Some(_) => {}
            None => {
                earliest.insert(group, (key, event));
            }
        }
    }
    Ok(earliest.into_values().map(|(_, event)| event).collect())
}

/// One baseline per (question, user, option) present in `log`.
///
/// Output is sorted by question, user and option.
pub fn baselines(log: &ForecastLog) -> Result<Vec<BaselineRecord>, MissingColumnError> {
    let records = earliest_events(log, |_| true)?
        .into_iter()
        .map(BaselineRecord::from_event)
        .collect::<Vec<_>>();
    tracing::debug!(
        events = log.len(),
        baselines = records.len(),
        "extracted baselines"
    );
    Ok(records)
}

/// One baseline probability for option "a" per (question, user).
///
/// Binary questions record both options on every forecast, so option "a"
/// alone determines the forecast.
pub fn baseline_p_a(log: &ForecastLog) -> Result<Vec<BaselineProbability>, MissingColumnError> {
    let probabilities = earliest_events(log, |e| e.answer_option == AnswerOption::A)?
        .into_iter()
        .map(|event| BaselineProbability {
            ifp_id: event.ifp_id.clone(),
            user_id: event.user_id.clone(),
            p_a: event.value,
        })
        .collect::<Vec<_>>();
    tracing::debug!(
        events = log.len(),
        baselines = probabilities.len(),
        "extracted option a baselines"
    );
    Ok(probabilities)
}

/// Mean, median and user count of the baselines of each (question, option).
pub fn aggregate_baselines(
    log: &ForecastLog,
) -> Result<Vec<BaselineAggregate>, MissingColumnError> {
    let records = baselines(log)?;
    let mut groups = BTreeMap::<(&str, AnswerOption), (Vec<f64>, BTreeSet<&str>)>::new();
    for record in &records {
        let (values, users) = groups
            .entry((record.ifp_id.as_str(), record.answer_option))
            .or_default();
        values.push(record.value);
        users.insert(record.user_id.as_str());
    }
    let aggregates = groups
        .into_iter()
        .filter_map(|((ifp_id, answer_option), (values, users))| {
            let stats = DescriptiveStats::new(values)?;
            Some(BaselineAggregate {
                ifp_id: ifp_id.to_owned(),
                answer_option,
                mean: stats.mean,
                median: stats.median,
                n_users: users.len(),
            })
        })
        .collect();
    Ok(aggregates)
}

/// A user's baseline on one question, as shown on a per-user timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserQuestionBaseline {
    pub ifp_id: String,
    pub short_title: String,
    /// Earliest baseline time over the question's options.
    pub time: Option<NaiveDateTime>,
    /// Option probabilities, e.g. `a: 0.3, b: 0.7`.
    pub label: String,
    pub top_option: AnswerOption,
    pub top_probability: f64,
    /// Whether the top option turned out to be the outcome, if the outcome is known.
    pub is_correct: Option<bool>,
}

/// Per-question baseline summaries of `user_id`, limited to closed questions
/// of `catalog` and ordered by time.
#[must_use]
pub fn summarize_user_baselines(
    records: &[BaselineRecord],
    catalog: &Catalog,
    user_id: &str,
) -> Vec<UserQuestionBaseline> {
    let mut by_question = BTreeMap::<&str, Vec<&BaselineRecord>>::new();
    for record in records.iter().filter(|r| r.user_id == user_id) {
        by_question.entry(record.ifp_id.as_str()).or_default().push(record);
    }

    let mut summaries = by_question
        .into_iter()
        .filter_map(|(ifp_id, mut options)| {
            let question = catalog
                .get(ifp_id)
                .filter(|q| q.status == QuestionStatus::Closed)?;
            options.sort_by_key(|r| r.answer_option);
            let top = options
                .iter()
                .copied()
                .reduce(|best, r| if r.value > best.value { r } else { best })?;
            let label = options
                .iter()
                .map(|r| format!("{}: {}", r.answer_option, r.value))
                .collect::<Vec<_>>()
                .join(", ");
            Some(UserQuestionBaseline {
                ifp_id: ifp_id.to_owned(),
                short_title: question.short_title.clone(),
                time: options.iter().filter_map(|r| r.time()).min(),
                label,
                top_option: top.answer_option,
                top_probability: top.value,
                is_correct: question.outcome.map(|outcome| outcome == top.answer_option),
            })
        })
        .collect::<Vec<_>>();
    summaries.sort_by(|a, b| (a.time, &a.ifp_id).cmp(&(b.time, &b.ifp_id)));
    summaries
}

/// A user with a typical-to-high amount of activity: the user at the 80th
/// percentile when users are ordered by their number of baselines.
#[must_use]
pub fn pick_representative_user(records: &[BaselineRecord]) -> Option<String> {
    let mut counts = HashMap::<&str, usize>::new();
    for record in records {
        *counts.entry(record.user_id.as_str()).or_default() += 1;
    }
    let mut counts = counts.into_iter().collect::<Vec<_>>();
    counts.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    let idx = ((counts.len() as f64) * 0.8).floor() as usize;
    let idx = idx.min(counts.len().checked_sub(1)?);
    Some(counts[idx].0.to_owned())
}

#[cfg(test)]
mod tests {
    use gjp_data::forecast::ForecastType;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 3, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn event(
        user_id: &str,
        answer_option: AnswerOption,
        value: f64,
        fcast_type: ForecastType,
        time: NaiveDateTime,
    ) -> ForecastEvent {
        ForecastEvent::new("1001-0", user_id, answer_option, value, fcast_type)
            .with_timestamp(time)
            .with_fcast_date(time.date())
    }

    fn values(records: &[BaselineRecord]) -> Vec<(&str, AnswerOption, f64)> {
        records
            .iter()
            .map(|r| (r.user_id.as_str(), r.answer_option, r.value))
            .collect()
    }

    #[test]
    fn test_three_users_new_then_update() {
        let mut events = vec![];
        for (i, user) in ["u1", "u2", "u3"].into_iter().enumerate() {
            let p = 0.1 * (i as f64 + 1.0);
            let t = u32::try_from(i).unwrap();
            events.push(event(user, AnswerOption::A, p, ForecastType::New, at(1, t)));
            events.push(event(user, AnswerOption::B, 1.0 - p, ForecastType::New, at(1, t)));
            events.push(event(user, AnswerOption::A, 0.9, ForecastType::Update, at(5, t)));
            events.push(event(user, AnswerOption::B, 0.1, ForecastType::Update, at(5, t)));
        }
        let log = ForecastLog::new(Schema::all(), events);

        let records = baselines(&log).unwrap();
        assert_eq!(records.len(), 6);
        for record in &records {
            let expected = events_first_value(&log, &record.user_id, record.answer_option);
            assert!((record.value - expected).abs() < 1e-12);
        }

        let p_a = baseline_p_a(&log).unwrap();
        assert_eq!(p_a.len(), 3);
        let from_records = records
            .iter()
            .filter(|r| r.answer_option == AnswerOption::A)
            .map(|r| (r.user_id.clone(), r.value))
            .collect::<Vec<_>>();
        let from_p_a = p_a
            .iter()
            .map(|p| (p.user_id.clone(), p.p_a))
            .collect::<Vec<_>>();
        assert_eq!(from_records, from_p_a);
    }

    fn events_first_value(log: &ForecastLog, user_id: &str, option: AnswerOption) -> f64 {
        log.events()
            .iter()
            .find(|e| e.user_id == user_id && e.answer_option == option)
            .unwrap()
            .value
    }

    #[test]
    fn test_user_without_new_event_keeps_earliest_update() {
        let log = ForecastLog::new(
            Schema::all(),
            vec![
                event("u1", AnswerOption::A, 0.8, ForecastType::Update, at(9, 0)),
                event("u1", AnswerOption::A, 0.35, ForecastType::Update, at(2, 0)),
            ],
        );
        let records = baselines(&log).unwrap();
        assert_eq!(values(&records), [("u1", AnswerOption::A, 0.35)]);
    }

    #[test]
    fn test_earliest_event_wins_over_new_flag() {
        let log = ForecastLog::new(
            Schema::all(),
            vec![
                event("u1", AnswerOption::A, 0.6, ForecastType::New, at(4, 0)),
                event("u1", AnswerOption::A, 0.2, ForecastType::Affirm, at(3, 0)),
            ],
        );
        let records = baselines(&log).unwrap();
        assert_eq!(values(&records), [("u1", AnswerOption::A, 0.2)]);
    }

    #[test]
    fn test_timestamp_takes_precedence_over_sequence() {
        let log = ForecastLog::new(
            Schema::all(),
            vec![
                event("u1", AnswerOption::A, 0.6, ForecastType::New, at(1, 12)).with_forecast_id(1),
                event("u1", AnswerOption::A, 0.3, ForecastType::New, at(1, 8)).with_forecast_id(2),
            ],
        );
        assert_eq!(baselines(&log).unwrap()[0].value, 0.3);
    }

    #[test]
    fn test_falls_back_to_sequence_without_time_columns() {
        let schema = Schema::new([
            Column::IfpId,
            Column::UserId,
            Column::AnswerOption,
            Column::Value,
            Column::ForecastId,
        ]);
        let log = ForecastLog::new(
            schema,
            vec![
                event("u1", AnswerOption::A, 0.6, ForecastType::New, at(1, 0)).with_forecast_id(7),
                event("u1", AnswerOption::A, 0.3, ForecastType::New, at(9, 0)).with_forecast_id(3),
            ],
        );
        let records = baselines(&log).unwrap();
        assert_eq!(records[0].value, 0.3);
        assert_eq!(records[0].timestamp, None);
        assert_eq!(records[0].fcast_date, None);
    }

    #[test]
    fn test_same_day_ties_keep_first_encountered() {
        let schema = Schema::new([
            Column::IfpId,
            Column::UserId,
            Column::AnswerOption,
            Column::Value,
            Column::FcastDate,
        ]);
        let log = ForecastLog::new(
            schema,
            vec![
                event("u1", AnswerOption::A, 0.45, ForecastType::New, at(2, 10)),
                event("u1", AnswerOption::A, 0.55, ForecastType::Update, at(2, 18)),
            ],
        );
        assert_eq!(baselines(&log).unwrap()[0].value, 0.45);
    }

    #[test]
    fn test_missing_required_column() {
        let log = ForecastLog::new(
            Schema::new([Column::IfpId, Column::AnswerOption, Column::Value]),
            vec![],
        );
        let err = baselines(&log).unwrap_err();
        assert_eq!(err.columns.0, [Column::UserId]);
        assert!(baseline_p_a(&log).is_err());
        assert!(aggregate_baselines(&log).is_err());
    }

    #[test]
    fn test_empty_log_yields_empty_results() {
        let log = ForecastLog::new(Schema::all(), vec![]);
        assert!(baselines(&log).unwrap().is_empty());
        assert!(baseline_p_a(&log).unwrap().is_empty());
        assert!(aggregate_baselines(&log).unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_matches_naive_recomputation() {
        let log = ForecastLog::new(
            Schema::all(),
            vec![
                event("u1", AnswerOption::A, 0.2, ForecastType::New, at(1, 0)),
                event("u2", AnswerOption::A, 0.4, ForecastType::New, at(1, 1)),
                event("u3", AnswerOption::A, 0.9, ForecastType::New, at(1, 2)),
                event("u3", AnswerOption::A, 0.1, ForecastType::Update, at(2, 2)),
                event("u4", AnswerOption::A, 0.5, ForecastType::New, at(1, 3)),
                event("u1", AnswerOption::B, 0.8, ForecastType::New, at(1, 0)),
            ],
        );
        let aggregates = aggregate_baselines(&log).unwrap();
        assert_eq!(aggregates.len(), 2);

        let a = &aggregates[0];
        assert_eq!(a.answer_option, AnswerOption::A);
        assert_eq!(a.n_users, 4);
        let naive = [0.2, 0.4, 0.9, 0.5];
        let mean = naive.iter().sum::<f64>() / 4.0;
        assert!((a.mean - mean).abs() < 1e-12);
        assert!((a.median - 0.45).abs() < 1e-12);

        let b = &aggregates[1];
        assert_eq!(b.answer_option, AnswerOption::B);
        assert_eq!(b.n_users, 1);
        assert!((b.median - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_summarize_user_baselines() {
        use gjp_data::question::{Question, QuestionType};

        let question = |ifp_id: &str, status, outcome| Question {
            ifp_id: ifp_id.to_owned(),
            q_type: QuestionType::Regular,
            q_text: String::new(),
            q_desc: None,
            status,
            date_start: day(1),
            date_suspend: None,
            date_to_close: None,
            date_closed: None,
            outcome,
            short_title: format!("title {ifp_id}"),
            days_open: None,
            n_opts: 2,
            options: String::new(),
        };
        let catalog = Catalog::from_questions(vec![
            question("1001-0", QuestionStatus::Closed, Some(AnswerOption::B)),
            question("1002-0", QuestionStatus::Voided, None),
        ])
        .unwrap();

        let record = |ifp_id: &str, answer_option, value, d| BaselineRecord {
            ifp_id: ifp_id.to_owned(),
            user_id: "u1".to_owned(),
            answer_option,
            value,
            timestamp: None,
            fcast_date: Some(day(d)),
            forecast_id: None,
        };
        let records = vec![
            record("1001-0", AnswerOption::A, 0.3, 4),
            record("1001-0", AnswerOption::B, 0.7, 4),
            record("1002-0", AnswerOption::A, 0.5, 2),
        ];

        let summaries = summarize_user_baselines(&records, &catalog, "u1");
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.label, "a: 0.3, b: 0.7");
        assert_eq!(summary.top_option, AnswerOption::B);
        assert_eq!(summary.is_correct, Some(true));
        assert_eq!(summary.time, day(4).and_hms_opt(0, 0, 0));
        assert!(summarize_user_baselines(&records, &catalog, "u2").is_empty());
    }

    #[test]
    fn test_pick_representative_user() {
        let record = |user_id: &str, ifp_id: &str| BaselineRecord {
            ifp_id: ifp_id.to_owned(),
            user_id: user_id.to_owned(),
            answer_option: AnswerOption::A,
            value: 0.5,
            timestamp: None,
            fcast_date: None,
            forecast_id: None,
        };
        // Counts: u1=1, u2=2, u3=3, u4=4, u5=5 -> index floor(5 * 0.8) = 4.
        let mut records = vec![];
        for (n, user) in ["u1", "u2", "u3", "u4", "u5"].into_iter().enumerate() {
            for q in 0..=n {
                records.push(record(user, &format!("q{q}")));
            }
        }
        assert_eq!(pick_representative_user(&records).as_deref(), Some("u5"));
        assert_eq!(pick_representative_user(&records[..1]).as_deref(), Some("u1"));
        assert_eq!(pick_representative_user(&[]), None);
    }
}

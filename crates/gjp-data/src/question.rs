//! Individual Forecasting Problems (IFPs) and the question catalog.
//!
//! The catalog is loaded once from `ifps.csv`, validated row by row, and then
//! treated as read-only. [`Question::is_studied`] is the single place that
//! decides which questions take part in the analysis.

use std::{collections::HashMap, fs::File, io, path::Path};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    AnswerOption,
    error::{DataFormatError, DataFormatErrorKind},
    table::{CsvTable, Row},
};

const DATE_FORMAT: &str = "%m/%d/%y";
const DATETIME_FORMAT: &str = "%m/%d/%y %H:%M";

const COLUMNS: [&str; 14] = [
    "ifp_id",
    "q_type",
    "q_text",
    "q_desc",
    "q_status",
    "date_start",
    "date_suspend",
    "date_to_close",
    "date_closed",
    "outcome",
    "short_title",
    "days_open",
    "n_opts",
    "options",
];

/// Lifecycle state of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    #[display("closed")]
    Closed,
    #[display("voided")]
    Voided,
}

impl QuestionStatus {
    /// Parses a status, ignoring case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "closed" => Some(Self::Closed),
            "voided" => Some(Self::Voided),
            _ => None,
        }
    }
}

/// Question type (`q_type`).
///
/// Conditional questions (cIFPs) ask about an outcome given that one of the
/// options of another question happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QuestionType {
    Regular,
    ConditionalOption1,
    ConditionalOption2,
    ConditionalOption3,
    ConditionalOption4,
    ConditionalOption5,
    OrderedMultinomial,
}

impl QuestionType {
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Regular,
            1 => Self::ConditionalOption1,
            2 => Self::ConditionalOption2,
            3 => Self::ConditionalOption3,
            4 => Self::ConditionalOption4,
            5 => Self::ConditionalOption5,
            6 => Self::OrderedMultinomial,
            _ => return None,
        })
    }
}

/// A single forecasting question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    /// Unique identifier, e.g. `1001-0`.
    pub ifp_id: String,
    pub q_type: QuestionType,
    pub q_text: String,
    /// Resolution criteria and additional information.
    pub q_desc: Option<String>,
    pub status: QuestionStatus,
    pub date_start: NaiveDate,
    pub date_suspend: Option<NaiveDateTime>,
    /// Scheduled end date.
    pub date_to_close: Option<NaiveDate>,
    /// Actual resolution date.
    pub date_closed: Option<NaiveDate>,
    /// Resolved answer, absent for unresolved or voided questions.
    pub outcome: Option<AnswerOption>,
    pub short_title: String,
    pub days_open: Option<u32>,
    /// Number of answer options, in `2..=5`.
    pub n_opts: u8,
    /// Answer option text, e.g. `(a) Yes, (b) No`.
    pub options: String,
}

impl Question {
    pub const MIN_OPTIONS: u8 = 2;
    pub const MAX_OPTIONS: u8 = 5;

    /// Whether the question takes part in the analysis: not voided, and binary.
    #[must_use]
    pub fn is_studied(&self) -> bool {
        self.status != QuestionStatus::Voided && self.n_opts == 2
    }

    fn from_row(row: &Row<'_>) -> Result<Self, DataFormatErrorKind> {
        let q_type = row
            .parse_with("q_type", "a question type in 0..=6", |v| {
                v.parse().ok().and_then(QuestionType::from_code)
            })?
            .ok_or(DataFormatErrorKind::MissingValue { column: "q_type" })?;
        let status = row
            .parse_with("q_status", "one of closed, voided", QuestionStatus::parse)?
            .ok_or(DataFormatErrorKind::MissingValue { column: "q_status" })?;
        let date_start = parse_date(row, "date_start")?
            .ok_or(DataFormatErrorKind::MissingValue { column: "date_start" })?;
        let n_opts = row
            .parse_with("n_opts", "an option count in 2..=5", |v| {
                v.parse::<u8>()
                    .ok()
                    .filter(|n| (Self::MIN_OPTIONS..=Self::MAX_OPTIONS).contains(n))
            })?
            .ok_or(DataFormatErrorKind::MissingValue { column: "n_opts" })?;

        Ok(Self {
            ifp_id: row.required("ifp_id")?.to_owned(),
            q_type,
            q_text: row.required("q_text")?.to_owned(),
            q_desc: row.value("q_desc").map(str::to_owned),
            status,
            date_start,
            // Suspension times are recorded inconsistently; unparseable values become null.
            date_suspend: row
                .value("date_suspend")
                .and_then(|v| NaiveDateTime::parse_from_str(v, DATETIME_FORMAT).ok()),
            date_to_close: parse_date(row, "date_to_close")?,
            date_closed: parse_date(row, "date_closed")?,
            outcome: row.parse_with("outcome", "an option letter a..e", AnswerOption::parse)?,
            short_title: row.required("short_title")?.to_owned(),
            days_open: row.parse("days_open", "a non-negative day count")?,
            n_opts,
            options: row.required("options")?.to_owned(),
        })
    }
}

fn parse_date(
    row: &Row<'_>,
    column: &'static str,
) -> Result<Option<NaiveDate>, DataFormatErrorKind> {
    row.parse_with(column, "a date in mm/dd/yy format", |v| {
        NaiveDate::parse_from_str(v, DATE_FORMAT).ok()
    })
}

/// The full set of questions, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    questions: Vec<Question>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate question ids.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, DataFormatErrorKind> {
        let mut index = HashMap::with_capacity(questions.len());
        for (idx, question) in questions.iter().enumerate() {
            if index.insert(question.ifp_id.clone(), idx).is_some() {
                return Err(DataFormatErrorKind::DuplicateQuestion {
                    ifp_id: question.ifp_id.clone(),
                });
            }
        }
        Ok(Self { questions, index })
    }

    /// Loads and validates the questions file.
    pub fn load<P>(path: P) -> Result<Self, DataFormatError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let file = File::open(path)
            .map_err(|source| DataFormatError::new(&origin, DataFormatErrorKind::Io { source }))?;
        let catalog = Self::from_reader(origin, io::BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            questions = catalog.len(),
            "loaded question catalog"
        );
        Ok(catalog)
    }

    /// Parses questions from carriage-return delimited CSV data.
    pub fn from_reader<R>(origin: impl Into<String>, reader: R) -> Result<Self, DataFormatError>
    where
        R: io::Read,
    {
        let reader = csv::ReaderBuilder::new()
            .terminator(csv::Terminator::Any(b'\r'))
            .trim(csv::Trim::All)
            .from_reader(reader);
        let table = CsvTable::new(origin, reader)?;
        for column in COLUMNS {
            table.require_column(column)?;
        }
        let origin = table.origin().to_owned();
        let questions = table.parse_rows(Question::from_row)?;
        Self::from_questions(questions).map_err(|kind| DataFormatError::new(origin, kind))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn get(&self, ifp_id: &str) -> Option<&Question> {
        self.index.get(ifp_id).map(|&idx| &self.questions[idx])
    }

    /// Whether `ifp_id` names a studied question.
    #[must_use]
    pub fn is_studied(&self, ifp_id: &str) -> bool {
        self.get(ifp_id).is_some_and(Question::is_studied)
    }

    /// Questions in scope for the analysis: non-voided and binary.
    #[must_use]
    pub fn filter_studied(&self) -> Catalog {
        let questions = self
            .questions
            .iter()
            .filter(|q| q.is_studied())
            .cloned()
            .collect::<Vec<_>>();
        let index = questions
            .iter()
            .enumerate()
            .map(|(idx, q)| (q.ifp_id.clone(), idx))
            .collect();
        tracing::debug!(
            total = self.len(),
            studied = questions.len(),
            "filtered studied questions"
        );
        Catalog { questions, index }
    }

    /// Studied questions ordered by opening then closing date.
    #[must_use]
    pub fn simple(&self) -> Vec<&Question> {
        let mut questions = self
            .questions
            .iter()
            .filter(|q| q.is_studied())
            .collect::<Vec<_>>();
        questions.sort_by(|a, b| {
            (a.date_start, a.date_closed, &a.ifp_id).cmp(&(b.date_start, b.date_closed, &b.ifp_id))
        });
        questions
    }
}

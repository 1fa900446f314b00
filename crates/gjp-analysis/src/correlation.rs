//! Cross-question correlation of baseline probabilities.
//!
//! The pipeline has three steps:
//!
//! 1. **Select** ([`select_candidate_questions`]): keep questions with enough
//!    baselines and enough distinct values for a correlation to be meaningful
//! 2. **Correlate** ([`pairwise_correlation`]): pivot baselines into a
//!    user × question [`BaselineMatrix`] and compute the Pearson coefficient of
//!    every ordered question pair over the users who answered both
//! 3. **Rank** ([`unique_pairs`], [`CorrelationMatrix::top_per_question`]):
//!    order pairs by squared coefficient
//!
//! The squared coefficient `r2` is only used to rank pairs by strength; the
//! direction of a relationship is carried by the sign of `corr`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use gjp_stats::{correlation::Correlation, descriptive::distinct_count};
use serde::Serialize;

use crate::{baseline::BaselineProbability, error::InsufficientDataError};

/// Order of the selected candidate questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Question id ascending.
    #[default]
    IfpId,
    /// Number of baselines descending, ties by question id.
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCriteria {
    /// Minimum number of baselines on a question.
    pub min_n: usize,
    /// Minimum number of distinct baseline values on a question.
    pub min_unique: usize,
    pub sort_by: SortBy,
    /// Keep only the first `k` questions after sorting.
    pub first_k: Option<usize>,
}

impl Default for CandidateCriteria {
    fn default() -> Self {
        Self {
            min_n: 2,
            min_unique: 2,
            sort_by: SortBy::IfpId,
            first_k: None,
        }
    }
}

/// Questions whose baselines can take part in a correlation.
///
/// Questions where every user gave the same probability are dropped by
/// `min_unique`: their correlation with anything is undefined.
#[must_use]
pub fn select_candidate_questions(
    baselines: &[BaselineProbability],
    criteria: &CandidateCriteria,
) -> Vec<String> {
    let mut values = BTreeMap::<&str, Vec<f64>>::new();
    for baseline in baselines.iter().filter(|b| b.p_a.is_finite()) {
        values
            .entry(baseline.ifp_id.as_str())
            .or_default()
            .push(baseline.p_a);
    }

    let mut candidates = values
        .into_iter()
        .filter(|(_, values)| {
            values.len() >= criteria.min_n
                && distinct_count(values.iter().copied()) >= criteria.min_unique
        })
        .map(|(ifp_id, values)| (ifp_id, values.len()))
        .collect::<Vec<_>>();
    match criteria.sort_by {
        // Already ordered by the map.
        SortBy::IfpId => {}
        SortBy::Count => candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))),
    }
    if let Some(k) = criteria.first_k {
        candidates.truncate(k);
    }
    tracing::debug!(
        selected = candidates.len(),
        min_n = criteria.min_n,
        min_unique = criteria.min_unique,
        "selected candidate questions"
    );
    candidates
        .into_iter()
        .map(|(ifp_id, _)| ifp_id.to_owned())
        .collect()
}

/// Baseline probabilities pivoted to one row per user and one column per question.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineMatrix {
    questions: Vec<String>,
    users: Vec<String>,
    /// `rows[user][question]`, `None` if the user has no baseline on the question.
    rows: Vec<Vec<Option<f64>>>,
}

impl BaselineMatrix {
    /// Pivots `baselines` onto `questions`.
    ///
    /// Users without a baseline on any of `questions` get no row.
    #[must_use]
    pub fn pivot(baselines: &[BaselineProbability], questions: &[String]) -> Self {
        let column_of = questions
            .iter()
            .enumerate()
            .map(|(idx, q)| (q.as_str(), idx))
            .collect::<HashMap<_, _>>();
        let mut rows = BTreeMap::<&str, Vec<Option<f64>>>::new();
        for baseline in baselines {
            let Some(&col) = column_of.get(baseline.ifp_id.as_str()) else {
                continue;
            };
            rows.entry(baseline.user_id.as_str())
                .or_insert_with(|| vec![None; questions.len()])[col] = Some(baseline.p_a);
        }
        let (users, rows) = rows
            .into_iter()
            .map(|(user, row)| (user.to_owned(), row))
            .unzip();
        Self {
            questions: questions.to_vec(),
            users,
            rows,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    #[must_use]
    pub fn users(&self) -> &[String] {
        &self.users
    }

    #[must_use]
    pub fn get(&self, user: usize, question: usize) -> Option<f64> {
        self.rows[user][question]
    }

    /// Pearson correlation of two columns over the users who have both values.
    #[must_use]
    pub fn correlate(&self, x: usize, y: usize) -> Correlation {
        Correlation::pearson(
            self.rows
                .iter()
                .filter_map(|row| Some((row[x]?, row[y]?))),
        )
    }
}

/// Correlation of one ordered question pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationCell {
    pub ifp_id_x: String,
    pub ifp_id_y: String,
    /// Pearson coefficient; NaN if undefined.
    pub corr: f64,
    /// Number of users with a baseline on both questions.
    pub n_users: usize,
    pub r2: f64,
}

/// A cell together with its dense rank by `r2` within its row (1 = strongest).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCell {
    #[serde(flatten)]
    pub cell: CorrelationCell,
    pub rank: usize,
}

/// Correlations of every ordered pair of the selected questions, self-pairs included.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    questions: Vec<String>,
    /// Row-major, `questions.len()` squared cells.
    cells: Vec<CorrelationCell>,
}

impl CorrelationMatrix {
    #[must_use]
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    #[must_use]
    pub fn cells(&self) -> &[CorrelationCell] {
        &self.cells
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> &CorrelationCell {
        &self.cells[x * self.questions.len() + y]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CorrelationCell]> {
        self.cells.chunks(self.questions.len().max(1))
    }

    /// Off-diagonal cells of a row with a defined coefficient.
    fn related(row: &[CorrelationCell]) -> impl Iterator<Item = &CorrelationCell> {
        row.iter()
            .filter(|c| c.ifp_id_x != c.ifp_id_y && c.corr.is_finite())
    }

    /// Question ids ordered by their strongest correlation with another question.
    ///
    /// Questions without any defined off-diagonal coefficient come last.
    #[must_use]
    pub fn axis_order_by_r2(&self) -> Vec<String> {
        let mut order = self
            .rows()
            .zip(&self.questions)
            .map(|(row, ifp_id)| {
                let max_r2 = Self::related(row).map(|c| c.r2).reduce(f64::max);
                (ifp_id, max_r2)
            })
            .collect::<Vec<_>>();
        order.sort_by(|a, b| match (a.1, b.1) {
            (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.0.cmp(b.0)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(b.0),
        });
        order.into_iter().map(|(ifp_id, _)| ifp_id.clone()).collect()
    }

    /// For every question, the cells of dense rank `1..=top_k` by `r2`.
    ///
    /// Self-pairs and undefined coefficients are excluded. Equal `r2` values
    /// share a rank, so a row can yield more than `top_k` cells.
    #[must_use]
    pub fn top_per_question(&self, top_k: usize) -> Vec<RankedCell> {
        let mut ranked = vec![];
        for row in self.rows() {
            let mut cells = Self::related(row).collect::<Vec<_>>();
            cells.sort_by(|a, b| {
                b.r2.total_cmp(&a.r2)
                    .then_with(|| a.ifp_id_y.cmp(&b.ifp_id_y))
            });
            let mut rank = 0;
            let mut last_r2 = None;
            for cell in cells {
                if last_r2 != Some(cell.r2) {
                    rank += 1;
                    last_r2 = Some(cell.r2);
                }
                if rank > top_k {
                    break;
                }
                ranked.push(RankedCell {
                    cell: cell.clone(),
                    rank,
                });
            }
        }
        ranked
    }
}

/// Pearson correlation of baseline p(a) for every ordered pair of `questions`.
///
/// Duplicate ids in `questions` are ignored. A coefficient is NaN when fewer
/// than two users answered both questions or either side is constant.
pub fn pairwise_correlation(
    baselines: &[BaselineProbability],
    questions: &[String],
) -> Result<CorrelationMatrix, InsufficientDataError> {
    let mut seen = BTreeSet::new();
    let questions = questions
        .iter()
        .filter(|q| seen.insert(q.as_str()))
        .cloned()
        .collect::<Vec<_>>();
    if questions.len() < 2 {
        return Err(InsufficientDataError::TooFewQuestions {
            found: questions.len(),
        });
    }

    let matrix = BaselineMatrix::pivot(baselines, &questions);
    if matrix.users().is_empty() {
        return Err(InsufficientDataError::NoObservations);
    }

    let mut cells = Vec::with_capacity(questions.len() * questions.len());
    for (x, ifp_id_x) in questions.iter().enumerate() {
        for (y, ifp_id_y) in questions.iter().enumerate() {
            let correlation = matrix.correlate(x, y);
            cells.push(CorrelationCell {
                ifp_id_x: ifp_id_x.clone(),
                ifp_id_y: ifp_id_y.clone(),
                corr: correlation.coefficient,
                n_users: correlation.n,
                r2: correlation.r_squared(),
            });
        }
    }
    tracing::debug!(
        questions = questions.len(),
        users = matrix.users().len(),
        "computed pairwise correlations"
    );
    Ok(CorrelationMatrix { questions, cells })
}

/// An unordered question pair, smaller id first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub ifp_id_x: String,
    pub ifp_id_y: String,
    pub corr: f64,
    pub n_users: usize,
    pub r2: f64,
}

/// One row per unordered pair of distinct questions, strongest `r2` first.
///
/// Pairs with an undefined coefficient are dropped.
#[must_use]
pub fn unique_pairs(matrix: &CorrelationMatrix) -> Vec<CorrelationPair> {
    let mut pairs = matrix
        .cells()
        .iter()
        .filter(|c| c.ifp_id_x < c.ifp_id_y && c.corr.is_finite())
        .map(|c| CorrelationPair {
            ifp_id_x: c.ifp_id_x.clone(),
            ifp_id_y: c.ifp_id_y.clone(),
            corr: c.corr,
            n_users: c.n_users,
            r2: c.r2,
        })
        .collect::<Vec<_>>();
    pairs.sort_by(|a, b| {
        b.r2.total_cmp(&a.r2)
            .then_with(|| (&a.ifp_id_x, &a.ifp_id_y).cmp(&(&b.ifp_id_x, &b.ifp_id_y)))
    });
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(ifp_id: &str, user_id: &str, p_a: f64) -> BaselineProbability {
        BaselineProbability {
            ifp_id: ifp_id.to_owned(),
            user_id: user_id.to_owned(),
            p_a,
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_owned()).collect()
    }

    /// q1 and q2 move together, q3 weakly against them.
    fn sample() -> Vec<BaselineProbability> {
        vec![
            p("q1", "u1", 0.1),
            p("q1", "u2", 0.4),
            p("q1", "u3", 0.6),
            p("q1", "u4", 0.9),
            p("q2", "u1", 0.2),
            p("q2", "u2", 0.3),
            p("q2", "u3", 0.7),
            p("q2", "u4", 0.8),
            p("q3", "u1", 0.6),
            p("q3", "u2", 0.5),
            p("q3", "u3", 0.7),
            p("q3", "u4", 0.3),
            p("flat", "u1", 0.5),
            p("flat", "u2", 0.5),
            p("flat", "u3", 0.5),
            p("solo", "u1", 0.3),
        ]
    }

    #[test]
    fn test_select_excludes_constant_and_sparse_questions() {
        let selected = select_candidate_questions(&sample(), &CandidateCriteria::default());
        assert_eq!(selected, ids(&["q1", "q2", "q3"]));

        let relaxed = CandidateCriteria {
            min_unique: 1,
            ..CandidateCriteria::default()
        };
        assert!(select_candidate_questions(&sample(), &relaxed).contains(&"flat".to_owned()));
    }

    #[test]
    fn test_select_sort_by_count_and_truncate() {
        let mut baselines = sample();
        baselines.push(p("q3", "u5", 0.4));
        let criteria = CandidateCriteria {
            sort_by: SortBy::Count,
            first_k: Some(2),
            ..CandidateCriteria::default()
        };
        assert_eq!(
            select_candidate_questions(&baselines, &criteria),
            ids(&["q3", "q1"])
        );
    }

    #[test]
    fn test_pivot() {
        let matrix = BaselineMatrix::pivot(&sample(), &ids(&["q3", "solo"]));
        assert_eq!(matrix.users(), ids(&["u1", "u2", "u3", "u4"]));
        assert_eq!(matrix.get(0, 1), Some(0.3));
        assert_eq!(matrix.get(1, 1), None);
        assert_eq!(matrix.get(3, 0), Some(0.3));
    }

    #[test]
    fn test_correlation_is_symmetric_with_unit_diagonal() {
        let questions = ids(&["q1", "q2", "q3"]);
        let matrix = pairwise_correlation(&sample(), &questions).unwrap();
        assert_eq!(matrix.cells().len(), 9);
        for x in 0..3 {
            assert!((matrix.get(x, x).corr - 1.0).abs() < 1e-12);
            for y in 0..3 {
                let (a, b) = (matrix.get(x, y), matrix.get(y, x));
                assert!((a.corr - b.corr).abs() < 1e-12);
                assert_eq!(a.n_users, b.n_users);
                assert!((a.r2 - a.corr * a.corr).abs() < 1e-12);
            }
        }
        assert!(matrix.get(0, 1).corr > 0.9);
        assert!(matrix.get(0, 2).corr < 0.0);
    }

    #[test]
    fn test_undefined_coefficient_is_nan() {
        let matrix = pairwise_correlation(&sample(), &ids(&["q1", "solo"])).unwrap();
        let cell = matrix.get(0, 1);
        assert_eq!(cell.n_users, 1);
        assert!(cell.corr.is_nan());
        assert!(unique_pairs(&matrix).is_empty());
    }

    #[test]
    fn test_too_few_questions() {
        let err = pairwise_correlation(&sample(), &ids(&["q1", "q1"])).unwrap_err();
        assert_eq!(err, InsufficientDataError::TooFewQuestions { found: 1 });
        let err = pairwise_correlation(&sample(), &ids(&["x", "y"])).unwrap_err();
        assert_eq!(err, InsufficientDataError::NoObservations);
    }

    #[test]
    fn test_unique_pairs_for_three_questions() {
        let matrix = pairwise_correlation(&sample(), &ids(&["q3", "q1", "q2"])).unwrap();
        let pairs = unique_pairs(&matrix);
        assert_eq!(pairs.len(), 3);
        for pair in &pairs {
            assert!(pair.ifp_id_x < pair.ifp_id_y);
        }
        for w in pairs.windows(2) {
            assert!(w[0].r2 >= w[1].r2);
        }
        assert_eq!(
            (pairs[0].ifp_id_x.as_str(), pairs[0].ifp_id_y.as_str()),
            ("q1", "q2")
        );
    }

    #[test]
    fn test_axis_order_and_top_per_question() {
        let matrix = pairwise_correlation(&sample(), &ids(&["q1", "q2", "q3"])).unwrap();
        let order = matrix.axis_order_by_r2();
        assert_eq!(order.len(), 3);
        assert_eq!(order[2], "q3");

        let top = matrix.top_per_question(1);
        assert_eq!(top.len(), 3);
        assert!(top.iter().all(|c| c.rank == 1));
        assert!(top.iter().all(|c| c.cell.ifp_id_x != c.cell.ifp_id_y));
        let q1_best = top.iter().find(|c| c.cell.ifp_id_x == "q1").unwrap();
        assert_eq!(q1_best.cell.ifp_id_y, "q2");
    }
}

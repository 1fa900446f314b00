/// A statistical operation has too little data to produce a meaningful result.
///
/// The caller has to pick different parameters (e.g. relax the candidate
/// criteria or load more years).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InsufficientDataError {
    #[display("correlation needs at least 2 questions, found {found}")]
    TooFewQuestions { found: usize },
    #[display("no user has a baseline on any of the selected questions")]
    NoObservations,
}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("percentage for {category} must be between 0 and 100, got {value}")]
    InvalidPercent { category: String, value: f64 },

    #[error("duplicate category id: {0}")]
    DuplicateCategory(String),

    #[error("unknown stage: {0}")]
    UnknownStage(String),

    #[error("benchmark for {category} at stage {stage} is not ordered (p25 <= p50 <= p75)")]
    MalformedBenchmark { stage: String, category: String },

    #[error("budget {0} is not one of the preset amounts")]
    InvalidBudget(f64),

    #[error("category catalog is empty")]
    EmptyCatalog,
}

pub type Result<T> = std::result::Result<T, Error>;

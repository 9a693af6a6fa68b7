use thiserror::Error;

pub type VizResult<T> = Result<T, VizError>;

/// Failures while obtaining, decoding or configuring a step sequence.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("server reported an error: {0}")]
    Server(String),

    #[error("could not decode step sequence: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("step sequence is empty")]
    EmptySequence,

    #[error("unknown visualizer '{0}'")]
    UnknownVisualizer(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Input(#[from] InputError),
}

/// User input rejected before any request is sent.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: i64 },

    #[error("{field} may have at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("add at least {min} {what}")]
    TooFew { what: &'static str, min: usize },

    #[error("matrix must be square, row {row} has {len} cells for {n} rows")]
    NotSquare { row: usize, len: usize, n: usize },

    #[error("matrix cell ({row}, {col}) is empty or not a number")]
    BadCell { row: usize, col: usize },

    #[error("matrix needs {expected} rows to follow the previous one, got {got}")]
    DimMismatch { expected: i64, got: i64 },

    #[error("only the last matrix can be removed")]
    NotLast,

    #[error("edge {u}-{v} already exists")]
    DuplicateEdge { u: String, v: String },

    #[error("key '{0}' may only contain the digits 0 and 1")]
    NotBinary(String),

    #[error("edge {u}-{v} needs a positive weight")]
    BadWeight { u: String, v: String },

    #[error("expected {expected} failure probabilities, got {got}")]
    QLength { expected: usize, got: usize },

    #[error("word '{word}' does not fit in a line of {width}")]
    WordTooLong { word: String, width: i64 },

    #[error("{field} must hold each of 0 to 8 exactly once")]
    NotAPermutation { field: &'static str },
}

impl VizError {
    /// Whether the error came from the user's input rather than the source.
    pub fn is_input(&self) -> bool {
        matches!(self, VizError::Input(_))
    }
}

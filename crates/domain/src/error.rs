/// Shared error type used across all pagecron crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Could not establish a table-store session. Fatal to the current
    /// workflow invocation; never retried.
    #[error("auth: {0}")]
    Auth(String),

    /// A table read or write failed. The operation is aborted and the
    /// table is left unchanged.
    #[error("table store unavailable: {0}")]
    StoreUnavailable(String),

    /// A row's text does not match the schedule grammar.
    #[error("unparseable schedule row: {0:?}")]
    Parse(String),

    /// A month name outside the fixed name table.
    #[error("unknown month name: {0:?}")]
    UnknownMonth(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error means "the row exists but cannot be interpreted".
    ///
    /// Such rows are skipped during listing and treated as absent when they
    /// are the row the current page needed.
    pub fn is_row_level(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::UnknownMonth(_))
    }
}

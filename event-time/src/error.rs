use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The text could not be read as a calendar date. Carries the input as
    /// the user typed it.
    #[error("\"{0}\" is not a valid date")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, Error>;

//! CLI error types.

use cart_store::StoreError;
use thiserror::Error;

/// Bad command line.
#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Wrong number of arguments for `{0}`")]
    WrongArity(String),

    #[error("Missing value for {0}")]
    MissingValue(&'static str),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),
}

/// Anything that stops a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] ArgsError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cart changed but was not saved: {0}")]
    NotSaved(String),

    #[error("Cart could not be rendered: {0}")]
    Render(String),
}

pub type CliResult<T> = Result<T, CliError>;

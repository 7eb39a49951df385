use std::fmt::Display;

use anyhow::{anyhow, Context, Result};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Cache location does not exist: {0}")]
    CacheLocationDoesNotExist(String),
    #[error("Cache location is not a directory: {0}")]
    CacheLocationIsNotADirectory(String),
    #[error("Cache location is not writeable: {0}")]
    CacheLocationIsNotWriteable(String),
    #[error("Corrupt cache record for key {key}: {reason}")]
    CorruptRecord { key: String, reason: String },
    #[error("Application error: {0}")]
    ApplicationError(String),
}

pub trait AddContext<T, E>: Context<T, E> {
    fn err_context<C: Display + Send + Sync + 'static>(self, msg: C) -> Result<T, anyhow::Error>
    where
        Self: Sized,
    {
        self.with_context(|| msg.to_string())
    }
}

impl<U, T, E> AddContext<T, E> for U where U: Context<T, E> {}

pub fn gen<T: AsRef<str>>(msg: T) -> anyhow::Error {
    anyhow!(msg.as_ref().to_string())
}

//! Crate-level error combining transport and content-shape failures

use thiserror::Error;

use crate::client::ClientError;
use crate::content::ContentError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Content(#[from] ContentError),
}

pub type Result<T> = std::result::Result<T, Error>;

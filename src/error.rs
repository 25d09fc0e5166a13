use reqwest::StatusCode;
use thiserror::Error;

use crate::github::OwnerKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid repository {0:?}, expected the form owner/name")]
    InvalidRepository(String),

    #[error("{0} does not exist or is not visible with the given token")]
    NotFound(String),

    #[error("GitHub returned status {status}: {body}")]
    Transport { status: StatusCode, body: String },

    #[error("The owner type `{kind}` of {subject} is unknown")]
    UnknownOwnerKind { subject: String, kind: OwnerKind },
}

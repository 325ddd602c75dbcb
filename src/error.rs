use std::{io, path::PathBuf};

use validator::ValidationErrors;

use crate::{source::Unresolvable, util::error_chain_fmt};

#[derive(thiserror::Error)]
pub enum Error {
    #[error("Failed to read configuration")]
    Config(#[from] figment::Error),

    #[error("Mapping entry `{key}` is invalid")]
    Validation {
        key: String,
        #[source]
        errors: ValidationErrors,
    },

    #[error("{0}")]
    Usage(String),

    #[error("Failed to open `{}`", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read zip archive")]
    Archive(#[source] zip::result::ZipError),

    #[error("Archive member `{member}` is malformed")]
    Member {
        member: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read archive member `{member}`")]
    ReadMember {
        member: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Failed to inflate gzip stream")]
    Inflate(#[source] io::Error),

    #[error("Failed to decode backup records")]
    Decode(#[from] prost::DecodeError),

    #[error(transparent)]
    Unresolvable(#[from] Unresolvable),

    #[error("Failed to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Config(_) | Error::Validation { .. } => 1,
            Error::Usage(_) => 2,
            Error::Open { .. }
            | Error::Archive(_)
            | Error::Member { .. }
            | Error::ReadMember { .. }
            | Error::Inflate(_)
            | Error::Decode(_) => 3,
            Error::Write { .. } => 4,
            Error::Unresolvable(_) => 5,
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Failure to bring a required artifact online. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("required artifact `{name}` was not found at `{path}`")]
    Missing { name: &'static str, path: PathBuf },
    #[error("could not read artifact `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse artifact `{path}`: {source}")]
    ParseJson { path: PathBuf, source: serde_json::Error },
    #[error("could not parse artifact `{path}`: {source}")]
    ParseCsv { path: PathBuf, source: csv::Error },
    #[error("artifact `{name}` is invalid: {message}")]
    Invalid { name: &'static str, message: String },
}

impl ArtifactError {
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid { name, message: message.into() }
    }
}

/// An identifier the artifacts know nothing about. Never surfaced to callers
/// of the public pipeline; it only explains why a list came back empty.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupMiss {
    #[error("unknown user `{0}`")]
    UnknownUser(String),
    #[error("unknown item `{0}`")]
    UnknownItem(String),
    #[error("item code {0} has no external id")]
    UnknownCode(u32),
    #[error("no metadata for item `{0}`")]
    NoMetadata(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("user index {user} is outside the model ({users} users)")]
    UserOutOfRange { user: usize, users: usize },
    #[error("user index {user} has no row in the interaction matrix")]
    MissingInteractionRow { user: usize },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error(transparent)]
    Lookup(#[from] LookupMiss),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl GeneratorError {
    /// Misses are expected traffic; anything else points at artifact quality.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, Self::Lookup(_))
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("artifacts unavailable: {0}")]
    Artifacts(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<ArtifactError> for ApplicationError {
    fn from(value: ArtifactError) -> Self {
        Self::Artifacts(value.to_string())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::InvalidRequest(message) => {
                Self::BadRequest { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Artifacts(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

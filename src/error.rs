use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadflowError {
    /// The request could not be sent, or the response could not be read.
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success HTTP status.
    #[error("HTTP {status} from {endpoint}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The backend answered 2xx but the envelope reported a failure code.
    #[error("API error {code} from {endpoint}: {message}")]
    Api {
        endpoint: String,
        code: i64,
        message: String,
    },

    #[error("invalid response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// A cached query failure shared by every reader of the key.
    #[error(transparent)]
    Query(Arc<LeadflowError>),

    #[error("invalid sort specification '{0}'")]
    InvalidSort(String),

    #[error("invalid date preset '{0}'")]
    InvalidDatePreset(String),

    #[error("invalid sort direction '{0}'")]
    InvalidSortDirection(String),

    #[error("invalid deal status '{0}' (expected open, won or lost)")]
    InvalidDealStatus(String),

    #[error("invalid id '{0}': ids must be non-empty and cannot be '.' or '..'")]
    InvalidPathSegment(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification used when reporting failures to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    HttpStatus,
    Api,
    Local,
}

impl LeadflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LeadflowError::Network { .. } => ErrorKind::Network,
            LeadflowError::HttpStatus { .. } => ErrorKind::HttpStatus,
            LeadflowError::Api { .. } | LeadflowError::Decode { .. } => ErrorKind::Api,
            LeadflowError::Query(inner) => inner.kind(),
            _ => ErrorKind::Local,
        }
    }

    /// HTTP status of the failed response, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            LeadflowError::HttpStatus { status, .. } => Some(*status),
            LeadflowError::Network { source, .. } => source.status().map(|s| s.as_u16()),
            LeadflowError::Query(inner) => inner.status(),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        self.kind() == ErrorKind::Network
    }
}

pub type Result<T> = std::result::Result<T, LeadflowError>;

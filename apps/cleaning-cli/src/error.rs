use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::model::Role;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer; `detail` comes from the problem document when there is one.
    #[error("{title} ({status}): {detail}")]
    Api {
        status: u16,
        title: String,
        detail: String,
    },

    #[error("invalid API URL '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("not logged in; run `cleaning-cli login --name <NAME> --role <ROLE>` first")]
    NotLoggedIn,

    #[error("`{command}` is only available to {role} users")]
    WrongRole { command: &'static str, role: Role },

    #[error("identity cache {}: {source}", path.display())]
    Identity {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("identity cache {} is unreadable: {source}", path.display())]
    CorruptIdentity {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Deserialize)]
struct ProblemBody {
    title: Option<String>,
    detail: Option<String>,
}

impl ClientError {
    /// Build an [`ClientError::Api`] from an error status and its raw body.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let reason = status.canonical_reason().unwrap_or("Error").to_string();
        match serde_json::from_str::<ProblemBody>(body) {
            Ok(p) => Self::Api {
                status: status.as_u16(),
                title: p.title.unwrap_or(reason),
                detail: p.detail.unwrap_or_default(),
            },
            Err(_) => Self::Api {
                status: status.as_u16(),
                title: reason,
                detail: body.trim().to_string(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

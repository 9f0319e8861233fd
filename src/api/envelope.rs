//! Typed response envelope returned by every backend endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{LeadflowError, Result};

/// Envelope code the backend uses for success.
pub const SUCCESS_CODE: i64 = 0;

/// `{ "code": 0, "message": "...", "data": ... }`
///
/// `code == SUCCESS_CODE` is the success discriminator; any other code is a
/// failure even when the HTTP status was 2xx.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Payload on success, `LeadflowError::Api` otherwise.
    pub fn into_data(self, endpoint: &str) -> Result<serde_json::Value> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(LeadflowError::Api {
                endpoint: endpoint.to_string(),
                code: self.code,
                message: self
                    .message
                    .unwrap_or_else(|| "request failed".to_string()),
            })
        }
    }

    /// Decode the payload on success.
    pub fn into_result<T: DeserializeOwned>(self, endpoint: &str) -> Result<T> {
        let data = self.into_data(endpoint)?;
        decode(endpoint, data)
    }
}

/// Deserialize a payload, attributing failures to `endpoint`.
fn decode<T: DeserializeOwned>(endpoint: &str, data: serde_json::Value) -> Result<T> {
    serde_json::from_value(data).map_err(|source| LeadflowError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// True when the backend reports more rows than this page carries.
    pub fn has_more(&self) -> bool {
        (self.content.len() as u64) < self.total_elements
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
        }
    }
}

//! One-time-password login.
//!
//! Requesting a code stores the challenge identifier in [`LocalStorage`] so a
//! later process can verify it. The identifier is cleared once verification
//! succeeds and kept on failure so the user can retry with another code.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::api::ApiCall;
use crate::error::{LeadflowError, Result};
use crate::storage::{LocalStorage, OTP_ID_KEY};

pub const OTP_REQUEST_PATH: &str = "auth/otp";
pub const OTP_VERIFY_PATH: &str = "auth/otp/verify";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpChallenge {
    pub otp_id: String,
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OtpRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OtpVerify<'a> {
    otp_id: &'a str,
    code: &'a str,
}

/// Ask the backend to send a code to `email` and remember the challenge.
pub async fn request_otp(
    api: &ApiCall,
    storage: &LocalStorage,
    email: &str,
) -> Result<OtpChallenge> {
    let challenge: OtpChallenge = api.post(OTP_REQUEST_PATH, &OtpRequest { email }).await?;
    storage.set_otp_id(&challenge.otp_id)?;
    tracing::debug!(scope = %api.scope(), "one-time password requested");
    Ok(challenge)
}

/// Exchange `code` for a session using the stored challenge.
pub async fn verify_otp(api: &ApiCall, storage: &LocalStorage, code: &str) -> Result<Session> {
    let otp_id = storage.otp_id().ok_or_else(|| {
        LeadflowError::Other(
            "no pending one-time password; run `leadflow login request` first".to_string(),
        )
    })?;

    let session: Session = api
        .post(
            OTP_VERIFY_PATH,
            &OtpVerify {
                otp_id: &otp_id,
                code: code.trim(),
            },
        )
        .await?;

    storage.remove(OTP_ID_KEY)?;
    Ok(session)
}

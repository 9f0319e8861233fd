//! One-time-password login.
//!
//! - `login request <email>`: asks the backend to send a code
//! - `login verify <code>`: exchanges the code for a token and saves it

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::api::ApiCall;
use crate::cli::OutputOptions;
use crate::context::AppContext;
use crate::crm::session;
use crate::error::Result;

pub async fn cmd_login_request(ctx: &AppContext, api: ApiCall, email: &str, json: bool) -> Result<()> {
    let challenge = session::request_otp(&api, &ctx.storage, email).await?;

    let mut text = format!("Sent a one-time password to {}", email.cyan());
    if let Some(expires) = challenge.expires_at {
        text.push_str(&format!(" (expires {})", expires.strftime("%H:%M UTC")));
    }
    text.push_str(&format!("\nRun {} to finish signing in.", "leadflow login verify <code>".bold()));

    CommandOutput::new(json!({
        "action": "otp_requested",
        "email": email,
        "expires_at": challenge.expires_at,
    }))
    .with_text(text)
    .print(OutputOptions { json })
}

pub async fn cmd_login_verify(ctx: &AppContext, api: ApiCall, code: &str, json: bool) -> Result<()> {
    let session = session::verify_otp(&api, &ctx.storage, code).await?;

    let mut config = ctx.config.clone();
    config.set_api_token(session.token.clone());
    let scope = api.scope();
    if config.default_scope.is_none() {
        config.set_default_scope(scope.org_id.clone(), scope.workspace_id.clone());
    }
    config.save()?;

    CommandOutput::new(json!({
        "action": "login",
        "org": scope.org_id,
        "workspace": scope.workspace_id,
        "expires_at": session.expires_at,
        "success": true,
    }))
    .with_text(format!("Signed in to {}", scope.to_string().cyan()))
    .print(OutputOptions { json })
}

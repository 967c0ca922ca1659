use anyhow::Result;
use reqwest::StatusCode;

use crate::api::ApiError;
use crate::context::ClientContext;

pub async fn login(ctx: &mut ClientContext, email: &str, password: &str) -> Result<()> {
    if let Some(previous) = ctx.session() {
        tracing::info!(email = %previous.user.email, "Replacing existing session");
    }
    let session = ctx.api.login(email, password).await?;
    let greeting = session
        .user
        .name
        .clone()
        .unwrap_or_else(|| session.user.email.clone());
    let role = session.user.role;

    ctx.set_session(session)?;
    tracing::info!(
        api = ctx.api.base_url(),
        session = %ctx.store.path().display(),
        "Logged in"
    );
    println!("Logged in as {greeting} ({role})");
    Ok(())
}

/// Always removes the local session, even when the server call fails.
pub async fn logout(ctx: &mut ClientContext) -> Result<()> {
    let Some(session) = ctx.clear_session()? else {
        println!("Not logged in");
        return Ok(());
    };

    match ctx.api.logout(&session.access_token).await {
        Ok(()) => {}
        Err(ApiError::Status { status, .. }) if status == StatusCode::UNAUTHORIZED => {
            tracing::debug!("Access token already expired");
        }
        Err(e) => tracing::warn!(error = %e, "Server-side logout failed"),
    }
    println!("Logged out");
    Ok(())
}

pub async fn whoami(ctx: &mut ClientContext) -> Result<()> {
    let me = ctx.api.me(ctx.access_token()?).await?;
    println!("{} ({}) {}", me.email, me.role, me.id);
    Ok(())
}

//! Linking provider accounts to users

use anyhow::{Context as _, Result};
use chrono::Utc;

use super::Context;
use crate::auth::{expires_at_after, Credential, CredentialStore, PROVIDER};

/// Store a credential handed over by the identity provider.
pub fn connect(
    ctx: &Context,
    user_id: &str,
    access_token: &str,
    refresh_token: Option<&str>,
    expires_in: Option<u64>,
) -> Result<()> {
    let credential = Credential {
        user_id: user_id.to_string(),
        provider: PROVIDER.to_string(),
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(String::from),
        expires_at: expires_in.map(|secs| expires_at_after(Utc::now().timestamp(), secs)),
    };
    ctx.store
        .put_credential(credential)
        .context("Failed to store credential")?;

    println!("Connected {} account for {}.", PROVIDER, user_id);
    Ok(())
}

pub fn disconnect(ctx: &Context, user_id: &str) -> Result<()> {
    let removed = ctx
        .store
        .remove_credential(user_id, PROVIDER)
        .context("Failed to remove credential")?;

    if removed {
        println!("Disconnected {}.", user_id);
    } else {
        println!("{} had no linked account.", user_id);
    }
    Ok(())
}

/// Print whether the user has a usable token, refreshing an expired one.
pub async fn token_status(ctx: &Context, user_id: &str) -> Result<()> {
    let stored = ctx
        .store
        .get_credential(user_id, PROVIDER)
        .context("Failed to read credential")?;

    match ctx.refresher.ensure_valid_access_token(user_id).await {
        Some(_) => {
            println!("Access token: valid");
            let current = ctx.store.get_credential(user_id, PROVIDER)?;
            if current != stored {
                println!("  (refreshed)");
            }
            if let Some(exp) = current.and_then(|c| c.expires_at) {
                println!("  expires_at: {}", exp);
            }
        }
        None if stored.is_some() => {
            println!("Access token: expired and could not be refreshed");
            println!("\nReconnect the account for {}.", user_id);
        }
        None => {
            println!("Access token: none");
            println!("\nRun 'playlist-hub connect --user {}' first.", user_id);
        }
    }

    Ok(())
}

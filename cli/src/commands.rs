//! Subcommand dispatch.

use anyhow::{Context, Result};
use influitive_core::{ApiError, ClientConfig, Influitive};
use serde::Serialize;
use tracing::info;

use crate::cli::Commands;

pub fn run(config: ClientConfig, command: Commands) -> Result<()> {
    let api = Influitive::new(config);

    match command {
        Commands::Members { field, value } => {
            let members = match (field, value) {
                (Some(field), Some(value)) => api.query_members_by_field(&field, &value),
                _ => api.get_all_members(),
            }
            .map_err(with_body)?;
            info!(count = members.len(), "fetched members");
            print_json(&members)
        }
        Commands::Me => print_json(&api.get_me().map_err(with_body)?),
        Commands::Create { email, name, source } => {
            let member = api
                .create_member_by_email(&email, &name, source.as_deref())
                .map_err(with_body)?;
            print_json(&member)
        }
        Commands::Invite { member_id, send_email } => {
            print_json(&api.invite_member(member_id, send_email).map_err(with_body)?)
        }
        Commands::LogEvent {
            event_type,
            member_id,
            points,
        } => print_json(&api.log_event(&event_type, member_id, points).map_err(with_body)?),
        Commands::LogCustomEvent {
            event_type,
            member_id,
            points,
            challenge_code,
        } => {
            let logged = match challenge_code {
                Some(code) => api.log_custom_challenge_event(&event_type, &code, member_id, points),
                None => api.log_custom_event(&event_type, member_id, points),
            }
            .map_err(with_body)?;
            print_json(&logged)
        }
    }
}

/// Surface the server's response body for status errors; the library only
/// keeps it on the error value.
fn with_body(err: ApiError) -> anyhow::Error {
    let body = match &err {
        ApiError::Status { body, .. } if !body.is_empty() => Some(body.clone()),
        _ => None,
    };
    match body {
        Some(body) => anyhow::Error::new(err).context(format!("response body: {body}")),
        None => anyhow::Error::new(err),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to render result")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_mention_body() {
        let err = with_body(ApiError::Status {
            operation: "get current member",
            status: 401,
            body: "bad token".to_string(),
        });
        let rendered = format!("{err:#}");
        assert!(rendered.contains("bad token"));
        assert!(rendered.contains("HTTP 401"));
    }

    #[test]
    fn empty_body_adds_no_context() {
        let err = with_body(ApiError::Status {
            operation: "get current member",
            status: 500,
            body: String::new(),
        });
        assert_eq!(err.to_string(), "get current member: influitive returned HTTP 500");
    }
}

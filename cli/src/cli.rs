//! CLI argument definitions.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use influitive_core::{ClientConfig, DEFAULT_BASE_URL};

/// Command-line access to an Influitive advocate hub.
#[derive(Parser, Debug)]
#[command(name = "influitive")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// API token
    #[arg(long, env = "INFLUITIVE_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Organization id sent as X_ORG_ID
    #[arg(long, env = "INFLUITIVE_ORG_ID", global = true)]
    pub org_id: Option<String>,

    /// API root
    #[arg(long, env = "INFLUITIVE_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Per-request timeout in seconds; 0 waits forever
    #[arg(long, env = "INFLUITIVE_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// Do not send q[status]=all with filtered listings
    #[arg(long, global = true)]
    pub no_status_scope: bool,
}

impl ConnectionArgs {
    pub fn to_config(&self) -> anyhow::Result<ClientConfig> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no API token; pass --token or set INFLUITIVE_TOKEN"))?;
        let org_id = self
            .org_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no organization id; pass --org-id or set INFLUITIVE_ORG_ID"))?;

        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        let config = ClientConfig::new(token, org_id, &self.base_url).with_timeout(timeout);
        Ok(if self.no_status_scope {
            config.without_status_scope()
        } else {
            config
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List members, optionally where FIELD equals VALUE
    Members {
        #[arg(long, requires = "value")]
        field: Option<String>,
        #[arg(long, requires = "field")]
        value: Option<String>,
    },

    /// Show the member record of the token owner
    Me,

    /// Create a nominee identified by email
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        source: Option<String>,
    },

    /// Invite a member to the hub
    Invite {
        member_id: i64,
        /// Let the hub send the invitation email
        #[arg(long)]
        send_email: bool,
    },

    /// Log a reference event (e.g. referral_submitted)
    LogEvent {
        #[arg(long = "type")]
        event_type: String,
        #[arg(long)]
        member_id: i64,
        #[arg(long)]
        points: i64,
    },

    /// Log a custom event, optionally against a challenge stage
    LogCustomEvent {
        #[arg(long = "type")]
        event_type: String,
        #[arg(long)]
        member_id: i64,
        #[arg(long)]
        points: i64,
        #[arg(long)]
        challenge_code: Option<String>,
    },
}

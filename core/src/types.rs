//! Domain DTOs for the Influitive API.
//!
//! # Design
//! `Member` is the one canonical record schema for contacts and members,
//! tagged by `MEMBER_SCHEMA_VERSION`. The API omits or nulls fields freely,
//! so every field has a default and `null` decodes to that default. Request
//! payloads are separate types that only carry what each endpoint reads.
//! The mock-server crate defines its own DTOs; integration tests catch drift.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Revision of the `Member` schema these bindings decode.
pub const MEMBER_SCHEMA_VERSION: u32 = 1;

/// Event type for a submitted referral.
pub const EVENT_REFERRAL_SUBMITTED: &str = "referral_submitted";

/// Member type assigned to members created by email.
pub const MEMBER_TYPE_NOMINEE: &str = "Nominee";

/// A member (contact) of an advocate hub.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Member {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub uuid: Option<String>,
    #[serde(rename = "type")]
    pub member_type: Option<String>,
    pub created_at: Option<String>,
    pub joined_at: Option<String>,
    pub locked_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub external_ids: BTreeMap<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub match_categories: BTreeMap<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub custom_fields: BTreeMap<String, Value>,
    pub nps_score: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub current_points: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub lifetime_points: i64,
    pub crm_contact_id: Option<String>,
    pub salesforce_id: Option<String>,
    pub invite_link: Option<String>,
    pub language: Option<String>,
    pub address: Option<Value>,
    pub level: Option<Level>,
    pub source: Option<String>,
    pub thumb: Option<String>,
}

/// Advocate level a member has reached.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Level {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    pub name: Option<String>,
}

/// One page of `GET /contacts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactsPage {
    #[serde(rename = "contacts")]
    pub members: Vec<Member>,
    #[serde(default)]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Links {
    #[serde(rename = "self")]
    pub current: Option<String>,
    pub next: Option<String>,
}

impl Links {
    /// The continuation link, or `None` on the last page.
    pub fn next_link(&self) -> Option<&str> {
        self.next.as_deref().filter(|link| !link.is_empty())
    }
}

/// Narrows a contact listing to members whose `field` equals `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    pub field: String,
    pub value: String,
}

impl QueryFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// An empty field name filters nothing.
    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }
}

/// Request payload for `POST /members`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salesforce_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_criteria: BTreeMap<String, String>,
    #[serde(rename = "type")]
    pub member_type: String,
}

impl CreateMember {
    /// A nominee identified by email, the way the hub expects new members.
    pub fn by_email(email: impl Into<String>, name: impl Into<String>, source: Option<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            source,
            title: None,
            company: None,
            salesforce_id: None,
            match_criteria: BTreeMap::new(),
            member_type: MEMBER_TYPE_NOMINEE.to_string(),
        }
    }
}

/// Request payload for `POST /members/{id}/invitations`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvitationRequest {
    pub deliver_emails: bool,
}

/// Response of `POST /members/{id}/invitations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Invitation {
    pub status: Option<String>,
    pub invite_link: Option<String>,
}

/// Member reference inside a reference event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberRef {
    pub id: i64,
}

/// Request payload for `POST /references/events`.
///
/// Points travel as a string on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub member: MemberRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub points: String,
}

impl LogEvent {
    pub fn new(event_type: impl Into<String>, member_id: i64, points: i64) -> Self {
        Self {
            event_type: event_type.into(),
            member: MemberRef { id: member_id },
            notes: None,
            link: None,
            points: points.to_string(),
        }
    }
}

/// Contact reference inside a custom event. The id is a string on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Challenge stage a custom event completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    pub code: String,
}

/// Request payload for `POST /events`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogCustomEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub points: String,
    pub contact: ContactRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

impl LogCustomEvent {
    pub fn new(event_type: impl Into<String>, member_id: i64, points: i64) -> Self {
        Self {
            event_type: event_type.into(),
            points: points.to_string(),
            contact: ContactRef {
                id: member_id.to_string(),
                email: None,
            },
            stage: None,
        }
    }

    /// Attribute the event to a challenge stage. An empty code is ignored.
    pub fn with_challenge(mut self, challenge_code: impl Into<String>) -> Self {
        let code = challenge_code.into();
        self.stage = if code.is_empty() { None } else { Some(Stage { code }) };
        self
    }
}

/// Response of both event endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EventLogged {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    pub event_type_code: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub points: i64,
    #[serde(rename = "contact")]
    pub member: Option<Member>,
    pub parameters: Value,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

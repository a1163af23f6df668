//! Stateless HTTP request builder and response parser for the Influitive API.
//!
//! # Design
//! `InfluitiveClient` holds only an immutable `ClientConfig`. Each endpoint is
//! split into a `build_*` method that produces an `HttpRequest` and a
//! `parse_*` method that consumes an `HttpResponse`. The caller, or the
//! paginator and facade in this crate, executes the round-trip in between.

use serde::de::DeserializeOwned;
use url::{form_urlencoded, Url};

use crate::config::ClientConfig;
use crate::error::{ApiError, ContinuationError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    ContactsPage, CreateMember, EventLogged, Invitation, InvitationRequest, LogCustomEvent, LogEvent, Member,
    QueryFilter,
};

pub(crate) const OP_LIST_CONTACTS: &str = "list contacts";
pub(crate) const OP_GET_ME: &str = "get current member";
pub(crate) const OP_CREATE_MEMBER: &str = "create member";
pub(crate) const OP_INVITE_MEMBER: &str = "invite member";
pub(crate) const OP_LOG_EVENT: &str = "log reference event";
pub(crate) const OP_LOG_CUSTOM_EVENT: &str = "log custom event";

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;

/// Synchronous, stateless client for the Influitive API.
#[derive(Debug, Clone)]
pub struct InfluitiveClient {
    config: ClientConfig,
}

impl InfluitiveClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// First page of `GET /contacts`.
    ///
    /// A filter with a non-empty field adds the configured status scope (if
    /// any) followed by `q[<field>]=<value>`, form-encoded. Without one the
    /// URL carries no query string at all.
    pub fn build_list_contacts(&self, filter: Option<&QueryFilter>) -> HttpRequest {
        let mut url = format!("{}/contacts", self.config.base_url());
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            let mut query = form_urlencoded::Serializer::new(String::new());
            if let Some(scope) = self.config.status_scope() {
                query.append_pair("q[status]", scope);
            }
            query.append_pair(&format!("q[{}]", filter.field), &filter.value);
            url.push('?');
            url.push_str(&query.finish());
        }
        self.request(HttpMethod::Get, url, None)
    }

    /// Follow-up page request for a server-supplied continuation link.
    ///
    /// The link must be an absolute http(s) URL. It is requested as given; the
    /// first request's filter is expected to be encoded in it already.
    pub fn build_next_page(&self, link: &str) -> Result<HttpRequest, ApiError> {
        let malformed = |source: ContinuationError| ApiError::MalformedContinuation {
            operation: OP_LIST_CONTACTS,
            link: link.to_string(),
            source,
        };
        let parsed = Url::parse(link).map_err(|e| malformed(e.into()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(malformed(ContinuationError::UnsupportedScheme(parsed.scheme().to_string())));
        }
        Ok(self.request(HttpMethod::Get, parsed.into(), None))
    }

    pub fn build_get_me(&self) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}/members/me", self.config.base_url()), None)
    }

    pub fn build_create_member(&self, input: &CreateMember) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)?;
        Ok(self.request(HttpMethod::Post, format!("{}/members", self.config.base_url()), Some(body)))
    }

    pub fn build_invite_member(&self, member_id: i64, deliver_emails: bool) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&InvitationRequest { deliver_emails })?;
        Ok(self.request(
            HttpMethod::Post,
            format!("{}/members/{member_id}/invitations", self.config.base_url()),
            Some(body),
        ))
    }

    pub fn build_log_event(&self, input: &LogEvent) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)?;
        Ok(self.request(
            HttpMethod::Post,
            format!("{}/references/events", self.config.base_url()),
            Some(body),
        ))
    }

    pub fn build_log_custom_event(&self, input: &LogCustomEvent) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)?;
        Ok(self.request(HttpMethod::Post, format!("{}/events", self.config.base_url()), Some(body)))
    }

    pub fn parse_contacts_page(&self, response: HttpResponse) -> Result<ContactsPage, ApiError> {
        decode(OP_LIST_CONTACTS, response, STATUS_OK)
    }

    pub fn parse_get_me(&self, response: HttpResponse) -> Result<Member, ApiError> {
        decode(OP_GET_ME, response, STATUS_OK)
    }

    pub fn parse_create_member(&self, response: HttpResponse) -> Result<Member, ApiError> {
        decode(OP_CREATE_MEMBER, response, STATUS_CREATED)
    }

    pub fn parse_invite_member(&self, response: HttpResponse) -> Result<Invitation, ApiError> {
        decode(OP_INVITE_MEMBER, response, STATUS_CREATED)
    }

    pub fn parse_log_event(&self, response: HttpResponse) -> Result<EventLogged, ApiError> {
        decode(OP_LOG_EVENT, response, STATUS_CREATED)
    }

    pub fn parse_log_custom_event(&self, response: HttpResponse) -> Result<EventLogged, ApiError> {
        decode(OP_LOG_CUSTOM_EVENT, response, STATUS_CREATED)
    }

    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![
            ("authorization".to_string(), format!("Token {}", self.config.token())),
            ("x_org_id".to_string(), self.config.org_id().to_string()),
            ("accept".to_string(), "application/json".to_string()),
        ];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }
}

/// Check the status, then deserialize the body.
fn decode<T: DeserializeOwned>(operation: &'static str, response: HttpResponse, expected: u16) -> Result<T, ApiError> {
    if response.status != expected {
        return Err(ApiError::Status {
            operation,
            status: response.status,
            body: response.body,
        });
    }
    serde_json::from_str(&response.body).map_err(|source| ApiError::Decode { operation, source })
}

//! High-level facade pairing an `InfluitiveClient` with a `Transport`.

use tracing::{debug, warn};

use crate::client::{
    InfluitiveClient, OP_CREATE_MEMBER, OP_GET_ME, OP_INVITE_MEMBER, OP_LOG_CUSTOM_EVENT, OP_LOG_EVENT,
};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::pagination;
use crate::transport::UreqTransport;
use crate::types::{CreateMember, EventLogged, Invitation, LogCustomEvent, LogEvent, Member, QueryFilter};

/// One-call-per-operation access to the API.
///
/// Every method issues its request(s) on the calling thread and blocks until
/// done. Nothing is cached between calls.
pub struct Influitive<T: Transport = UreqTransport> {
    client: InfluitiveClient,
    transport: T,
}

impl Influitive<UreqTransport> {
    /// Facade over a ureq transport using the config's timeout.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Influitive<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            client: InfluitiveClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &InfluitiveClient {
        &self.client
    }

    /// Members whose `field` equals `value`. An empty `field` lists everyone.
    pub fn query_members_by_field(&self, field: &str, value: &str) -> Result<Vec<Member>, ApiError> {
        let filter = QueryFilter::new(field, value);
        pagination::fetch_all(&self.client, &self.transport, Some(&filter))
    }

    pub fn get_all_members(&self) -> Result<Vec<Member>, ApiError> {
        pagination::fetch_all(&self.client, &self.transport, None)
    }

    /// The member record of the token's owner.
    pub fn get_me(&self) -> Result<Member, ApiError> {
        let response = self.send(OP_GET_ME, self.client.build_get_me())?;
        self.client.parse_get_me(response)
    }

    /// Create a nominee identified by email.
    pub fn create_member_by_email(&self, email: &str, name: &str, source: Option<&str>) -> Result<Member, ApiError> {
        let input = CreateMember::by_email(email, name, source.map(str::to_string));
        self.create_member(&input)
    }

    pub fn create_member(&self, input: &CreateMember) -> Result<Member, ApiError> {
        let request = self.client.build_create_member(input)?;
        let response = self.send(OP_CREATE_MEMBER, request)?;
        self.client.parse_create_member(response)
    }

    pub fn invite_member(&self, member_id: i64, send_email: bool) -> Result<Invitation, ApiError> {
        let request = self.client.build_invite_member(member_id, send_email)?;
        let response = self.send(OP_INVITE_MEMBER, request)?;
        self.client.parse_invite_member(response)
    }

    /// Record a reference event such as a submitted referral.
    pub fn log_event(&self, event_type: &str, member_id: i64, points: i64) -> Result<EventLogged, ApiError> {
        let request = self.client.build_log_event(&LogEvent::new(event_type, member_id, points))?;
        let response = self.send(OP_LOG_EVENT, request)?;
        self.client.parse_log_event(response)
    }

    pub fn log_custom_event(&self, event_type: &str, member_id: i64, points: i64) -> Result<EventLogged, ApiError> {
        self.send_custom_event(LogCustomEvent::new(event_type, member_id, points))
    }

    /// Custom event credited against a challenge stage.
    pub fn log_custom_challenge_event(
        &self,
        event_type: &str,
        challenge_code: &str,
        member_id: i64,
        points: i64,
    ) -> Result<EventLogged, ApiError> {
        self.send_custom_event(LogCustomEvent::new(event_type, member_id, points).with_challenge(challenge_code))
    }

    fn send_custom_event(&self, input: LogCustomEvent) -> Result<EventLogged, ApiError> {
        let request = self.client.build_log_custom_event(&input)?;
        let response = self.send(OP_LOG_CUSTOM_EVENT, request)?;
        self.client.parse_log_custom_event(response)
    }

    fn send(&self, operation: &'static str, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(operation, method = request.method.as_str(), url = %request.url, "calling influitive");
        self.transport.execute(&request).map_err(|source| {
            warn!(operation, error = %source, "request failed before a response arrived");
            ApiError::Transport { operation, source }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpMethod;

    /// Answers every request with the same response.
    struct Fixed {
        status: u16,
        body: &'static str,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Fixed {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                seen: RefCell::new(Vec::new()),
            }
        }

        fn last(&self) -> HttpRequest {
            self.seen.borrow().last().cloned().unwrap()
        }
    }

    impl Transport for Fixed {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.to_string(),
            })
        }
    }

    struct Unreachable;

    impl Transport for Unreachable {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::new("connection refused"))
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new("tok", "42", "https://host")
    }

    #[test]
    fn query_members_by_field_filters_first_request() {
        let api = Influitive::with_transport(config(), Fixed::new(200, r#"{"contacts":[{"id":3}]}"#));
        let members = api.query_members_by_field("email", "x@y.z").unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(
            api.transport.last().url,
            "https://host/contacts?q%5Bstatus%5D=all&q%5Bemail%5D=x%40y.z"
        );
    }

    #[test]
    fn get_all_members_sends_no_query() {
        let api = Influitive::with_transport(config(), Fixed::new(200, r#"{"contacts":[]}"#));
        assert!(api.get_all_members().unwrap().is_empty());
        assert_eq!(api.transport.last().url, "https://host/contacts");
    }

    #[test]
    fn challenge_event_carries_stage() {
        let api = Influitive::with_transport(
            config(),
            Fixed::new(201, r#"{"id":1,"event_type_code":"quiz","points":5,"contact":{"id":9}}"#),
        );
        let logged = api.log_custom_challenge_event("quiz", "stage-1", 9, 5).unwrap();
        assert_eq!(logged.points, 5);

        let sent = api.transport.last();
        assert_eq!(sent.method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["stage"]["code"], "stage-1");
        assert_eq!(body["contact"]["id"], "9");
    }

    #[test]
    fn one_shot_calls_check_their_status() {
        let api = Influitive::with_transport(config(), Fixed::new(200, r#"{"status":"invited"}"#));
        let err = api.invite_member(9, false).unwrap_err();
        assert_eq!(err.status(), Some(200));
        assert_eq!(err.operation(), Some(OP_INVITE_MEMBER));
    }

    #[test]
    fn transport_errors_name_the_operation() {
        let api = Influitive::with_transport(config(), Unreachable);
        let err = api.get_me().unwrap_err();
        assert!(matches!(err, ApiError::Transport { operation: OP_GET_ME, .. }));
        assert!(err.to_string().contains("connection refused"));
    }
}

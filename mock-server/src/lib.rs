use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_TOKEN: &str = "test-token";
pub const DEFAULT_ORG_ID: &str = "1";
pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Level {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub title: Option<String>,
    pub company: Option<String>,
    #[serde(rename = "type")]
    pub member_type: String,
    pub source: Option<String>,
    pub current_points: i64,
    pub lifetime_points: i64,
    pub invite_link: Option<String>,
    pub locked_at: Option<String>,
    pub level: Level,
    pub custom_fields: HashMap<String, Value>,
}

impl Member {
    /// An advocate with no points, split into first/last name on whitespace.
    pub fn new(id: i64, name: &str, email: &str) -> Self {
        let mut parts = name.splitn(2, ' ');
        Self {
            id,
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            first_name: parts.next().map(str::to_string),
            last_name: parts.next().map(str::to_string),
            email: email.to_string(),
            title: None,
            company: None,
            member_type: "Advocate".to_string(),
            source: None,
            current_points: 0,
            lifetime_points: 0,
            invite_link: None,
            locked_at: None,
            level: Level {
                id: 1,
                name: "Insider".to_string(),
            },
            custom_fields: HashMap::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub current: String,
    pub next: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactsPage {
    pub contacts: Vec<Member>,
    pub links: Links,
}

#[derive(Deserialize)]
pub struct CreateMember {
    pub email: String,
    pub name: String,
    pub source: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    #[serde(rename = "type")]
    pub member_type: Option<String>,
}

#[derive(Deserialize)]
pub struct InvitationRequest {
    #[serde(default)]
    pub deliver_emails: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invitation {
    pub status: String,
    pub invite_link: String,
}

#[derive(Deserialize)]
pub struct MemberRef {
    pub id: i64,
}

#[derive(Deserialize)]
pub struct ReferenceEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub member: MemberRef,
    pub notes: Option<String>,
    pub link: Option<String>,
    pub points: String,
}

#[derive(Deserialize)]
pub struct ContactRef {
    pub id: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct Stage {
    pub code: String,
}

#[derive(Deserialize)]
pub struct CustomEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub points: String,
    pub contact: ContactRef,
    pub stage: Option<Stage>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventLogged {
    pub id: i64,
    pub event_type_code: String,
    pub points: i64,
    pub contact: Member,
    pub parameters: Value,
}

/// Server behaviour knobs. `members` seeds the store in order; the first one
/// is what `/members/me` returns.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub token: String,
    pub org_id: String,
    pub page_size: usize,
    pub members: Vec<Member>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN.to_string(),
            org_id: DEFAULT_ORG_ID.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            members: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct Store {
    pub members: Vec<Member>,
    pub events: Vec<EventLogged>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    token: Arc<str>,
    org_id: Arc<str>,
    page_size: usize,
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store {
            members: config.members,
            events: Vec::new(),
        })),
        token: config.token.into(),
        org_id: config.org_id.into(),
        page_size: config.page_size.max(1),
    };
    Router::new()
        .route("/contacts", get(list_contacts))
        .route("/members", post(create_member))
        .route("/members/me", get(get_me))
        .route("/members/{id}/invitations", post(invite_member))
        .route("/references/events", post(log_reference_event))
        .route("/events", post(log_custom_event))
        .with_state(state)
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let token = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let org_id = headers.get("x_org_id").and_then(|v| v.to_str().ok());
    let expected = format!("Token {}", state.token);
    if token != Some(expected.as_str()) || org_id != Some(&*state.org_id) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(())
}

fn origin(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

/// Compare a member attribute against a query value the way the hub does:
/// strings verbatim, everything else by its JSON text.
fn field_matches(member: &Value, field: &str, value: &str) -> bool {
    match member.get(field) {
        Some(Value::String(s)) => s == value,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == value,
    }
}

fn page_url(base: &str, carried: &[(String, String)], page: usize) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(carried.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .append_pair("page", &page.to_string())
        .finish();
    format!("{base}?{query}")
}

async fn list_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ContactsPage>, StatusCode> {
    authorize(&state, &headers)?;

    let mut page = 1usize;
    let mut filters = Vec::new();
    for (key, value) in &params {
        if key == "page" {
            page = value.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
            if page == 0 {
                return Err(StatusCode::BAD_REQUEST);
            }
        } else if let Some(field) = key.strip_prefix("q[").and_then(|k| k.strip_suffix(']')) {
            if field != "status" {
                filters.push((field.to_string(), value.clone()));
            }
        }
    }

    let store = state.db.read().await;
    let matching: Vec<&Member> = store
        .members
        .iter()
        .filter(|m| {
            let json = serde_json::to_value(m).unwrap_or(Value::Null);
            filters.iter().all(|(f, v)| field_matches(&json, f, v))
        })
        .collect();

    let start = (page - 1).saturating_mul(state.page_size);
    let contacts: Vec<Member> = matching
        .iter()
        .skip(start)
        .take(state.page_size)
        .map(|m| (*m).clone())
        .collect();
    let has_more = start.saturating_add(state.page_size) < matching.len();

    let base = format!("{}/contacts", origin(&headers));
    let carried: Vec<(String, String)> = params.into_iter().filter(|(k, _)| k != "page").collect();
    let links = Links {
        current: page_url(&base, &carried, page),
        next: has_more.then(|| page_url(&base, &carried, page + 1)),
    };
    Ok(Json(ContactsPage { contacts, links }))
}

async fn get_me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Member>, StatusCode> {
    authorize(&state, &headers)?;
    let store = state.db.read().await;
    store.members.first().cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn create_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateMember>,
) -> Result<(StatusCode, Json<Member>), StatusCode> {
    authorize(&state, &headers)?;
    let mut store = state.db.write().await;
    if input.email.is_empty() || store.members.iter().any(|m| m.email == input.email) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let id = store.members.iter().map(|m| m.id).max().unwrap_or(0) + 1;
    let mut member = Member::new(id, &input.name, &input.email);
    member.source = input.source;
    member.title = input.title;
    member.company = input.company;
    member.member_type = input.member_type.unwrap_or_else(|| "Nominee".to_string());
    store.members.push(member.clone());
    Ok((StatusCode::CREATED, Json(member)))
}

async fn invite_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<InvitationRequest>,
) -> Result<(StatusCode, Json<Invitation>), StatusCode> {
    authorize(&state, &headers)?;
    let mut store = state.db.write().await;
    let member = store
        .members
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let link = format!("{}/join/{}", origin(&headers), Uuid::new_v4());
    member.invite_link = Some(link.clone());
    let status = if input.deliver_emails { "invited" } else { "link_generated" };
    Ok((
        StatusCode::CREATED,
        Json(Invitation {
            status: status.to_string(),
            invite_link: link,
        }),
    ))
}

async fn log_reference_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ReferenceEvent>,
) -> Result<(StatusCode, Json<EventLogged>), StatusCode> {
    authorize(&state, &headers)?;
    let mut parameters = serde_json::Map::new();
    if let Some(notes) = input.notes {
        parameters.insert("notes".to_string(), Value::String(notes));
    }
    if let Some(link) = input.link {
        parameters.insert("link".to_string(), Value::String(link));
    }
    let member_id = input.member.id;
    award(&state, input.event_type, &input.points, Value::Object(parameters), |m| {
        m.id == member_id
    })
    .await
}

async fn log_custom_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CustomEvent>,
) -> Result<(StatusCode, Json<EventLogged>), StatusCode> {
    authorize(&state, &headers)?;
    let id = match input.contact.id.as_deref().filter(|id| !id.is_empty()) {
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?),
        None => None,
    };
    let email = input.contact.email;
    if id.is_none() && email.is_none() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let parameters = match input.stage {
        Some(stage) => json!({ "stage": stage.code }),
        None => json!({}),
    };
    award(&state, input.event_type, &input.points, parameters, |m| {
        Some(m.id) == id || email.as_deref() == Some(m.email.as_str())
    })
    .await
}

/// Credit `points` to the first member `pick` selects and record the event.
async fn award(
    state: &AppState,
    event_type: String,
    points: &str,
    parameters: Value,
    pick: impl Fn(&Member) -> bool,
) -> Result<(StatusCode, Json<EventLogged>), StatusCode> {
    let points: i64 = points.parse().map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    let mut store = state.db.write().await;
    let member = store.members.iter_mut().find(|m| pick(m)).ok_or(StatusCode::NOT_FOUND)?;
    member.current_points += points;
    member.lifetime_points += points;
    let contact = member.clone();

    let event = EventLogged {
        id: store.events.len() as i64 + 1,
        event_type_code: event_type,
        points,
        contact,
        parameters,
    };
    store.events.push(event.clone());
    Ok((StatusCode::CREATED, Json(event)))
}

//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every facade
//! operation over real HTTP through `UreqTransport`. Validates that request
//! building, pagination and response parsing agree with an actual server.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use influitive_core::{ApiError, ClientConfig, Influitive, EVENT_REFERRAL_SUBMITTED};
use mock_server::{Member, MockConfig, DEFAULT_ORG_ID, DEFAULT_TOKEN};

/// Serve `config` on an ephemeral port from a background thread.
fn start_server(config: MockConfig) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, config).await
        })
        .unwrap();
    });

    addr
}

fn seeded(page_size: usize, count: i64) -> MockConfig {
    MockConfig {
        page_size,
        members: (1..=count)
            .map(|id| Member::new(id, &format!("Member {id}"), &format!("m{id}@example.com")))
            .collect(),
        ..MockConfig::default()
    }
}

fn api(addr: SocketAddr) -> Influitive {
    let config = ClientConfig::new(DEFAULT_TOKEN, DEFAULT_ORG_ID, &format!("http://{addr}"))
        .with_timeout(Some(Duration::from_secs(5)));
    Influitive::new(config)
}

#[test]
fn get_all_members_walks_every_page() {
    let addr = start_server(seeded(2, 7));

    let members = api(addr).get_all_members().unwrap();

    let ids: Vec<i64> = members.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(members[0].email.as_deref(), Some("m1@example.com"));
    assert_eq!(members[0].level.as_ref().and_then(|l| l.name.as_deref()), Some("Insider"));
}

#[test]
fn query_members_by_field_narrows_listing() {
    let addr = start_server(seeded(1, 4));

    let members = api(addr).query_members_by_field("email", "m3@example.com").unwrap();

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, 3);
}

#[test]
fn query_with_no_match_is_empty() {
    let addr = start_server(seeded(2, 3));
    let members = api(addr).query_members_by_field("email", "nobody@example.com").unwrap();
    assert!(members.is_empty());
}

#[test]
fn bad_credentials_are_a_status_error() {
    let addr = start_server(seeded(2, 3));
    let config = ClientConfig::new("wrong", DEFAULT_ORG_ID, &format!("http://{addr}"));

    let err = Influitive::new(config).get_all_members().unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 401, .. }));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

    let err = api(addr).get_me().unwrap_err();

    assert!(matches!(err, ApiError::Transport { .. }));
}

#[test]
fn silent_server_times_out() {
    // Accepts connections and never writes a byte.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            held.push(stream);
        }
    });

    let config = ClientConfig::new(DEFAULT_TOKEN, DEFAULT_ORG_ID, &format!("http://{addr}"))
        .with_timeout(Some(Duration::from_millis(300)));
    let started = Instant::now();

    let err = Influitive::new(config).get_all_members().unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    match err {
        ApiError::Transport { operation, source } => {
            assert_eq!(operation, "list contacts");
            assert!(source.is_timeout(), "expected a timeout, got {source:?}");
            let cause = std::error::Error::source(&source).expect("ureq error is kept as the source");
            assert!(matches!(cause.downcast_ref::<ureq::Error>(), Some(ureq::Error::Timeout(_))));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[test]
fn member_lifecycle() {
    let addr = start_server(seeded(10, 1));
    let api = api(addr);

    // Step 1: the token owner.
    let me = api.get_me().unwrap();
    assert_eq!(me.id, 1);

    // Step 2: create a nominee.
    let created = api
        .create_member_by_email("new@example.com", "New Person", Some("integration"))
        .unwrap();
    assert_eq!(created.member_type.as_deref(), Some("Nominee"));
    assert_eq!(created.source.as_deref(), Some("integration"));

    // Step 3: creating the same email again is rejected.
    let err = api
        .create_member_by_email("new@example.com", "New Person", None)
        .unwrap_err();
    assert_eq!(err.status(), Some(422));

    // Step 4: invite without sending email.
    let invitation = api.invite_member(created.id, false).unwrap();
    assert!(invitation.invite_link.unwrap().contains("/join/"));

    // Step 5: reference event credits points.
    let logged = api.log_event(EVENT_REFERRAL_SUBMITTED, created.id, 25).unwrap();
    assert_eq!(logged.points, 25);
    assert_eq!(logged.member.unwrap().current_points, 25);

    // Step 6: custom challenge event stacks on top.
    let logged = api.log_custom_challenge_event("quiz", "stage-1", created.id, 5).unwrap();
    assert_eq!(logged.member.unwrap().lifetime_points, 30);
    assert_eq!(logged.parameters["stage"], "stage-1");

    // Step 7: listing by email reflects all of the above.
    let found = api.query_members_by_field("email", "new@example.com").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].current_points, 30);
    assert!(found[0].invite_link.is_some());

    // Step 8: unknown member cannot be invited.
    let err = api.invite_member(999, true).unwrap_err();
    assert_eq!(err.status(), Some(404));
}

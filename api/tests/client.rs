//! HTTP-level tests for `ApiClient` against a wiremock backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use freizeit_api::{
    ApiClient, ApiConfig, ApiError, EventId, EventsApi, InMemorySessionStore, LeaveOutcome,
    ParticipationId, SessionStore, UserId, UserSummary,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn me() -> UserSummary {
    UserSummary {
        id: UserId(7),
        username: "lena".to_string(),
        first_name: "Lena".to_string(),
        last_name: "K".to_string(),
        profile_image: None,
    }
}

fn client(server: &MockServer, session: &InMemorySessionStore) -> ApiClient {
    ApiClient::new(
        ApiConfig::default().with_base_url(format!("{}/api", server.uri())),
        Arc::new(session.clone()),
    )
    .unwrap()
}

fn event_body() -> serde_json::Value {
    json!({
        "id": 1,
        "title": "Burgfest",
        "description": "",
        "date": "2025-07-12T14:00:00Z",
        "location": "Wartburg",
        "max_guests": 20,
        "created_by": {"id": 1, "username": "orga", "first_name": "O", "last_name": "R"},
        "participant_count": 2,
        "is_participant": true,
        "status": "published"
    })
}

fn participants_body() -> serde_json::Value {
    json!({
        "count": 2,
        "results": [
            {"id": 70, "joined_at": "2025-06-01T10:00:00Z",
             "user": {"id": 7, "username": "lena", "first_name": "Lena", "last_name": "K"}},
            {"id": 71, "joined_at": "2025-06-03T10:00:00Z",
             "user": {"id": 8, "username": "tom", "first_name": "Tom", "last_name": "T"}}
        ]
    })
}

#[tokio::test]
async fn fetch_event_loads_participants_with_token() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::logged_in("abc", me());

    Mock::given(method("GET"))
        .and(path("/api/events/1/"))
        .and(header("Authorization", "Token abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/1/participants/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(participants_body()))
        .expect(1)
        .mount(&server)
        .await;

    let event = client(&server, &session).fetch_event(EventId(1)).await.unwrap();

    assert_eq!(event.is_participant, Some(true));
    let participants = event.participants.unwrap();
    assert_eq!(participants.len(), 2);
    // newest first
    assert_eq!(participants[0].user.id, UserId(8));
}

#[tokio::test]
async fn fetch_event_tolerates_participant_failure() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::logged_in("abc", me());

    Mock::given(method("GET"))
        .and(path("/api/events/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/1/participants/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let event = client(&server, &session).fetch_event(EventId(1)).await.unwrap();

    assert!(event.participants.is_none());
    assert_eq!(event.participant_count, 2);
}

#[tokio::test]
async fn anonymous_fetch_skips_participants() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::new();

    Mock::given(method("GET"))
        .and(path("/api/events/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/1/participants/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(participants_body()))
        .expect(0)
        .mount(&server)
        .await;

    let event = client(&server, &session).fetch_event(EventId(1)).await.unwrap();
    assert!(event.participants.is_none());
}

#[tokio::test]
async fn non_participant_receives_event_with_hidden_location() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::logged_in("abc", me());

    let mut body = event_body();
    body["location"] = json!(null);
    body["contact_info"] = json!(null);
    body["can_view_location"] = json!(false);
    body["is_participant"] = json!(false);
    Mock::given(method("GET"))
        .and(path("/api/events/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/1/participants/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let event = client(&server, &session).fetch_event(EventId(1)).await.unwrap();

    assert_eq!(event.location, None);
    assert!(!event.can_view_location);
    assert_eq!(event.is_participant, Some(false));
    assert_eq!(event.participant_count, 2);
}

#[tokio::test]
async fn join_posts_empty_body_and_accepts_empty_response() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::logged_in("abc", me());

    Mock::given(method("POST"))
        .and(path("/api/events/1/participants/"))
        .and(header("Authorization", "Token abc"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, &session).join_event(EventId(1)).await.unwrap();
}

#[tokio::test]
async fn join_without_session_makes_no_request() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::new();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let error = client(&server, &session).join_event(EventId(1)).await.unwrap_err();
    assert_eq!(error, ApiError::NotAuthenticated);
}

#[tokio::test]
async fn bare_400_is_opaque() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::logged_in("abc", me());

    Mock::given(method("POST"))
        .and(path("/api/events/1/participants/"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let error = client(&server, &session).join_event(EventId(1)).await.unwrap_err();

    assert!(error.is_opaque());
    assert_eq!(error.to_string(), "API Error: 400 Bad Request");
}

#[tokio::test]
async fn backend_detail_becomes_message() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::logged_in("abc", me());

    Mock::given(method("POST"))
        .and(path("/api/events/1/participants/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"detail": "Du erfüllst die Altersanforderung nicht."})),
        )
        .mount(&server)
        .await;

    let error = client(&server, &session).join_event(EventId(1)).await.unwrap_err();

    assert!(!error.is_opaque());
    assert_eq!(error.to_string(), "Du erfüllst die Altersanforderung nicht.");
}

#[tokio::test]
async fn unauthorized_clears_session() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::logged_in("expired", me());

    Mock::given(method("GET"))
        .and(path("/api/friends/list/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let error = client(&server, &session).fetch_friend_ids().await.unwrap_err();

    assert_eq!(error, ApiError::Unauthorized);
    assert!(session.token().is_none());
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn leave_deletes_own_record() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::logged_in("abc", me());

    Mock::given(method("GET"))
        .and(path("/api/events/1/participants/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(participants_body()))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/events/1/participants/70/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client(&server, &session)
        .leave_event(EventId(1), UserId(7))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        LeaveOutcome::Removed {
            participation_id: ParticipationId(70)
        }
    );
}

#[tokio::test]
async fn leave_as_non_participant_is_noop() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::logged_in("abc", me());

    Mock::given(method("GET"))
        .and(path("/api/events/1/participants/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = client(&server, &session)
        .leave_event(EventId(1), UserId(7))
        .await
        .unwrap();

    assert_eq!(outcome, LeaveOutcome::NotParticipant);
}

#[tokio::test]
async fn comments_accept_bare_arrays_and_post_text() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::logged_in("abc", me());
    let comment = json!({
        "id": 5,
        "event": 1,
        "author": {"id": 7, "username": "lena", "first_name": "Lena", "last_name": "K"},
        "text": "Bin dabei!",
        "created_at": "2025-06-02T08:00:00Z",
        "is_author": true,
        "can_delete": true
    });

    Mock::given(method("GET"))
        .and(path("/api/events/1/comments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([comment.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/events/1/comments/"))
        .and(body_json(json!({"text": "Bin dabei!"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(comment))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, &session);
    let comments = client.fetch_comments(EventId(1)).await.unwrap();
    let created = client
        .add_comment(EventId(1), "Bin dabei!".to_string())
        .await
        .unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(created.text, "Bin dabei!");
    assert!(created.can_delete);
}

#[tokio::test]
async fn unreachable_backend_names_url() {
    let session = InMemorySessionStore::logged_in("abc", me());
    let client = ApiClient::new(
        ApiConfig::default().with_base_url("http://127.0.0.1:9/api"),
        Arc::new(session),
    )
    .unwrap();

    let error = client.fetch_event(EventId(1)).await.unwrap_err();

    assert!(matches!(error, ApiError::Unreachable { .. }));
    assert!(
        error
            .to_string()
            .starts_with("Netzwerk-Fehler: Backend nicht erreichbar unter http://127.0.0.1:9/api")
    );
}

#[tokio::test]
async fn health_check_is_cached() {
    let server = MockServer::start().await;
    let session = InMemorySessionStore::new();

    Mock::given(method("GET"))
        .and(path("/api/health/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, &session);
    assert!(client.check_health().await.is_healthy());
    assert!(client.check_health().await.is_healthy());
}

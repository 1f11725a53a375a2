//! Event participation demo.
//!
//! Drives one event-detail screen through load, focus, join and leave.
//! Runs against the backend at `FREIZEIT_API_URL` when it is set (with the
//! token in `FREIZEIT_API_TOKEN`), otherwise against a seeded in-memory backend.

use anyhow::Context;
use chrono::{TimeZone, Utc};
use freizeit_api::{
    ApiClient, Event, EventId, EventsApi, InMemorySessionStore, MockEventsApi, SessionStore, UserId,
    UserSummary,
};
use freizeit_core::environment::SystemClock;
use freizeit_participation::{
    Config, EventDetailAction, EventDetailEnvironment, EventDetailReducer, EventDetailState,
};
use freizeit_runtime::Store;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_EVENT: EventId = EventId(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "freizeit_participation=info,freizeit_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        base_url = %config.api.base_url,
        use_backend = config.use_backend,
        settle_delay_ms = config.reconciler.settle_delay_ms,
        "Configuration loaded"
    );

    if config.use_backend {
        let event_id = env::var("FREIZEIT_EVENT_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(DEMO_EVENT, EventId);
        let user = demo_user();
        let session = InMemorySessionStore::new();
        if let Ok(token) = env::var("FREIZEIT_API_TOKEN") {
            session.store(token, user.clone());
        } else {
            warn!("FREIZEIT_API_TOKEN not set; join and leave will prompt for login");
        }
        let has_session = session.token().is_some();

        let client = ApiClient::new(config.api.clone(), Arc::new(session))
            .context("failed to build API client")?;
        let health = client.check_health().await;
        if !health.is_healthy() {
            warn!(?health, "Backend health check failed");
        }

        run_demo(client, &config, event_id, has_session.then_some(user)).await
    } else {
        let api = seeded_backend();
        let user = demo_user();
        api.set_session_user(Some(user.clone()));
        run_demo(api, &config, DEMO_EVENT, Some(user)).await
    }
}

async fn run_demo<A>(
    api: A,
    config: &Config,
    event_id: EventId,
    user: Option<UserSummary>,
) -> anyhow::Result<()>
where
    A: EventsApi + Clone + 'static,
{
    let environment =
        EventDetailEnvironment::new(api, Arc::new(SystemClock), config.reconciler);
    let store = Store::new(
        EventDetailState::new(event_id, user),
        EventDetailReducer::new(),
        environment,
    );

    let settle = config.reconciler.settle_delay() * 2;

    store
        .send_and_wait_for(
            EventDetailAction::Mounted,
            |a| matches!(a, EventDetailAction::EventFetched { .. }),
            config.api.timeout(),
        )
        .await
        .context("event did not load")?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    report(&store, "loaded").await;

    store.send(EventDetailAction::Focused).await?;
    tokio::time::sleep(config.reconciler.focus_refresh_delay() * 2).await;
    report(&store, "refreshed").await;

    store.send(EventDetailAction::JoinTapped).await?;
    tokio::time::sleep(settle).await;
    report(&store, "after join").await;

    store.send(EventDetailAction::LeaveTapped).await?;
    tokio::time::sleep(settle).await;
    report(&store, "after leave").await;

    store.shutdown(config.api.timeout()).await?;
    Ok(())
}

async fn report<A>(
    store: &Store<
        EventDetailState,
        EventDetailAction,
        EventDetailEnvironment<A>,
        EventDetailReducer<A>,
    >,
    stage: &str,
) where
    A: EventsApi + Clone + 'static,
{
    store
        .state(|s| {
            let Some(event) = s.event.as_ref() else {
                warn!(stage, "Event not loaded");
                return;
            };
            info!(
                stage,
                title = %event.title,
                participants = event.participant_count,
                max_guests = ?event.max_guests,
                joined = s.is_joined(),
                full = s.is_full(),
                guard_held = s.guard.is_held(),
                alert = ?s.alert.as_ref().map(|a| &a.message),
                prompt = ?s.prompt.map(|p| p.message()),
                "Event detail"
            );
        })
        .await;
}

fn demo_user() -> UserSummary {
    UserSummary {
        id: UserId(env::var("FREIZEIT_USER_ID").ok().and_then(|v| v.parse().ok()).unwrap_or(7)),
        username: "demo".to_string(),
        first_name: "Demo".to_string(),
        last_name: "Nutzer".to_string(),
        profile_image: None,
    }
}

fn seeded_backend() -> MockEventsApi {
    let host = UserSummary {
        id: UserId(1),
        username: "lena".to_string(),
        first_name: "Lena".to_string(),
        last_name: "Berg".to_string(),
        profile_image: None,
    };
    let api = MockEventsApi::new();
    api.insert_event(Event {
        id: DEMO_EVENT,
        title: "Spieleabend".to_string(),
        description: "Brettspiele und Snacks".to_string(),
        date: Utc
            .with_ymd_and_hms(2025, 7, 12, 19, 0, 0)
            .single()
            .unwrap_or_default(),
        location: Some("Café Mitte".to_string()),
        contact_info: None,
        can_view_location: true,
        max_guests: Some(6),
        min_age: None,
        created_by: host.clone(),
        likes_count: 3,
        comments_count: 0,
        participant_count: 0,
        is_participant: None,
        participants: None,
        image_url: None,
        status: "published".to_string(),
        joined: false,
    });
    api.add_participant(DEMO_EVENT, host);
    api.set_latency(Duration::from_millis(120));
    api
}

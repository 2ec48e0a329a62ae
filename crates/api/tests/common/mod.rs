#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use lineup_api::config::ServerConfig;
use lineup_api::middleware::actor::ACTOR_HEADER;
use lineup_api::router::build_app_router;
use lineup_api::state::AppState;
use lineup_core::clock::ManualClock;
use lineup_core::types::{DbId, Timestamp};
use lineup_db::models::event::{CreateEvent, Event};
use lineup_db::models::spot::{CreateSpot, Spot};
use lineup_db::store::{MemorySpotStore, SpotStore};
use lineup_engine::retry::RetryPolicy;
use lineup_engine::{EngineConfig, SpotService};
use lineup_events::EventBus;
use tower::ServiceExt;

pub const PROMOTER: DbId = 100;

pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 6, 1, 15, 0, 0).unwrap()
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

/// The full router over an in-memory store and a manual clock.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemorySpotStore>,
    pub clock: ManualClock,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemorySpotStore::new());
        let clock = ManualClock::new(t0());
        let engine_config = EngineConfig {
            retry: RetryPolicy::none(),
            ..EngineConfig::default()
        };
        let service = Arc::new(SpotService::new(
            store.clone(),
            Arc::new(clock.clone()),
            Arc::new(EventBus::default()),
            engine_config,
        ));
        let config = test_config();
        let state = AppState {
            service,
            config: Arc::new(config.clone()),
        };
        Self {
            app: build_app_router(state, &config),
            store,
            clock,
        }
    }

    /// A promoter-owned event a week out with one spot per entry.
    pub async fn event_with_spots(&self, spot_types: &[&str]) -> (Event, Vec<Spot>) {
        let event = self
            .store
            .create_event(&CreateEvent {
                promoter_id: PROMOTER,
                title: "Friday Late Show".into(),
                event_date: t0() + Duration::days(7),
            })
            .await
            .unwrap();
        let mut spots = Vec::new();
        for (order, spot_type) in spot_types.iter().enumerate() {
            spots.push(
                self.store
                    .create_spot(&CreateSpot {
                        event_id: event.id,
                        spot_type: (*spot_type).to_string(),
                        spot_order: order as i32,
                    })
                    .await
                    .unwrap(),
            );
        }
        (event, spots)
    }

    pub async fn get(&self, uri: &str, actor: Option<DbId>) -> Response<Body> {
        self.send(Method::GET, uri, actor, None).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        actor: Option<DbId>,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.send(Method::POST, uri, actor, Some(body)).await
    }

    pub async fn post_empty(&self, uri: &str, actor: Option<DbId>) -> Response<Body> {
        self.send(Method::POST, uri, actor, None).await
    }

    /// POST a raw JSON-typed body, for malformed payloads.
    pub async fn post_raw(&self, uri: &str, actor: Option<DbId>, raw: &str) -> Response<Body> {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header(ACTOR_HEADER, actor.to_string());
        }
        let request = builder
            .header("content-type", "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        actor: Option<DbId>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header(ACTOR_HEADER, actor.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.app.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

//! A throwaway HTTP server standing in for the archive in tests.

use crate::config::GhcndConfig;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Clone)]
enum Fixture {
    Body(Vec<u8>),
    Status(StatusCode),
}

struct Route {
    fixture: Fixture,
    delay: Option<Duration>,
}

struct FixtureState {
    routes: HashMap<String, Route>,
    hits: Mutex<HashMap<String, usize>>,
}

#[derive(Default)]
pub(crate) struct FixtureServerBuilder {
    routes: HashMap<String, Route>,
}

impl FixtureServerBuilder {
    pub(crate) fn text(self, path: &str, body: impl Into<String>) -> Self {
        self.bytes(path, body.into().into_bytes())
    }

    pub(crate) fn bytes(mut self, path: &str, body: Vec<u8>) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                fixture: Fixture::Body(body),
                delay: None,
            },
        );
        self
    }

    pub(crate) fn status(mut self, path: &str, status: StatusCode) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                fixture: Fixture::Status(status),
                delay: None,
            },
        );
        self
    }

    /// Delays the response of an already registered route.
    pub(crate) fn delay(mut self, path: &str, delay: Duration) -> Self {
        if let Some(route) = self.routes.get_mut(path) {
            route.delay = Some(delay);
        }
        self
    }

    pub(crate) async fn start(self) -> FixtureServer {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fixture server");
        let addr = listener.local_addr().expect("fixture server address");
        let state = Arc::new(FixtureState {
            routes: self.routes,
            hits: Mutex::new(HashMap::new()),
        });
        let app = Router::new()
            .fallback(serve_fixture)
            .with_state(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fixture server");
        });
        FixtureServer {
            base_url: format!("http://{addr}/"),
            state,
            handle,
        }
    }
}

pub(crate) struct FixtureServer {
    base_url: String,
    state: Arc<FixtureState>,
    handle: JoinHandle<()>,
}

impl FixtureServer {
    pub(crate) fn builder() -> FixtureServerBuilder {
        FixtureServerBuilder::default()
    }

    pub(crate) fn config(&self) -> GhcndConfig {
        GhcndConfig::builder()
            .base_url(self.base_url.clone())
            .timeout(Duration::from_secs(2))
            .build()
    }

    /// Number of requests received for `path`.
    pub(crate) fn hits(&self, path: &str) -> usize {
        self.state
            .hits
            .lock()
            .expect("hits lock")
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_fixture(State(state): State<Arc<FixtureState>>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    *state
        .hits
        .lock()
        .expect("hits lock")
        .entry(path.clone())
        .or_default() += 1;

    let Some(route) = state.routes.get(&path) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(delay) = route.delay {
        tokio::time::sleep(delay).await;
    }
    match &route.fixture {
        Fixture::Body(body) => (StatusCode::OK, body.clone()).into_response(),
        Fixture::Status(status) => (*status).into_response(),
    }
}

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::Value;

use prnotify_github::GitHubSourceConfig;

/// A request the fake API received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub repo: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
}

/// A canned non-success answer for one repository.
#[derive(Debug, Clone)]
pub struct Failure {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: String,
}

#[derive(Default)]
struct FakeState {
    pulls: HashMap<String, Vec<Value>>,
    failures: HashMap<String, Failure>,
    raw_bodies: HashMap<String, String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Builder for a fake GitHub REST API serving `/repos/{owner}/{repo}/pulls`.
#[derive(Default)]
pub struct FakeGitHub {
    state: FakeState,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pulls(mut self, repo: &str, pulls: Vec<Value>) -> Self {
        self.state.pulls.insert(repo.to_string(), pulls);
        self
    }

    pub fn with_failure(mut self, repo: &str, failure: Failure) -> Self {
        self.state.failures.insert(repo.to_string(), failure);
        self
    }

    pub fn with_raw_body(mut self, repo: &str, body: &str) -> Self {
        self.state.raw_bodies.insert(repo.to_string(), body.to_string());
        self
    }

    pub async fn start(self) -> RunningFake {
        let state = Arc::new(self.state);
        let app = Router::new()
            .route("/repos/{owner}/{repo}/pulls", get(list_pulls))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RunningFake {
            addr,
            state,
            _server: handle,
        }
    }
}

pub struct RunningFake {
    pub addr: SocketAddr,
    state: Arc<FakeState>,
    _server: tokio::task::JoinHandle<()>,
}

impl RunningFake {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> GitHubSourceConfig {
        GitHubSourceConfig {
            token: "test-token".to_string(),
            api_url: self.base_url(),
            ..GitHubSourceConfig::default()
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn list_pulls(
    State(state): State<Arc<FakeState>>,
    Path((owner, repo)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let full_name = format!("{owner}/{repo}");
    state.requests.lock().unwrap().push(RecordedRequest {
        repo: full_name.clone(),
        query: query.clone(),
        headers,
    });

    if let Some(failure) = state.failures.get(&full_name) {
        let mut resp = (failure.status, failure.body.clone()).into_response();
        for (name, value) in &failure.headers {
            resp.headers_mut().insert(*name, value.parse().unwrap());
        }
        return resp;
    }

    if let Some(body) = state.raw_bodies.get(&full_name) {
        return (StatusCode::OK, body.clone()).into_response();
    }

    let Some(pulls) = state.pulls.get(&full_name) else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(serde_json::json!({"message": "Not Found"})),
        )
            .into_response();
    };

    let per_page: usize = query
        .get("per_page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
    let page: usize = query
        .get("page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let start = (page - 1) * per_page;
    let slice: Vec<Value> = pulls.iter().skip(start).take(per_page).cloned().collect();

    axum::Json(Value::Array(slice)).into_response()
}

/// A GitHub-shaped pull request payload.
pub fn pull(repo: &str, number: u64, created_at: &str) -> Value {
    serde_json::json!({
        "id": 9000 + number,
        "number": number,
        "title": format!("PR {number}"),
        "state": "open",
        "created_at": created_at,
        "html_url": format!("https://github.com/{repo}/pull/{number}"),
        "user": {"login": "alice"}
    })
}

/// Shared sink for a JSON `fmt` subscriber installed for one test.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    /// Install a JSON subscriber writing here for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn messages(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .filter_map(|l| {
                let record: Value = serde_json::from_str(l).ok()?;
                record["fields"]["message"].as_str().map(String::from)
            })
            .collect()
    }
}

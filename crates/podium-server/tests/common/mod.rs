use std::net::SocketAddr;
use std::time::Duration;

use podium_core::test_helpers::seed_profiles;
use podium_server::config::{CycleConfig, ServerConfig};
use podium_server::{build_app, state::AppState};

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with background jobs disabled so tests drive the
    /// cycle themselves.
    pub async fn new() -> Self {
        let config = ServerConfig {
            cycle: CycleConfig {
                enabled: false,
                ..CycleConfig::default()
            },
            ..ServerConfig::default()
        };
        Self::from_config(config).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, state) = build_app(config).await.unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            state,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Seed profile documents for the given `(member, age)` pairs.
    pub fn seed(&self, members: &[(&str, u32)]) {
        seed_profiles(&self.state.profiles, members);
    }
}

/// POST /modify for one member and assert success.
pub async fn modify(server: &TestServer, client: &reqwest::Client, member: &str, delta: i64) {
    let resp = client
        .post(format!("{}/modify", server.base_url()))
        .json(&serde_json::json!({ "member": member, "delta": delta }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200, "modify {member} failed");
}

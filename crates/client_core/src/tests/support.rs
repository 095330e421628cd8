//! Helpers shared by the HTTP-level tests: an in-process axum server and
//! ready-made sessions.

use std::sync::Arc;

use axum::Router;
use shared::domain::{SessionUser, UserId};
use tokio::net::TcpListener;

use crate::{
    config::UnauthorizedPolicy,
    session::{MemorySessionStore, PersistedSession, SessionContext},
    transport::ApiClient,
};

pub(crate) async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

pub(crate) fn sample_user() -> SessionUser {
    SessionUser {
        id: UserId(7),
        name: "Elena".into(),
        last_name: "Vargas".into(),
        email: "elena@broker.test".into(),
        profile_picture: None,
    }
}

pub(crate) async fn authenticated_session(token: &str) -> Arc<SessionContext> {
    let store = MemorySessionStore::with_session(PersistedSession {
        token: token.to_string(),
        user: sample_user(),
    });
    let session = SessionContext::new(Arc::new(store));
    session.initialize().await;
    session
}

pub(crate) async fn anonymous_session() -> Arc<SessionContext> {
    let session = SessionContext::new(Arc::new(MemorySessionStore::default()));
    session.initialize().await;
    session
}

pub(crate) fn api(base_url: &str, session: Arc<SessionContext>) -> ApiClient {
    ApiClient::new(
        reqwest::Client::new(),
        base_url,
        session,
        UnauthorizedPolicy::Logout,
    )
}

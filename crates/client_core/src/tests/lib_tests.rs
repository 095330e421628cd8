use axum::{routing::get, Json, Router};
use serde_json::json;
use shared::domain::ClientId;

use super::*;
use crate::{
    session::{MemorySessionStore, PersistedSession},
    tests_support::{sample_user, spawn_server},
};

fn settings_for(base: &str) -> Settings {
    Settings {
        api_url: base.to_string(),
        ..Settings::default()
    }
}

#[tokio::test]
async fn console_gates_private_routes_until_session_restores() {
    let store = Arc::new(MemorySessionStore::with_session(PersistedSession {
        token: "tok".into(),
        user: sample_user(),
    }));
    let console = Console::with_store(settings_for("http://127.0.0.1:9"), store);

    assert_eq!(console.authorize(Route::Clients), Access::Pending);
    assert_eq!(console.authorize(Route::Login), Access::Granted);

    console.initialize().await;
    assert_eq!(console.authorize(Route::ClientDetails(ClientId(3))), Access::Granted);

    console.auth.logout().await.expect("logout");
    assert_eq!(console.authorize(Route::Clients), Access::RedirectToLogin);
}

#[tokio::test]
async fn services_share_one_session_and_route_to_their_bases() {
    let clients_api = Router::new().route(
        "/7/clients",
        get(|| async { Json(json!({ "data": [], "total": 0, "per_page": 5 })) }),
    );
    let policies_api = Router::new().route(
        "/polizas",
        get(|| async { Json(json!({ "data": [], "total": 12, "per_page": 5 })) }),
    );
    let clients_base = spawn_server(clients_api).await;
    let policies_base = spawn_server(policies_api).await;

    let mut settings = settings_for(&clients_base);
    settings.policies_url = Some(policies_base);
    let store = Arc::new(MemorySessionStore::with_session(PersistedSession {
        token: "tok".into(),
        user: sample_user(),
    }));
    let console = Console::with_store(settings, store);
    console.initialize().await;

    let clients = console.clients.list(1, 5).await.expect("clients");
    assert!(clients.items.is_empty());
    assert_eq!(clients.total_pages, 1);

    let policies = console.policies.list(1, 5).await.expect("policies");
    assert_eq!(policies.total_pages, 3);

    let options = console.list_options();
    assert_eq!(options.page_size, console.settings().page_size);
}

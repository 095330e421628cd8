//! Client library for the insurance broker console: session, typed services
//! over the REST backends, list controllers, forms, uploads and exports.

use std::sync::Arc;

use reqwest::Client;

pub mod attachment;
pub mod config;
pub mod error;
pub mod export;
pub mod forms;
pub mod listing;
pub mod routes;
pub mod services;
pub mod session;
pub mod transport;
pub mod upload;

pub use config::{load_settings, Settings, UnauthorizedPolicy};
pub use error::{ClientError, Result};
pub use listing::{ListController, ListOptions, ListState, PageSource};
pub use routes::{authorize, Access, Route};
pub use services::{AuthService, ClientService, PaymentService, PolicyService, ResetLink};
pub use session::{FileSessionStore, SessionContext, SessionState, SessionStore};

use crate::transport::ApiClient;

/// Everything a front-end needs: one session shared by every service.
#[derive(Clone)]
pub struct Console {
    settings: Settings,
    session: Arc<SessionContext>,
    pub auth: AuthService,
    pub clients: ClientService,
    pub policies: PolicyService,
    pub payments: PaymentService,
}

impl Console {
    /// Uses the session file named in `settings`.
    pub fn new(settings: Settings) -> Self {
        let store = Arc::new(FileSessionStore::new(settings.session_file.clone()));
        Self::with_store(settings, store)
    }

    pub fn with_store(settings: Settings, store: Arc<dyn SessionStore>) -> Self {
        let session = SessionContext::new(store);
        let http = Client::new();
        let api = |base: &str| {
            ApiClient::new(
                http.clone(),
                base,
                Arc::clone(&session),
                settings.unauthorized,
            )
        };

        let auth = AuthService::new(api(settings.auth_url()));
        let clients = ClientService::new(
            api(settings.clients_url()),
            api(settings.search_url()),
            api(settings.notes_url()),
        );
        let policies = PolicyService::new(api(settings.policies_url()), api(settings.search_url()));
        let payments = PaymentService::new(api(settings.payments_url()));

        Self {
            settings,
            session,
            auth,
            clients,
            policies,
            payments,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Restores the persisted session; call once before routing.
    pub async fn initialize(&self) -> SessionState {
        self.session.initialize().await
    }

    pub fn authorize(&self, route: Route) -> Access {
        routes::authorize(route, &self.session.state())
    }

    pub fn list_options(&self) -> ListOptions {
        ListOptions::from_settings(&self.settings)
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod tests_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

//! One service per logical backend: auth, clients, policies, payments.

pub mod auth;
pub mod clients;
pub mod payments;
pub mod policies;

pub use auth::{AuthService, ResetLink};
pub use clients::ClientService;
pub use payments::PaymentService;
pub use policies::PolicyService;

/// Query for paginated endpoints.
#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct PageParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<&'a str>,
    pub page: u32,
    pub limit: u32,
}

impl<'a> PageParams<'a> {
    pub fn list(page: u32, limit: u32) -> Self {
        Self {
            q: None,
            page,
            limit,
        }
    }

    pub fn search(term: &'a str, page: u32, limit: u32) -> Self {
        Self {
            q: Some(term),
            page,
            limit,
        }
    }
}

#[cfg(test)]
#[path = "../tests/services_tests.rs"]
mod tests;

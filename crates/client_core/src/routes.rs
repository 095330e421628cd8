//! Routed views and the auth gate in front of them.

use std::fmt;

use shared::domain::{ClientId, PolicyId};

use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    PasswordReset,
    NewPassword,
    Home,
    Clients,
    ClientDetails(ClientId),
    ClientPolicies(ClientId),
    Policies,
    PolicyDetails(PolicyId),
    PolicyPayments(PolicyId),
    Payments,
    Profile,
}

impl Route {
    pub fn is_public(self) -> bool {
        matches!(
            self,
            Self::Login | Self::Register | Self::PasswordReset | Self::NewPassword
        )
    }

    pub fn path(self) -> String {
        match self {
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::PasswordReset => "/forgot-password".into(),
            Self::NewPassword => "/reset-password".into(),
            Self::Home => "/".into(),
            Self::Clients => "/clients".into(),
            Self::ClientDetails(id) => format!("/clients/{id}"),
            Self::ClientPolicies(id) => format!("/clients/{id}/policies"),
            Self::Policies => "/policies".into(),
            Self::PolicyDetails(id) => format!("/policies/{id}"),
            Self::PolicyPayments(id) => format!("/policies/{id}/payments"),
            Self::Payments => "/payments".into(),
            Self::Profile => "/profile".into(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Session still loading; show a placeholder.
    Pending,
    RedirectToLogin,
}

pub fn authorize(route: Route, state: &SessionState) -> Access {
    if route.is_public() {
        return Access::Granted;
    }
    match state {
        SessionState::Authenticated(_) => Access::Granted,
        SessionState::Uninitialized | SessionState::Loading => Access::Pending,
        SessionState::Anonymous => Access::RedirectToLogin,
    }
}

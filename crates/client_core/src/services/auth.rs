use std::sync::Arc;

use reqwest::multipart::Form;
use serde_json::Value;
use shared::{
    domain::SessionUser,
    protocol::{
        LoginRequest, LoginResponse, MessageResponse, NewPasswordRequest, PasswordResetRequest,
        RegisterRequest, UpdateUserResponse,
    },
};
use tracing::info;
use url::Url;

use crate::{
    error::{ClientError, Result},
    forms::{FormErrors, NewPasswordForm, ProfileForm, RegisterForm},
    session::SessionContext,
    transport::ApiClient,
};

const RESET_ROUTES: &[&str] = &["reset-password", "forgot-password"];

/// Token (and optionally email) carried by the link in a password reset
/// email, e.g. `https://console.test/reset-password/<token>?email=a@b.c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetLink {
    pub token: String,
    pub email: Option<String>,
}

impl ResetLink {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim()).map_err(|source| ClientError::Url {
            url: raw.to_string(),
            source,
        })?;

        let mut token = None;
        let mut email = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "token" if !value.is_empty() => token = Some(value.into_owned()),
                "email" if !value.is_empty() => email = Some(value.into_owned()),
                _ => {}
            }
        }

        let token = token
            .or_else(|| {
                url.path_segments()
                    .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                    .filter(|segment| !RESET_ROUTES.contains(segment))
                    .map(str::to_string)
            })
            .ok_or_else(|| {
                let mut errors = FormErrors::default();
                errors.add("token", "reset link carries no token");
                ClientError::Validation(errors)
            })?;

        Ok(Self { token, email })
    }
}

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: Arc<SessionContext>,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        let session = Arc::clone(api.session());
        Self { api, session }
    }

    /// Exchanges credentials for a token and user record and persists both.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser> {
        let response: LoginResponse = self
            .api
            .post_public(
                "login",
                &LoginRequest {
                    email: email.trim().to_string(),
                    password: password.to_string(),
                },
            )
            .await?;
        if response.token.is_empty() {
            return Err(ClientError::InvalidResponse(
                "login response carried an empty token".into(),
            ));
        }
        self.session
            .establish(response.token, response.user.clone())
            .await?;
        Ok(response.user)
    }

    /// Local only: forgets the persisted token and user.
    pub async fn logout(&self) -> Result<()> {
        self.session.clear().await
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<()> {
        form.validate()?;
        let _: Value = self
            .api
            .post_public(
                "register",
                &RegisterRequest {
                    name: form.name.trim().to_string(),
                    last_name: form.last_name.trim().to_string(),
                    email: form.email.trim().to_string(),
                    password: form.password.clone(),
                },
            )
            .await?;
        info!(email = form.email.trim(), "account registered");
        Ok(())
    }

    /// First step of the reset flow: the backend emails a reset link.
    pub async fn request_password_reset(&self, email: &str) -> Result<String> {
        let response: MessageResponse = self
            .api
            .post_public(
                "forgot-password",
                &PasswordResetRequest {
                    email: email.trim().to_string(),
                },
            )
            .await?;
        Ok(response.message)
    }

    /// Second step: new password submitted against the link's token.
    pub async fn reset_password(&self, link: &ResetLink, form: &NewPasswordForm) -> Result<String> {
        form.validate()?;
        let response: MessageResponse = self
            .api
            .post_public(
                "reset-password",
                &NewPasswordRequest {
                    email: form.email.trim().to_string(),
                    password: form.password.clone(),
                    password_confirmation: form.password_confirmation.clone(),
                    token: link.token.clone(),
                },
            )
            .await?;
        Ok(response.message)
    }

    pub async fn update_profile(&self, form: &ProfileForm) -> Result<SessionUser> {
        let user_id = self.session.require_user_id()?;
        form.validate()?;

        let mut multipart = Form::new()
            .text("name", form.name.trim().to_string())
            .text("last_name", form.last_name.trim().to_string())
            .text("email", form.email.trim().to_string());
        if let Some(picture) = &form.picture {
            multipart = multipart.part("profile_picture", picture.to_part()?);
        }

        let response: UpdateUserResponse = self
            .api
            .post_multipart(&format!("update/{user_id}"), multipart)
            .await?;
        self.session.update_user(response.user.clone()).await?;
        info!(user_id = user_id.0, "profile updated");
        Ok(response.user)
    }
}

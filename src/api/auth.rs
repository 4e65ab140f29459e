//! Authentication and user administration.
//!
//! `login` is the only call that writes a credential into the session;
//! `logout` always clears it, whether or not the server call succeeds.

use serde_json::json;
use tracing::{info, warn};

use super::types::{
    LoginRequest, LoginResponse, MessageResponse, PasswordUpdateRequest, RegisterRequest,
    TokenRefreshResponse, User, UserListParams, UserListResponse, UserRole, UserUpdateRequest,
};
use crate::http::{ApiError, RequestOptions, Transport};

pub struct AuthApi<'a> {
    transport: &'a Transport,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Log in and store the access token in the shared session.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.transport.post("/api/auth/login", &request).await?;
        self.transport
            .session()
            .set_credential(response.access_token.clone());
        info!(username = %response.user.username, "Logged in");
        Ok(response)
    }

    /// Notify the server, then drop the local credential unconditionally.
    pub async fn logout(&self) {
        let result = self
            .transport
            .post_empty::<MessageResponse>("/api/auth/logout", RequestOptions::default())
            .await;
        if let Err(e) = result {
            warn!(error = %e, "Server logout failed; clearing local session anyway");
        }
        self.transport.session().clear_credential();
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        self.transport.post("/api/auth/register", request).await
    }

    /// Exchange a refresh token; the new access token replaces the session credential.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenRefreshResponse, ApiError> {
        let response: TokenRefreshResponse = self
            .transport
            .post("/api/auth/refresh", &json!({ "refresh_token": refresh_token }))
            .await?;
        self.transport
            .session()
            .set_credential(response.access_token.clone());
        Ok(response)
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.transport.get("/api/auth/me").await
    }

    pub async fn update_me(&self, update: &UserUpdateRequest) -> Result<User, ApiError> {
        self.transport.put("/api/auth/me", update).await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let request = PasswordUpdateRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.transport.put("/api/auth/me/password", &request).await
    }

    pub async fn list_users(&self, params: &UserListParams) -> Result<UserListResponse, ApiError> {
        self.transport
            .get_with("/api/auth/users", params.to_options())
            .await
    }

    pub async fn create_user(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        self.transport.post("/api/auth/users", request).await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User, ApiError> {
        self.transport
            .get(&format!("/api/auth/users/{}", user_id))
            .await
    }

    pub async fn update_user(
        &self,
        user_id: i64,
        update: &UserUpdateRequest,
    ) -> Result<User, ApiError> {
        self.transport
            .put(&format!("/api/auth/users/{}", user_id), update)
            .await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<MessageResponse, ApiError> {
        self.transport
            .delete(&format!("/api/auth/users/{}", user_id))
            .await
    }

    pub async fn set_user_active(
        &self,
        user_id: i64,
        is_active: bool,
    ) -> Result<MessageResponse, ApiError> {
        self.transport
            .put(
                &format!("/api/auth/users/{}/status", user_id),
                &json!({ "is_active": is_active }),
            )
            .await
    }

    pub async fn set_user_role(
        &self,
        user_id: i64,
        role: UserRole,
    ) -> Result<MessageResponse, ApiError> {
        self.transport
            .put(
                &format!("/api/auth/users/{}/role", user_id),
                &json!({ "role": role }),
            )
            .await
    }
}

// Authentication service - business logic layer

use tracing::{debug, info};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{LoginRequest, LoginResponse, RefreshResponse, RegisterRequest, Role, UserResponse},
    password::PasswordService,
    repository::{RefreshTokenRepository, UserRepository},
    token::TokenService,
};

/// Authentication service coordinating credential checks and the
/// access/refresh token lifecycle
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    refresh_tokens: RefreshTokenRepository,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(
        users: UserRepository,
        refresh_tokens: RefreshTokenRepository,
        tokens: TokenService,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            tokens,
        }
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn token_service(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new user directly (bypasses the admission flow)
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        if self.users.email_exists(&request.email).await? {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = PasswordService::hash_password(&request.password)?;
        let role = request.role.unwrap_or(Role::Student);
        let user = self
            .users
            .create_user(&request.name, &request.email, &password_hash, role)
            .await?;

        info!("Registered user {} with role {}", user.id, user.role);
        Ok(user.into())
    }

    /// Verify credentials and issue a token pair.
    /// Unknown email and wrong password both collapse to the same generic
    /// error so accounts cannot be enumerated.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        debug!("Login attempt for {}", request.email);

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.tokens.issue_access_token(user.id)?;
        let refresh_token = self.refresh_tokens.create_for_user(user.id).await?;

        info!("User {} logged in", user.id);
        Ok(LoginResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Unknown token fails "not recognized"; an expired token is deleted
    /// and fails "expired"; a valid token is returned unchanged alongside
    /// a fresh access token (no rotation).
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        let record = self
            .refresh_tokens
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::RefreshTokenNotRecognized)?;

        if record.is_expired() {
            self.refresh_tokens.delete_by_id(record.id).await?;
            debug!("Consumed expired refresh token for user {}", record.user_id);
            return Err(AuthError::RefreshTokenExpired);
        }

        let access_token = self.tokens.issue_access_token(record.user_id)?;

        Ok(RefreshResponse {
            access_token,
            refresh_token: refresh_token.to_string(),
        })
    }

    /// Delete the supplied refresh token. Tokens that are already gone
    /// still log out successfully.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.refresh_tokens.delete_by_token(refresh_token).await
    }
}

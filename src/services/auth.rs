//! Operator authentication

use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::auth::{LoginResponse, OperatorClaims},
};

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Check the credentials against the configured operator and issue a token
    pub fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let operator = &self.config.operator;
        if username != operator.username || password != operator.password {
            tracing::debug!(username = %username, "Rejected login attempt");
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let now = Utc::now().timestamp();
        let expires_in = self.config.jwt_expiration_hours as i64 * 3600;

        let claims = OperatorClaims {
            sub: operator.id.clone(),
            exp: now + expires_in,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!(operator = %operator.id, "Operator logged in");

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
        })
    }

    /// Verify a bearer token and return its claims
    pub fn verify(&self, token: &str) -> AppResult<OperatorClaims> {
        OperatorClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))
    }
}

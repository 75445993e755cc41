use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::warn;

use crate::api::ApiError;
use crate::config::Config;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sign_in: Option<String>,
}

impl UserInfo {
    fn from_value(value: &serde_json::Value) -> Result<Self> {
        let user_id = value
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Invalid response format: missing user id"))?;
        let text = |key: &str| value.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());

        Ok(UserInfo {
            user_id: user_id.to_string(),
            email: text("email").unwrap_or_default(),
            created_at: text("created_at"),
            last_sign_in: text("last_sign_in_at"),
        })
    }
}

/// Token from an `Authorization` header value, with or without the
/// `Bearer ` prefix.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

pub fn is_admin(email: &str, admin_email: &str) -> bool {
    let email = email.to_lowercase();
    email.contains("admin") || email == admin_email
}

/// Identity provider client (GoTrue REST API).
pub struct AuthClient {
    http: reqwest::Client,
    base_url: Option<String>,
    service_key: Option<String>,
    admin_email: String,
}

impl AuthClient {
    pub fn new(config: &Config) -> Self {
        AuthClient {
            http: reqwest::Client::new(),
            base_url: config.supabase_url.clone(),
            service_key: config.supabase_service_key.clone(),
            admin_email: config.admin_email.clone(),
        }
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    fn endpoint(&self, path: &str) -> Result<(String, &str)> {
        match (&self.base_url, &self.service_key) {
            (Some(base), Some(key)) => Ok((format!("{}/auth/v1{}", base, path), key.as_str())),
            _ => Err(anyhow!(
                "SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY environment variables must be set"
            )),
        }
    }

    /// `None` when the provider rejects the token.
    pub async fn verify_token(&self, token: &str) -> Result<Option<UserInfo>> {
        let (url, key) = self.endpoint("/user")?;
        let response = self
            .http
            .get(&url)
            .header("apikey", key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Auth API error: {} - {}", status, error_text));
        }

        let body: serde_json::Value = response.json().await?;
        Ok(Some(UserInfo::from_value(&body)?))
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserInfo>> {
        let (url, key) = self.endpoint(&format!("/admin/users/{}", user_id))?;
        let response = self
            .http
            .get(&url)
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Auth API error: {} - {}", status, error_text));
        }

        let body: serde_json::Value = response.json().await?;
        Ok(Some(UserInfo::from_value(&body)?))
    }

    pub async fn list_users(&self) -> Result<Vec<UserInfo>> {
        let (url, key) = self.endpoint("/admin/users")?;
        let response = self
            .http
            .get(&url)
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Auth API error: {} - {}", status, error_text));
        }

        let body: serde_json::Value = response.json().await?;
        parse_user_list(&body)
    }

    /// Creates the account with its email already confirmed.
    pub async fn create_user(&self, email: &str, password: &str) -> Result<UserInfo> {
        let (url, key) = self.endpoint("/admin/users")?;
        let response = self
            .http
            .post(&url)
            .header("apikey", key)
            .bearer_auth(key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "email_confirm": true
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Auth API error: {} - {}", status, error_text));
        }

        let body: serde_json::Value = response.json().await?;
        UserInfo::from_value(&body)
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        let (url, key) = self.endpoint(&format!("/admin/users/{}", user_id))?;
        let response = self
            .http
            .delete(&url)
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Auth API error: {} - {}", status, error_text));
        }
        Ok(())
    }
}

// The admin list endpoint returns `{"users": [...]}`; older deployments
// return a bare array.
fn parse_user_list(body: &serde_json::Value) -> Result<Vec<UserInfo>> {
    let users = body
        .get("users")
        .and_then(|v| v.as_array())
        .or_else(|| body.as_array())
        .ok_or_else(|| anyhow!("Invalid response format: missing users"))?;
    users.iter().map(UserInfo::from_value).collect()
}

/// A request carrying a token the identity provider accepts.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserInfo);

/// An authenticated user with admin rights.
#[derive(Debug, Clone)]
pub struct AdminUser(pub UserInfo);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Authorization header missing"))?;
        let token = bearer_token(header).ok_or_else(|| ApiError::unauthorized("Authorization header missing"))?;

        match state.auth.verify_token(token).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => Err(ApiError::unauthorized("Invalid or expired token")),
            Err(e) => {
                warn!("Token verification error: {}", e);
                Err(ApiError::unauthorized("Authentication failed"))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if is_admin(&user.email, state.auth.admin_email()) {
            Ok(AdminUser(user))
        } else {
            Err(ApiError::forbidden("Admin access required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn test_is_admin() {
        let admin = "admin@storycatcher.com";
        assert!(is_admin("admin@storycatcher.com", admin));
        assert!(is_admin("Site.Admin@example.com", admin));
        assert!(!is_admin("writer@example.com", admin));
        assert!(is_admin("Boss@Example.com", "boss@example.com"));
    }

    #[test]
    fn test_user_parsing() {
        let body = serde_json::json!({
            "users": [
                { "id": "u1", "email": "a@example.com", "created_at": "2024-01-01T00:00:00Z", "last_sign_in_at": null },
                { "id": "u2", "email": "b@example.com" }
            ]
        });
        let users = parse_user_list(&body).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert!(users[0].last_sign_in.is_none());

        let bare = serde_json::json!([{ "id": "u3", "email": "c@example.com" }]);
        assert_eq!(parse_user_list(&bare).unwrap()[0].user_id, "u3");

        assert!(UserInfo::from_value(&serde_json::json!({ "email": "x" })).is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_client_errors() {
        let config = Config::from_lookup(|_| None).unwrap();
        let client = AuthClient::new(&config);
        assert!(client.verify_token("t").await.is_err());
        assert!(client.list_users().await.is_err());
    }
}

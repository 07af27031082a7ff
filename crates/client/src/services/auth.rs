//! Token endpoints and the current-user profile.

use serde::{Deserialize, Serialize};
use serde_json::json;

use sca_auth::{TokenPair, UserProfile};

use crate::error::ApiError;
use crate::http::ApiClient;

const TOKEN: &str = "/api/auth/token/";
const TOKEN_REFRESH: &str = "/api/auth/token/refresh/";
const TOKEN_VERIFY: &str = "/api/auth/token/verify/";
const ME: &str = "/api/usuarios/me/";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Body of `POST /api/auth/token/`; both tokens are required by the caller.
#[derive(Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl TokenResponse {
    pub fn into_pair(self) -> Option<TokenPair> {
        match (self.access, self.refresh) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Some(TokenPair { access, refresh })
            }
            _ => None,
        }
    }
}

/// Body of `POST /api/auth/token/refresh/`; `refresh` is only sent when rotation is on.
#[derive(Clone, Default, Deserialize)]
pub struct RefreshResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn obtain_token(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        self.api
            .post(TOKEN, &Credentials { username, password })
            .await
    }

    pub async fn refresh_token(&self, refresh: &str) -> Result<RefreshResponse, ApiError> {
        self.api.post(TOKEN_REFRESH, &json!({ "refresh": refresh })).await
    }

    pub async fn verify_token(&self, token: &str) -> Result<(), ApiError> {
        self.api.post_unit(TOKEN_VERIFY, &json!({ "token": token })).await
    }

    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.api.get(ME, &[]).await
    }
}

//! Backend HTTP API.
//!
//! A thin wrapper over `reqwest` that resolves endpoint paths against the
//! configured base URL and attaches `Authorization: Bearer <token>` when a
//! token is stored.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;
use crate::menu::MenuNode;
use crate::token::{Token, TokenStore};

pub const LOGIN_PATH: &str = "api/login/";
pub const LOGIN_VERIFY_PATH: &str = "api/login_verify/";
pub const USER_INFO_PATH: &str = "api/login_user_info/";
pub const MENUS_PATH: &str = "api/system/menus/";

/// Longest error body kept in [`ApiError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Where the session gets its menu tree from.
#[async_trait]
pub trait MenuSource: Send + Sync {
    /// Fetch the menu tree for the current identity.
    async fn fetch_menus(&self) -> Result<Vec<MenuNode>, ApiError>;
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default, alias = "token", alias = "jwt")]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: Option<&'a str>,
}

/// HTTP client for the admin backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, tokens: TokenStore) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request for `path`, authorized if a token is stored.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.base_url.join(path)?;
        let mut req = self.client.request(method, url);
        if let Some(auth) = self.tokens.authorization()? {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        Ok(req)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let resp = check_status(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    /// Exchange credentials for a token. Does not store it.
    pub async fn login(&self, username: &str, password: &str) -> Result<Token, ApiError> {
        let req = self
            .request(Method::POST, LOGIN_PATH)?
            .json(&LoginRequest { username, password });
        let resp: LoginResponse = self.send(req).await?;

        if let Some(kind) = resp.token_type.as_deref()
            && !kind.eq_ignore_ascii_case("bearer")
        {
            warn!(token_type = %kind, "unexpected token type in login response");
        }
        let token = resp
            .access_token
            .and_then(Token::new)
            .ok_or(ApiError::MissingToken)?;
        debug!(username = %username, "login succeeded");
        Ok(token)
    }

    /// Ask the backend whether the stored token is still valid.
    pub async fn verify_login(&self) -> Result<JsonValue, ApiError> {
        let token = self.tokens.get_token()?;
        let req = self
            .request(Method::POST, LOGIN_VERIFY_PATH)?
            .json(&VerifyRequest {
                token: token.as_ref().map(Token::as_str),
            });
        self.send(req).await
    }

    /// Profile of the logged-in user.
    pub async fn user_info(&self) -> Result<JsonValue, ApiError> {
        let req = self.request(Method::GET, USER_INFO_PATH)?;
        self.send(req).await
    }
}

#[async_trait]
impl MenuSource for ApiClient {
    async fn fetch_menus(&self) -> Result<Vec<MenuNode>, ApiError> {
        let req = self.request(Method::GET, MENUS_PATH)?;
        let menus: Vec<MenuNode> = self.send(req).await?;
        debug!(menus = menus.len(), "menu tree fetched");
        Ok(menus)
    }
}

async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let mut body = resp.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(ApiError::Status { status, body })
}

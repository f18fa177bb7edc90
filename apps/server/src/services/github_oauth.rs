//! GitHub OAuth sign-in.
//!
//! Endpoints:
//! 1. GET /auth/github: redirect to GitHub with a CSRF `state`
//! 2. GET /auth/github/callback: verify state, exchange code, resolve the
//!    account, set the session cookie and redirect back to the web app

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, get, web};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::auth::{create_session_token, session_cookie};
use crate::config::{Config, GitHubOAuthSettings};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::user::{GitHubEmail, GitHubUserInfo};

use super::accounts;

/// OAuth CSRF state cookie, verified on callback to prevent login CSRF.
const OAUTH_STATE_COOKIE: &str = "jobtrack_oauth_state";
const DEFAULT_CALLBACK_PATH: &str = "/api/auth/github/callback";
/// HTTP connect timeout for GitHub API calls.
const HTTP_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
/// HTTP total timeout for GitHub API calls.
const HTTP_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
const USER_AGENT: &str = "jobtrack";

/// Configure OAuth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(github_login).service(github_callback);
}

fn build_http_client() -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}

fn generate_random_hex() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

fn state_cookie(value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(OAUTH_STATE_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie
}

fn oauth_failed() -> AppError {
    AppError::Unauthorized("GitHub authentication failed".to_string())
}

fn client_id(oauth: &GitHubOAuthSettings) -> AppResult<&str> {
    if !oauth.enabled {
        return Err(AppError::InvalidInput(
            "GitHub OAuth is not configured".to_string(),
        ));
    }
    oauth
        .client_id
        .as_deref()
        .ok_or_else(|| AppError::InvalidInput("GitHub OAuth client ID not configured".to_string()))
}

/// GET a GitHub API resource with the user's token.
async fn github_api<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    token: &SecretString,
) -> AppResult<T> {
    client
        .get(url)
        .header("Authorization", format!("Bearer {}", token.expose_secret()))
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .map_err(|e| {
            warn!("OAuth: request to {} failed: {}", url, e);
            oauth_failed()
        })?
        .json()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to parse response from {}: {}", url, e);
            oauth_failed()
        })
}

/// Redirect to the GitHub OAuth authorization page.
#[get("/auth/github")]
pub async fn github_login(config: web::Data<Config>) -> AppResult<HttpResponse> {
    let oauth = &config.github_oauth;
    let client_id = client_id(oauth)?;
    let redirect_uri = oauth
        .redirect_url
        .as_deref()
        .unwrap_or(DEFAULT_CALLBACK_PATH);

    let state = generate_random_hex();
    let authorize_url = format!(
        "https://github.com/login/oauth/authorize?client_id={}&redirect_uri={}&state={}&scope=user:email",
        client_id,
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&state),
    );

    Ok(HttpResponse::Found()
        .cookie(state_cookie(state, config.environment.is_production()))
        .append_header(("Location", authorize_url))
        .finish())
}

/// Handle the GitHub OAuth callback.
#[get("/auth/github/callback")]
pub async fn github_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let oauth = &config.github_oauth;
    let client_id = client_id(oauth)?;

    let expected_state = req
        .cookie(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| {
            warn!("OAuth callback: missing state cookie");
            AppError::Unauthorized("OAuth state verification failed".to_string())
        })?;

    let provided_state = query.state.as_deref().unwrap_or("");
    let matches: bool = provided_state
        .as_bytes()
        .ct_eq(expected_state.as_bytes())
        .into();
    if provided_state.is_empty() || !matches {
        warn!("OAuth callback: state mismatch");
        return Err(AppError::Unauthorized(
            "OAuth state verification failed".to_string(),
        ));
    }

    let client_secret = oauth.client_secret.as_ref().ok_or_else(|| {
        AppError::InvalidInput("GitHub OAuth client secret not configured".to_string())
    })?;

    let http_client = build_http_client()?;
    let token_response: TokenResponse = http_client
        .post("https://github.com/login/oauth/access_token")
        .header("Accept", "application/json")
        .json(&serde_json::json!({
            "client_id": client_id,
            "client_secret": client_secret.expose_secret(),
            "code": query.code,
        }))
        .send()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to exchange code: {}", e);
            oauth_failed()
        })?
        .json()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to parse token response: {}", e);
            oauth_failed()
        })?;

    if let Some(ref err) = token_response.error {
        warn!("OAuth: GitHub returned error: {}", err);
        return Err(oauth_failed());
    }

    let gh_access_token: SecretString = token_response
        .access_token
        .map(SecretString::from)
        .ok_or_else(|| {
            warn!("OAuth: no access_token in response");
            oauth_failed()
        })?;

    let user_info: GitHubUserInfo =
        github_api(&http_client, "https://api.github.com/user", &gh_access_token).await?;
    let emails: Vec<GitHubEmail> = github_api(
        &http_client,
        "https://api.github.com/user/emails",
        &gh_access_token,
    )
    .await
    .unwrap_or_default();

    let verified_email = emails
        .iter()
        .find(|e| e.primary && e.verified)
        .or_else(|| emails.iter().find(|e| e.verified))
        .map(|e| e.email.clone());

    let login = user_info.login.clone();
    let user = accounts::login_with_github(pool.get_ref(), user_info, verified_email).await?;
    info!("GitHub OAuth login: github='{}' (user={})", login, user.id);

    let is_prod = config.environment.is_production();
    let token = create_session_token(user.id, &config.session)?;

    Ok(HttpResponse::Found()
        .cookie(session_cookie(token, &config.session, is_prod))
        .cookie(state_cookie(String::new(), is_prod))
        .append_header(("Location", config.public_url.clone()))
        .finish())
}

#[derive(serde::Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: Option<String>,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

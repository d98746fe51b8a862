use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use crate::session::SessionUser;

/// The hosted identity service the console signs in against.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, ConsoleError>;

    /// Resolves a token to its user; `None` once the provider no longer
    /// accepts the token.
    async fn lookup(&self, id_token: &str) -> Result<Option<SessionUser>, ConsoleError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), ConsoleError>;
}

/// REST client for the identity toolkit (`accounts:*` endpoints).
#[derive(Clone, Debug)]
pub struct FirebaseIdentity {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignIn<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

impl FirebaseIdentity {
    pub fn new(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ConsoleError::Config(format!("failed to build identity client: {}", e)))?;
        Ok(Self::with_client(
            client,
            &config.identity_base_url,
            &config.identity_api_key,
        ))
    }

    pub fn with_client(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn call<B: Serialize + Sync>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<reqwest::Response, ConsoleError> {
        let endpoint = format!("accounts:{}", action);
        let url = format!("{}/{}", self.base_url, endpoint);

        self.client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach identity provider ({}): {}", endpoint, e);
                ConsoleError::Network { endpoint, source: e }
            })
    }
}

async fn failure(endpoint: &str, response: reqwest::Response) -> ConsoleError {
    let status = response.status();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    error!("Identity provider {} returned {}: {}", endpoint, status, message);
    ConsoleError::Api {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ConsoleError> {
    let text = response.text().await.map_err(|e| ConsoleError::Network {
        endpoint: endpoint.to_string(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| ConsoleError::Decode {
        endpoint: endpoint.to_string(),
        source: e,
    })
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, ConsoleError> {
        info!("Signing in {}", email);
        let body = PasswordSignIn {
            email,
            password,
            return_secure_token: true,
        };
        let response = self.call("signInWithPassword", &body).await?;
        if !response.status().is_success() {
            return Err(failure("accounts:signInWithPassword", response).await);
        }

        let signed_in: SignInResponse = read_json("accounts:signInWithPassword", response).await?;
        Ok(SessionUser {
            uid: signed_in.local_id,
            email: signed_in.email,
            display_name: signed_in.display_name,
            id_token: signed_in.id_token,
        })
    }

    async fn lookup(&self, id_token: &str) -> Result<Option<SessionUser>, ConsoleError> {
        let response = self.call("lookup", &LookupRequest { id_token }).await?;
        if response.status() == StatusCode::BAD_REQUEST {
            warn!("Identity provider rejected the session token");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(failure("accounts:lookup", response).await);
        }

        let found: LookupResponse = read_json("accounts:lookup", response).await?;
        Ok(found.users.into_iter().next().map(|user| SessionUser {
            uid: user.local_id,
            email: user.email,
            display_name: user.display_name,
            id_token: id_token.to_string(),
        }))
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ConsoleError> {
        info!("Requesting password reset email for {}", email);
        let body = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email,
        };
        let response = self.call("sendOobCode", &body).await?;
        if !response.status().is_success() {
            return Err(failure("accounts:sendOobCode", response).await);
        }
        Ok(())
    }
}

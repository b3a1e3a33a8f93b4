use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::ceremony::wire;
use crate::identity::Identity;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },
    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),
}

/// The four calls a sign-in makes against the relying party.
#[async_trait]
pub trait CeremonyServer: Send + Sync {
    /// The identity the current session is signed in as, if any.
    async fn identity(&self) -> Result<Option<String>, ApiError>;

    /// Ask for a directive for `identity`. The reply is `{ kind, options }`.
    async fn start(&self, identity: &Identity) -> Result<Value, ApiError>;

    async fn register(&self, credential: &wire::RegistrationCredential) -> Result<(), ApiError>;

    async fn login(&self, credential: &wire::AuthenticationCredential) -> Result<(), ApiError>;
}

pub const IDENTITY_ENDPOINT: &str = "identity";
pub const START_ENDPOINT: &str = "ceremony/start";
pub const REGISTER_ENDPOINT: &str = "ceremony/register";
pub const LOGIN_ENDPOINT: &str = "ceremony/login";

#[derive(Serialize)]
struct StartRequest<'a> {
    identity: &'a Identity,
}

/// [`CeremonyServer`] over HTTP. Keeps the session cookie between calls,
/// since the server ties a started ceremony to the session.
pub struct HttpCeremonyServer {
    client: reqwest::Client,
    base: Url,
}

impl HttpCeremonyServer {
    pub fn new(base: Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|source| ApiError::Request { endpoint: "client", source })?;
        Ok(Self::with_client(client, base))
    }

    pub fn with_client(client: reqwest::Client, mut base: Url) -> Self {
        // Url::join replaces the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { client, base }
    }

    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(endpoint)?)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint_url(endpoint)?;
        tracing::debug!(%url, "POST");
        let mut request = self.client.post(url);
        request = match body {
            Some(body) => request.json(body),
            None => request.header(reqwest::header::CONTENT_TYPE, "application/json"),
        };
        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Request { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::debug!(endpoint, error = %e, "Could not read error body");
                String::new()
            });
            tracing::warn!(endpoint, status = status.as_u16(), "Server rejected request");
            return Err(ApiError::Status { endpoint, status: status.as_u16(), body });
        }
        Ok(response)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        self.post(endpoint, body)
            .await?
            .json()
            .await
            .map_err(|source| ApiError::Request { endpoint, source })
    }
}

#[async_trait]
impl CeremonyServer for HttpCeremonyServer {
    async fn identity(&self) -> Result<Option<String>, ApiError> {
        self.post_json::<(), _>(IDENTITY_ENDPOINT, None).await
    }

    async fn start(&self, identity: &Identity) -> Result<Value, ApiError> {
        self.post_json(START_ENDPOINT, Some(&StartRequest { identity })).await
    }

    async fn register(&self, credential: &wire::RegistrationCredential) -> Result<(), ApiError> {
        self.post(REGISTER_ENDPOINT, Some(credential)).await.map(|_| ())
    }

    async fn login(&self, credential: &wire::AuthenticationCredential) -> Result<(), ApiError> {
        self.post(LOGIN_ENDPOINT, Some(credential)).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(base: &str) -> HttpCeremonyServer {
        HttpCeremonyServer::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn test_endpoints_relative_to_root() {
        let s = server("http://localhost:3000");
        assert_eq!(
            s.endpoint_url(START_ENDPOINT).unwrap().as_str(),
            "http://localhost:3000/ceremony/start"
        );
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        // Without the trailing slash "api" would be replaced
        let s = server("https://rp.example/api");
        assert_eq!(
            s.endpoint_url(IDENTITY_ENDPOINT).unwrap().as_str(),
            "https://rp.example/api/identity"
        );
        let s = server("https://rp.example/api/");
        assert_eq!(
            s.endpoint_url(LOGIN_ENDPOINT).unwrap().as_str(),
            "https://rp.example/api/ceremony/login"
        );
    }

    #[test]
    fn test_start_request_body() {
        let identity = Identity::parse("alice").unwrap();
        let body = serde_json::to_value(StartRequest { identity: &identity }).unwrap();
        assert_eq!(body, serde_json::json!({ "identity": "alice" }));
    }
}

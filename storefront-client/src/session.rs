//! Auth session manager
//!
//! Email-code login against the backend auth endpoints. The bearer token
//! lives only in the session-scoped store; the customer record (email and
//! roles) lives in durable storage so a returning visitor is greeted by
//! name before any network call. A 401 on any authenticated request tears
//! the session down and announces it on the event bus.

use serde_json::json;

use shared::client::{AuthCallbackResponse, CustomerInfo, LoginChallenge, LoginRequest, VerifyCodeRequest};

use crate::error::{ClientError, ClientResult};
use crate::events::{AUTH_STATE_CHANGED, EventBus};
use crate::http::HttpClient;
use crate::storage::HostContext;

/// Session-store key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Durable-store key holding the customer record.
pub const CUSTOMER_KEY: &str = "commerce_customer";

/// Owns the bearer token, the customer record, and the 401 teardown
/// policy. All authenticated traffic goes through this type so expiry is
/// handled in one place.
pub struct SessionManager {
    http: HttpClient,
    host: HostContext,
    events: EventBus,
}

impl SessionManager {
    pub fn new(http: HttpClient, host: HostContext, events: EventBus) -> Self {
        Self { http, host, events }
    }

    /// Current bearer token, if a session is live.
    pub fn token(&self) -> Option<String> {
        self.host.session.get(AUTH_TOKEN_KEY)
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    /// Customer record from durable storage. Survives restarts; an
    /// unparsable record reads as absent.
    pub fn customer(&self) -> Option<CustomerInfo> {
        let raw = self.host.durable.get(CUSTOMER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(info) => Some(info),
            Err(error) => {
                tracing::debug!(%error, "discarding unparsable customer record");
                None
            }
        }
    }

    /// Starts a login: the backend emails a code and returns the challenge
    /// the client must echo back on verification.
    pub async fn login(&self, email: &str) -> ClientResult<LoginChallenge> {
        let request = LoginRequest {
            email: email.to_string(),
        };
        self.http.post("/auth/login", &request, None).await
    }

    /// Completes a login with the emailed code and the stored challenge.
    /// On success the token goes to session storage, the customer record
    /// to durable storage, and `auth-state-changed` fires.
    pub async fn verify_code(
        &self,
        email: &str,
        code: &str,
        challenge: &LoginChallenge,
    ) -> ClientResult<CustomerInfo> {
        let request = VerifyCodeRequest {
            email: email.to_string(),
            code: code.to_string(),
            hash: challenge.hash.clone(),
            exp: challenge.exp,
        };
        let response: AuthCallbackResponse = self.http.post("/auth/callback", &request, None).await?;

        let info = CustomerInfo {
            email: response.email,
            roles: response.roles,
        };
        self.host.session.set(AUTH_TOKEN_KEY, &response.token);
        if let Ok(raw) = serde_json::to_string(&info) {
            self.host.durable.set(CUSTOMER_KEY, &raw);
        }
        tracing::info!(email = %info.email, "session established");

        self.events.dispatch(
            AUTH_STATE_CHANGED,
            &json!({"loggedIn": true, "email": info.email}),
        );
        Ok(info)
    }

    /// Voluntary logout. The backend call is best-effort; local state is
    /// cleared regardless of its outcome.
    pub async fn logout(&self) -> ClientResult<()> {
        if let Some(token) = self.token()
            && let Err(error) = self.http.post_empty("/auth/logout", Some(&token)).await
        {
            tracing::warn!(%error, "backend logout failed, clearing local session anyway");
        }
        self.clear_session();
        self.events.dispatch(
            AUTH_STATE_CHANGED,
            &json!({"loggedIn": false, "email": null}),
        );
        Ok(())
    }

    /// Involuntary teardown after the backend rejected our token. Clears
    /// local state and announces the loss with a reason.
    fn expire(&self) -> ClientError {
        tracing::info!("bearer token rejected, tearing down session");
        self.clear_session();
        self.events.dispatch(
            AUTH_STATE_CHANGED,
            &json!({"loggedIn": false, "email": null, "reason": "token_expired"}),
        );
        ClientError::SessionExpired
    }

    fn clear_session(&self) {
        self.host.session.remove(AUTH_TOKEN_KEY);
        self.host.durable.remove(CUSTOMER_KEY);
    }

    /// GET that requires a live session. Fails fast without a token;
    /// a 401 tears the session down.
    pub async fn authed_get<T: serde::de::DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let Some(token) = self.token() else {
            return Err(ClientError::Unauthorized);
        };
        match self.http.get(path, Some(&token)).await {
            Err(ClientError::Unauthorized) => Err(self.expire()),
            other => other,
        }
    }

    /// GET that attaches the token when present but does not require one.
    /// A 401 with a token still means expiry.
    pub async fn get_with_optional_auth<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> ClientResult<T> {
        let token = self.token();
        match self.http.get(path, token.as_deref()).await {
            Err(ClientError::Unauthorized) if token.is_some() => Err(self.expire()),
            other => other,
        }
    }

    /// POST that attaches the token when present but does not require one.
    pub async fn post_with_optional_auth<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize,
    {
        let token = self.token();
        match self.http.post(path, body, token.as_deref()).await {
            Err(ClientError::Unauthorized) if token.is_some() => Err(self.expire()),
            other => other,
        }
    }
}

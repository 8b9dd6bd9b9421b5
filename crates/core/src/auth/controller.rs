//! Login state machine

use std::sync::Arc;

use eventhorizon_common::auth::{AccessToken, SessionId, SessionKey, SessionStore};
use eventhorizon_domain::{ApiMethod, ApiResponse, ClientConfig};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use super::callback::CallbackParams;
use super::error::FlowError;
use crate::ports::{Entropy, ExchangeRequest, OsEntropy, ResourceApi, TokenExchanger};

/// Where a session stands in the login flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    AwaitingCallback,
    Authenticated,
}

/// Result of starting a login: send the user agent to `url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub url: String,
    /// CSRF state embedded in `url`, also kept in the session
    pub state: String,
}

/// Drives one user's session through the Authorization Code + PKCE flow
pub struct AuthFlowController {
    config: Arc<ClientConfig>,
    store: Arc<dyn SessionStore>,
    exchanger: Arc<dyn TokenExchanger>,
    api: Arc<dyn ResourceApi>,
    entropy: Arc<dyn Entropy>,
}

impl AuthFlowController {
    /// Create a controller using the OS random source
    pub fn new(
        config: Arc<ClientConfig>,
        store: Arc<dyn SessionStore>,
        exchanger: Arc<dyn TokenExchanger>,
        api: Arc<dyn ResourceApi>,
    ) -> Self {
        Self { config, store, exchanger, api, entropy: Arc::new(OsEntropy) }
    }

    /// Replace the source of PKCE pairs and state values
    #[must_use]
    pub fn with_entropy(mut self, entropy: Arc<dyn Entropy>) -> Self {
        self.entropy = entropy;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a login attempt.
    ///
    /// Any previous verifier and state are overwritten, and a leftover token
    /// from an earlier lineage is dropped so the session cannot be
    /// authenticated by anything but this attempt's exchange.
    ///
    /// # Errors
    /// `FlowError::Entropy` if no secure randomness is available (nothing is
    /// written to the session in that case), `FlowError::Session` on store
    /// failure.
    #[instrument(skip(self), fields(session = %session))]
    pub async fn begin_login(&self, session: &SessionId) -> Result<LoginRedirect, FlowError> {
        let pair = self.entropy.pkce_pair()?;
        let state = self.entropy.state()?;

        self.store.remove(session, SessionKey::AccessToken).await?;
        self.store.remove(session, SessionKey::ConsumedCode).await?;
        self.store.put(session, SessionKey::CodeVerifier, pair.verifier().to_string()).await?;
        self.store.put(session, SessionKey::OAuthState, state.clone()).await?;

        let url = self.authorization_url(pair.challenge(), &state);
        info!("login started, awaiting callback");

        Ok(LoginRedirect { url, state })
    }

    /// Complete a login from the redirect callback.
    ///
    /// # Errors
    /// Checked in order; only the last step touches the network:
    /// - `StateMismatch` when a pending state exists and differs (nothing is
    ///   discarded)
    /// - `AuthorizationDenied` when the server sent `error` (pending values are
    ///   discarded)
    /// - `MissingCode` when neither `error` nor `code` is present
    /// - `CodeAlreadyConsumed` / `MissingVerifier` when no verifier is pending
    /// - `Exchange` when the token endpoint fails; the attempt is dead since
    ///   the verifier was already consumed
    #[instrument(skip(self, params), fields(session = %session))]
    pub async fn handle_callback(
        &self,
        session: &SessionId,
        params: &CallbackParams,
    ) -> Result<(), FlowError> {
        let pending_state = self.store.get(session, SessionKey::OAuthState).await?;
        if let Some(expected) = &pending_state {
            if params.state.as_deref() != Some(expected.as_str()) {
                warn!("callback state mismatch");
                return Err(FlowError::StateMismatch);
            }
        }

        if let Some(error) = &params.error {
            self.store.remove(session, SessionKey::CodeVerifier).await?;
            self.store.remove(session, SessionKey::OAuthState).await?;
            warn!(error = %error, "authorization server denied the request");
            return Err(FlowError::AuthorizationDenied {
                error: error.clone(),
                description: params.error_description.clone(),
            });
        }

        let code = params.code.as_deref().filter(|code| !code.is_empty()).ok_or(FlowError::MissingCode)?;

        let digest = code_digest(code);
        let Some(verifier) = self.store.take(session, SessionKey::CodeVerifier).await? else {
            let consumed = self.store.get(session, SessionKey::ConsumedCode).await?;
            let authenticated = self.store.get(session, SessionKey::AccessToken).await?.is_some();
            if consumed.as_deref() == Some(digest.as_str()) || authenticated {
                warn!("authorization code delivered twice");
                return Err(FlowError::CodeAlreadyConsumed);
            }
            // The state matched, so another callback took the verifier
            // between the state check and this take.
            if pending_state.is_some() {
                warn!("login attempt redeemed by a concurrent callback");
                return Err(FlowError::CodeAlreadyConsumed);
            }
            warn!("no pending login for callback");
            return Err(FlowError::MissingVerifier);
        };

        self.store.remove(session, SessionKey::OAuthState).await?;
        self.store.put(session, SessionKey::ConsumedCode, digest).await?;

        let request = ExchangeRequest {
            code: code.to_string(),
            verifier,
            redirect_uri: self.config.redirect_uri.clone(),
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.clone(),
            token_endpoint: self.config.token_url(),
        };

        match self.exchanger.exchange(&request).await {
            Ok(token) => {
                self.store.put(session, SessionKey::AccessToken, token.expose().to_string()).await?;
                info!("login completed");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "token exchange failed");
                Err(FlowError::Exchange(err))
            }
        }
    }

    /// Derived from what the store holds for the session
    ///
    /// # Errors
    /// `FlowError::Session` on store failure
    pub async fn session_state(&self, session: &SessionId) -> Result<SessionState, FlowError> {
        if self.store.get(session, SessionKey::AccessToken).await?.is_some() {
            return Ok(SessionState::Authenticated);
        }
        if self.store.get(session, SessionKey::CodeVerifier).await?.is_some() {
            return Ok(SessionState::AwaitingCallback);
        }
        Ok(SessionState::Anonymous)
    }

    /// # Errors
    /// `FlowError::Session` on store failure
    pub async fn access_token(&self, session: &SessionId) -> Result<Option<AccessToken>, FlowError> {
        Ok(self.store.get(session, SessionKey::AccessToken).await?.map(AccessToken::new))
    }

    /// Authenticated call against the resource API
    ///
    /// Statuses other than 401 are returned as `Ok`; interpreting them is up
    /// to the caller.
    ///
    /// # Errors
    /// - `NotAuthenticated` without a token (no request is sent)
    /// - `SessionExpired` on 401; the token is removed from the session
    /// - `Api` on transport or encoding failure
    #[instrument(skip(self, body), fields(session = %session, method = %method, path = %path))]
    pub async fn call(
        &self,
        session: &SessionId,
        method: ApiMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, FlowError> {
        let token = self.access_token(session).await?.ok_or(FlowError::NotAuthenticated)?;

        let response = self.api.call(method, path, body, &token).await?;
        debug!(status = response.status, "API response");

        if response.is_unauthorized() {
            self.store.remove(session, SessionKey::AccessToken).await?;
            warn!("access token rejected, session expired");
            return Err(FlowError::SessionExpired { body: response.body });
        }

        Ok(response)
    }

    /// End the session. Idempotent.
    ///
    /// # Errors
    /// `FlowError::Session` on store failure
    #[instrument(skip(self), fields(session = %session))]
    pub async fn logout(&self, session: &SessionId) -> Result<(), FlowError> {
        self.store.clear(session).await?;
        info!("logged out");
        Ok(())
    }

    fn authorization_url(&self, challenge: &str, state: &str) -> String {
        let base = self.config.authorize_url();
        let separator = if base.contains('?') { '&' } else { '?' };
        format!(
            "{base}{separator}client_id={}&redirect_uri={}&response_type=code&scope={}&code_challenge={}&code_challenge_method={}&state={}",
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&self.config.scope_string()),
            urlencoding::encode(challenge),
            eventhorizon_domain::constants::PKCE_CHALLENGE_METHOD,
            urlencoding::encode(state),
        )
    }
}

/// Session marker for a redeemed code; the raw code is never stored
fn code_digest(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

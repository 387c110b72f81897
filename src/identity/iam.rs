// Copyright 2026 Resalloc IBM Cloud tooling developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! IAM API key authentication.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use log::{debug, error, trace};
use reqwest::{Client, RequestBuilder, Response, Url};
use tokio::sync::RwLock;

use super::protocol::{ApiKeyGrant, TokenResponse};
use super::token_file::api_key_from_token_file;
use super::{API_KEY_GRANT_TYPE, TOKEN_MIN_VALIDITY};
use crate::{Error, ErrorKind, Result};

/// Bearer token with its expiration time.
#[derive(Clone)]
struct Token {
    value: String,
    expires_at: DateTime<Utc>,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut hasher = DefaultHasher::new();
        self.value.hash(&mut hasher);
        write!(
            f,
            "Token {{ value: hash({}), expires_at: {} }}",
            hasher.finish(),
            self.expires_at
        )
    }
}

/// Authentication with an IBM Cloud API key.
///
/// The API key is exchanged for a bearer token on first use. The token is
/// cached and renewed shortly before it expires.
pub struct IamAuth {
    api_key: String,
    token_endpoint: String,
    cached_token: RwLock<Option<Token>>,
}

impl fmt::Debug for IamAuth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("IamAuth")
            .field("token_endpoint", &self.token_endpoint)
            .field("cached_token", &self.cached_token)
            .finish_non_exhaustive()
    }
}

impl IamAuth {
    /// Create an authentication object for the given IAM endpoint.
    pub fn new<S: Into<String>>(iam_url: &str, api_key: S) -> Result<IamAuth> {
        let mut url = Url::parse(iam_url)
            .map_err(|e| Error::new(ErrorKind::InvalidConfig, format!("Invalid iam_url: {}", e)))?;

        let _ = url
            .path_segments_mut()
            .map_err(|_| Error::new(ErrorKind::InvalidConfig, "Invalid iam_url: wrong schema?"))?
            .pop_if_empty()
            .extend(&["identity", "token"]);

        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::new(
                ErrorKind::AuthenticationFailed,
                "The API key is empty",
            ));
        }

        Ok(IamAuth {
            api_key,
            token_endpoint: url.to_string(),
            cached_token: RwLock::new(None),
        })
    }

    /// Create an authentication object with the API key from a token file.
    pub async fn from_token_file<P: AsRef<Path>>(iam_url: &str, path: P) -> Result<IamAuth> {
        let api_key = api_key_from_token_file(path).await?;
        IamAuth::new(iam_url, api_key)
    }

    /// URL used to obtain tokens.
    #[inline]
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    /// Get the bearer token, fetching a new one if needed.
    pub async fn get_token(&self, client: &Client) -> Result<String> {
        self.refresh(client, false).await?;
        match self.cached_token.read().await.as_ref() {
            Some(token) => Ok(token.value.clone()),
            None => Err(Error::new(
                ErrorKind::AuthenticationFailed,
                "No token has been received",
            )),
        }
    }

    /// Refresh the token (if needed or forced).
    pub async fn refresh(&self, client: &Client, force: bool) -> Result<()> {
        if !force && token_alive(&self.cached_token.read().await) {
            return Ok(());
        }

        let mut lock = self.cached_token.write().await;
        if !force && token_alive(&lock) {
            return Ok(());
        }

        debug!("Requesting a new token from {}", self.token_endpoint);
        let resp = client
            .post(&self.token_endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&ApiKeyGrant {
                grant_type: API_KEY_GRANT_TYPE,
                apikey: &self.api_key,
            })
            .send()
            .await?;
        *lock = Some(token_from_response(resp).await?);
        Ok(())
    }

    /// Create an authenticated request.
    pub async fn authenticate(
        &self,
        client: &Client,
        request: RequestBuilder,
    ) -> Result<RequestBuilder> {
        let token = self.get_token(client).await?;
        Ok(request.bearer_auth(token))
    }
}

#[inline]
fn token_alive(token: &impl Deref<Target = Option<Token>>) -> bool {
    if let Some(value) = token.deref() {
        let validity_time_left = value.expires_at.signed_duration_since(Utc::now());
        trace!("Token is valid for {:?}", validity_time_left);
        validity_time_left > Duration::seconds(TOKEN_MIN_VALIDITY)
    } else {
        false
    }
}

async fn token_from_response(resp: Response) -> Result<Token> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        error!("Token request failed with {}: {}", status, body);
        let kind = if status.is_client_error() {
            ErrorKind::AuthenticationFailed
        } else {
            ErrorKind::from_status(status)
        };
        return Err(Error::new_with_details(
            kind,
            Some(status),
            Some(format!("Cannot obtain an IAM token: {}", body)),
        ));
    }

    let root = resp.json::<TokenResponse>().await?;
    if root.access_token.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidResponse,
            "IAM returned an empty access token",
        ));
    }

    let expires_at = root
        .expiration
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .or_else(|| {
            root.expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs))
        })
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidResponse,
                "IAM token response carries no expiration",
            )
        })?;
    debug!("Received a token expiring at {}", expires_at);
    Ok(Token {
        value: root.access_token,
        expires_at,
    })
}

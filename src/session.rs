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

//! Session structure definition.
//!
//! The Session object serves as a wrapper around an HTTP(s) client, handling
//! authentication, API versioning and response status checks.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use log::{debug, trace};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::common::protocol::ErrorResponse;
use super::config::Config;
use super::identity::IamAuth;
use super::{Error, ErrorKind, Result};

/// A VPC API session.
///
/// Owns an authentication object and an underlying client. Clones share
/// the cached token.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    auth: Arc<IamAuth>,
    endpoint: Url,
    api_version: String,
}

impl Session {
    /// Create a new session for the given endpoint.
    ///
    /// The endpoint includes the API version prefix, e.g.
    /// `https://us-east.iaas.cloud.ibm.com/v1`.
    pub fn new<S: Into<String>>(auth: IamAuth, endpoint: &str, api_version: S) -> Result<Session> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Invalid VPC endpoint {}: {}", endpoint, e),
            )
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                format!("Invalid VPC endpoint {}: wrong schema?", endpoint),
            ));
        }

        Ok(Session {
            client: Client::new(),
            auth: Arc::new(auth),
            endpoint,
            api_version: api_version.into(),
        })
    }

    /// Create a session from the configuration and a token file.
    pub async fn from_config<P: AsRef<Path>>(config: &Config, token_file: P) -> Result<Session> {
        let auth = IamAuth::from_token_file(&config.iam_url, token_file).await?;
        Session::new(auth, &config.vpc_endpoint(), config.api_version.clone())
    }

    /// Base endpoint of the session.
    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Authentication in use.
    #[inline]
    pub fn auth(&self) -> &IamAuth {
        &self.auth
    }

    /// Build a URL for the given path.
    pub fn url(&self, path: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        // cannot_be_a_base is rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            let _ = segments.pop_if_empty().extend(path);
        }
        url
    }

    /// Start an authenticated request.
    ///
    /// Adds the `version` and `generation` query parameters required by
    /// the VPC API.
    pub async fn request(&self, method: Method, path: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(path);
        trace!("Sending {} {}", method, url);
        let builder = self
            .client
            .request(method, url)
            .query(&[("version", self.api_version.as_str()), ("generation", "2")]);
        self.auth.authenticate(&self.client, builder).await
    }

    /// Issue a GET request and parse the JSON response (expects HTTP 200).
    pub async fn get_json<Q, T>(&self, path: &[&str], query: &Q) -> Result<T>
    where
        Q: Serialize + Debug + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(Method::GET, path)
            .await?
            .query(query)
            .send()
            .await?;
        let resp = check(resp, StatusCode::OK).await?;
        Ok(resp.json().await?)
    }

    /// Issue a POST request with a JSON body (expects HTTP 201).
    pub async fn post_json<B, T>(&self, path: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(Method::POST, path)
            .await?
            .json(body)
            .send()
            .await?;
        let resp = check(resp, StatusCode::CREATED).await?;
        Ok(resp.json().await?)
    }

    /// Issue a PUT request without a body (expects HTTP 201).
    pub async fn put_empty<T>(&self, path: &[&str]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let resp = self.request(Method::PUT, path).await?.send().await?;
        let resp = check(resp, StatusCode::CREATED).await?;
        Ok(resp.json().await?)
    }

    /// Issue a DELETE request (expects HTTP 204).
    pub async fn delete(&self, path: &[&str]) -> Result<()> {
        let resp = self.request(Method::DELETE, path).await?.send().await?;
        let _ = check(resp, StatusCode::NO_CONTENT).await?;
        Ok(())
    }
}

/// Check that the response has exactly the expected status.
async fn check(resp: Response, expected: StatusCode) -> Result<Response> {
    let status = resp.status();
    if status == expected {
        return Ok(resp);
    }

    let url = resp.url().clone();
    let body = resp.text().await.unwrap_or_default();
    debug!("{} returned {} instead of {}: {}", url, status, expected, body);

    if status.is_success() {
        return Err(Error::new_with_details(
            ErrorKind::InvalidResponse,
            Some(status),
            Some(format!(
                "Unexpected status {} from {}, expected {}",
                status, url, expected
            )),
        ));
    }

    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed.summary(),
        _ => body,
    };
    Err(Error::from_status(status, message))
}

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

//! Common protocol bits.

#![allow(missing_docs)]

use reqwest::Url;
use serde_derive::{Deserialize, Serialize};

use crate::{Error, ErrorKind, Result};

/// Reference to another resource.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Reference {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
}

/// Reference to a zone.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ZoneReference {
    pub name: String,
}

/// Identity of a resource by its ID (used in requests).
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ById {
    pub id: String,
}

/// Identity of a resource by its name (used in requests).
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ByName {
    pub name: String,
}

impl ById {
    pub fn new<S: Into<String>>(id: S) -> ById {
        ById { id: id.into() }
    }
}

impl ByName {
    pub fn new<S: Into<String>>(name: S) -> ByName {
        ByName { name: name.into() }
    }
}

/// Link to the next page of a collection.
#[derive(Clone, Debug, Deserialize)]
pub struct NextLink {
    pub href: String,
}

impl NextLink {
    /// Extract the `start` token from the link.
    pub fn start_token(&self) -> Result<String> {
        let url = Url::parse(&self.href).map_err(|e| {
            Error::new(
                ErrorKind::InvalidResponse,
                format!("Invalid next link {}: {}", self.href, e),
            )
        })?;
        url.query_pairs()
            .find(|(key, _)| key == "start")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidResponse,
                    format!("Next link {} has no start token", self.href),
                )
            })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ErrorItem {
    pub code: String,
    pub message: String,
}

/// Error response body.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorItem>,
    #[serde(default)]
    pub trace: Option<String>,
}

impl ErrorResponse {
    /// Human-readable summary of all errors.
    pub fn summary(&self) -> String {
        let mut result = self
            .errors
            .iter()
            .map(|e| format!("{} ({})", e.message, e.code))
            .collect::<Vec<_>>()
            .join("; ");
        if let Some(ref trace) = self.trace {
            result.push_str(&format!(" [trace {}]", trace));
        }
        result
    }
}

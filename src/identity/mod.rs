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

//! Authentication using IBM Cloud IAM.
//!
//! An API key is read from a token file (a shell snippet exporting
//! `IBMCLOUD_API_KEY`) and exchanged for a short-lived bearer token.

mod iam;
pub(crate) mod protocol;
mod token_file;

pub use self::iam::IamAuth;
pub use self::token_file::{api_key_from_token_file, API_KEY_VARIABLE};

const API_KEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
// Required validity time in seconds. Here we refresh the token if it expires
// in a minute or less.
const TOKEN_MIN_VALIDITY: i64 = 60;

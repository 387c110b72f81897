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

//! Reading API keys from token files.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use log::debug;
use tokio::process::Command;

use crate::{Error, ErrorKind, Result};

/// Variable the token file is expected to set.
pub const API_KEY_VARIABLE: &str = "IBMCLOUD_API_KEY";

const SOURCE_SCRIPT: &str = ". \"$1\" >/dev/null && printf '%s' \"${IBMCLOUD_API_KEY}\"";

/// Source a token file with `sh` and return the API key it sets.
///
/// The token file is a shell snippet, typically
/// `export IBMCLOUD_API_KEY=...`. Anything it prints is discarded.
pub async fn api_key_from_token_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    // `.` looks up bare file names in PATH
    let path = if path.components().count() > 1 || path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(".").join(path)
    };

    debug!("Reading {} from {}", API_KEY_VARIABLE, path.display());
    let output = Command::new("sh")
        .arg("-c")
        .arg(SOURCE_SCRIPT)
        .arg("sh")
        .arg(&path)
        .env_remove(API_KEY_VARIABLE)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .await?;

    if !output.status.success() {
        return Err(Error::new(
            ErrorKind::AuthenticationFailed,
            format!(
                "Cannot source token file {}: {}",
                path.display(),
                output.status
            ),
        ));
    }

    let api_key = String::from_utf8(output.stdout).map_err(|_| {
        Error::new(
            ErrorKind::AuthenticationFailed,
            format!("{} is not valid UTF-8", API_KEY_VARIABLE),
        )
    })?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(Error::new(
            ErrorKind::AuthenticationFailed,
            format!(
                "Token file {} does not set {}",
                path.display(),
                API_KEY_VARIABLE
            ),
        ));
    }

    Ok(api_key.to_string())
}

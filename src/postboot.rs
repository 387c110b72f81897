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

//! Post-boot steps delegated to external executables.

use std::ffi::OsString;
use std::io;
use std::net::IpAddr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

use super::config::InstanceConfig;
use super::{Error, ErrorKind, Result};

/// Steps run against a freshly created instance.
#[async_trait]
pub trait PostBoot: Send + Sync {
    /// Block until SSH on the address is reachable.
    async fn wait_for_ssh(&self, address: IpAddr) -> Result<()>;

    /// Provision the instance with a playbook.
    async fn run_playbook(&self, playbook: &Path, address: IpAddr) -> Result<()>;
}

/// Post-boot steps implemented by external executables.
///
/// The SSH waiter is called as `<command> --timeout <secs> <address>` and
/// the playbook runner as `<runner> <playbook> --inventory <address>,`.
/// Their standard output goes to our standard error, keeping our standard
/// output for the result.
#[derive(Debug, Clone)]
pub struct ExternalCommands {
    wait_for_ssh: String,
    wait_for_ssh_timeout: u64,
    playbook_runner: String,
}

impl ExternalCommands {
    /// Create with explicit executables.
    pub fn new<S1, S2>(wait_for_ssh: S1, wait_for_ssh_timeout: u64, playbook_runner: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        ExternalCommands {
            wait_for_ssh: wait_for_ssh.into(),
            wait_for_ssh_timeout,
            playbook_runner: playbook_runner.into(),
        }
    }

    /// Create from the instance configuration.
    pub fn from_config(config: &InstanceConfig) -> Self {
        ExternalCommands::new(
            config.wait_for_ssh.command.clone(),
            config.wait_for_ssh.timeout,
            config.playbook_runner.clone(),
        )
    }

    fn wait_for_ssh_args(&self, address: IpAddr) -> Vec<OsString> {
        vec![
            "--timeout".into(),
            self.wait_for_ssh_timeout.to_string().into(),
            address.to_string().into(),
        ]
    }

    fn playbook_args(&self, playbook: &Path, address: IpAddr) -> Vec<OsString> {
        vec![
            playbook.as_os_str().to_os_string(),
            "--inventory".into(),
            format!("{},", address).into(),
        ]
    }
}

/// Run a program, failing only if it cannot be started.
async fn run(program: &str, args: Vec<OsString>) -> Result<ExitStatus> {
    debug!("Running {} {:?}", program, args);
    Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(io::stderr())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| {
            Error::new(
                ErrorKind::OperationFailed,
                format!("Cannot run {}: {}", program, e),
            )
        })
}

#[async_trait]
impl PostBoot for ExternalCommands {
    async fn wait_for_ssh(&self, address: IpAddr) -> Result<()> {
        info!("Waiting for SSH on {}", address);
        let status = run(&self.wait_for_ssh, self.wait_for_ssh_args(address)).await?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::new(
                ErrorKind::OperationTimedOut,
                format!(
                    "SSH on {} is not reachable: {} failed: {}",
                    address, self.wait_for_ssh, status
                ),
            ))
        }
    }

    async fn run_playbook(&self, playbook: &Path, address: IpAddr) -> Result<()> {
        info!("Running playbook {} against {}", playbook.display(), address);
        let status = run(&self.playbook_runner, self.playbook_args(playbook, address)).await?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::new(
                ErrorKind::OperationFailed,
                format!("{} failed: {}", self.playbook_runner, status),
            ))
        }
    }
}

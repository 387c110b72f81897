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

//! Configuration file support.
//!
//! The configuration is a YAML file. Everything needed to reach the cloud has
//! a built-in default, so listing works without any file at all. Creating
//! instances requires the `instance` section:
//!
//! ```yaml
//! region: us-east
//! instance:
//!   vpc: r014-vpc-id
//!   ssh_key: r014-key-id
//!   profile: cz2-2x4
//!   image: r014-image-id
//!   playbook: /var/lib/resallocserver/provision/builder.yml
//!   zones:
//!     us-east-1:
//!       subnet: 0757-subnet-id
//!       security_group: r014-sg-id
//!   swap_volume:
//!     capacity: 160
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde_derive::Deserialize;

use super::{Error, ErrorKind, Result};

/// Configuration file used when none is given explicitly.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/resallocserver/ibm-cloud-vm.yaml";

const DEFAULT_REGION: &str = "us-east";
const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";
const DEFAULT_API_VERSION: &str = "2024-04-30";
const DEFAULT_PAGE_LIMIT: usize = 100;
const DEFAULT_DELETE_RETRY_DELAY: u64 = 5;
const DEFAULT_VOLUME_PROFILE: &str = "general-purpose";
const DEFAULT_WAIT_FOR_SSH: &str = "wait-for-ssh";
const DEFAULT_WAIT_FOR_SSH_TIMEOUT: u64 = 240;
const DEFAULT_PLAYBOOK_RUNNER: &str = "ansible-playbook";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Cloud region, used to build the VPC endpoint.
    #[serde(default = "default_region")]
    pub region: String,
    /// Explicit VPC endpoint (including the `/v1` suffix).
    #[serde(default)]
    pub vpc_url: Option<String>,
    /// IAM endpoint used to exchange API keys for tokens.
    #[serde(default = "default_iam_url")]
    pub iam_url: String,
    /// VPC API version date.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Page size for listing calls.
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
    /// Delay between deletion attempts (in seconds).
    #[serde(default = "default_delete_retry_delay")]
    pub delete_retry_delay: u64,
    /// Settings for creating instances.
    #[serde(default)]
    pub instance: Option<InstanceConfig>,
}

/// Settings for creating instances.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceConfig {
    /// VPC ID.
    pub vpc: String,
    /// SSH key ID injected into instances.
    pub ssh_key: String,
    /// Machine profile name.
    pub profile: String,
    /// Resource group ID (the account default if missing).
    #[serde(default)]
    pub resource_group: Option<String>,
    /// Default image ID.
    #[serde(default)]
    pub image: Option<String>,
    /// Default playbook.
    #[serde(default)]
    pub playbook: Option<PathBuf>,
    /// Zones available for new instances.
    pub zones: BTreeMap<String, ZoneConfig>,
    /// Boot volume settings.
    #[serde(default = "default_boot_volume")]
    pub boot_volume: VolumeConfig,
    /// Swap volume settings.
    #[serde(default = "default_swap_volume")]
    pub swap_volume: VolumeConfig,
    /// SSH readiness waiter.
    #[serde(default)]
    pub wait_for_ssh: WaitForSshConfig,
    /// Playbook runner executable.
    #[serde(default = "default_playbook_runner")]
    pub playbook_runner: String,
}

/// Networking of a single zone.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ZoneConfig {
    /// Subnet ID.
    pub subnet: String,
    /// Security group ID.
    pub security_group: String,
}

/// Volume settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct VolumeConfig {
    /// Capacity in GB (the image size for boot volumes if missing).
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Volume profile.
    #[serde(default = "default_volume_profile")]
    pub profile: String,
}

/// SSH readiness waiter settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WaitForSshConfig {
    /// Executable.
    #[serde(default = "default_wait_for_ssh")]
    pub command: String,
    /// Timeout (in seconds) passed to the executable.
    #[serde(default = "default_wait_for_ssh_timeout")]
    pub timeout: u64,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_iam_url() -> String {
    DEFAULT_IAM_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_page_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

fn default_delete_retry_delay() -> u64 {
    DEFAULT_DELETE_RETRY_DELAY
}

fn default_volume_profile() -> String {
    DEFAULT_VOLUME_PROFILE.to_string()
}

fn default_boot_volume() -> VolumeConfig {
    VolumeConfig {
        capacity: None,
        profile: default_volume_profile(),
    }
}

fn default_swap_volume() -> VolumeConfig {
    VolumeConfig {
        capacity: Some(160),
        profile: default_volume_profile(),
    }
}

fn default_wait_for_ssh() -> String {
    DEFAULT_WAIT_FOR_SSH.to_string()
}

fn default_wait_for_ssh_timeout() -> u64 {
    DEFAULT_WAIT_FOR_SSH_TIMEOUT
}

fn default_playbook_runner() -> String {
    DEFAULT_PLAYBOOK_RUNNER.to_string()
}

impl Default for Config {
    fn default() -> Config {
        Config {
            region: default_region(),
            vpc_url: None,
            iam_url: default_iam_url(),
            api_version: default_api_version(),
            page_limit: default_page_limit(),
            delete_retry_delay: default_delete_retry_delay(),
            instance: None,
        }
    }
}

impl Default for WaitForSshConfig {
    fn default() -> WaitForSshConfig {
        WaitForSshConfig {
            command: default_wait_for_ssh(),
            timeout: default_wait_for_ssh_timeout(),
        }
    }
}

impl Config {
    /// Parse configuration from a YAML string.
    pub fn from_yaml<S: AsRef<str>>(source: S) -> Result<Config> {
        let config: Config = serde_yaml::from_str(source.as_ref())?;
        if config.page_limit == 0 {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                "page_limit must be positive",
            ));
        }
        Ok(config)
    }

    /// Read configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        debug!("Reading configuration from {}", path.display());
        let source = fs::read_to_string(path).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot read configuration file {}: {}", path.display(), e),
            )
        })?;
        Config::from_yaml(source)
    }

    /// Load configuration from the given file or from the default location.
    ///
    /// A missing default file results in the built-in defaults, while a
    /// missing explicitly requested file is an error.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Config::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Config::from_file(DEFAULT_CONFIG_PATH)
            }
            None => {
                debug!(
                    "{} does not exist, using the default configuration",
                    DEFAULT_CONFIG_PATH
                );
                Ok(Config::default())
            }
        }
    }

    /// VPC API endpoint.
    pub fn vpc_endpoint(&self) -> String {
        match self.vpc_url {
            Some(ref url) => url.clone(),
            None => format!("https://{}.iaas.cloud.ibm.com/v1", self.region),
        }
    }

    /// Delay between deletion attempts.
    #[inline]
    pub fn delete_retry_delay(&self) -> Duration {
        Duration::from_secs(self.delete_retry_delay)
    }

    /// Settings for creating instances.
    ///
    /// Fails with `InvalidConfig` if the `instance` section is missing.
    pub fn instance(&self) -> Result<&InstanceConfig> {
        self.instance.as_ref().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidConfig,
                "The instance section is required to create instances",
            )
        })
    }
}

impl InstanceConfig {
    /// Networking of the given zone.
    pub fn zone<S: AsRef<str>>(&self, name: S) -> Result<&ZoneConfig> {
        self.zones.get(name.as_ref()).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Zone {} is not configured", name.as_ref()),
            )
        })
    }

    /// Names of all configured zones.
    pub fn zone_names(&self) -> Vec<String> {
        self.zones.keys().cloned().collect()
    }
}

#[cfg(test)]
pub mod test {
    use std::io::Write;
    use std::path::Path;

    use super::Config;
    use crate::ErrorKind;

    pub const INSTANCE_CONFIG: &str = "
instance:
  vpc: vpc-1
  ssh_key: key-1
  profile: cz2-2x4
  resource_group: rg-1
  image: image-1
  playbook: /srv/builder.yml
  zones:
    us-east-1:
      subnet: subnet-1
      security_group: sg-1
    us-east-2:
      subnet: subnet-2
      security_group: sg-2
";

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.region, "us-east");
        assert_eq!(config.vpc_endpoint(), "https://us-east.iaas.cloud.ibm.com/v1");
        assert_eq!(config.iam_url, "https://iam.cloud.ibm.com");
        assert_eq!(config.page_limit, 100);
        assert_eq!(config.delete_retry_delay().as_secs(), 5);
        assert_eq!(
            config.instance().unwrap_err().kind(),
            ErrorKind::InvalidConfig
        );
    }

    #[test]
    fn test_region_and_url() {
        let config = Config::from_yaml("region: eu-de").unwrap();
        assert_eq!(config.vpc_endpoint(), "https://eu-de.iaas.cloud.ibm.com/v1");

        let config = Config::from_yaml("vpc_url: http://127.0.0.1:8080/v1").unwrap();
        assert_eq!(config.vpc_endpoint(), "http://127.0.0.1:8080/v1");
    }

    #[test]
    fn test_zero_page_limit() {
        let err = Config::from_yaml("page_limit: 0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_instance_section() {
        let config = Config::from_yaml(INSTANCE_CONFIG).unwrap();
        let instance = config.instance().unwrap();
        assert_eq!(instance.vpc, "vpc-1");
        assert_eq!(instance.resource_group.as_deref(), Some("rg-1"));
        assert_eq!(instance.playbook.as_deref(), Some(Path::new("/srv/builder.yml")));
        assert_eq!(instance.zone_names(), vec!["us-east-1", "us-east-2"]);
        assert_eq!(instance.zone("us-east-2").unwrap().subnet, "subnet-2");
        assert_eq!(
            instance.zone("us-south-1").unwrap_err().kind(),
            ErrorKind::InvalidConfig
        );
        assert_eq!(instance.boot_volume.capacity, None);
        assert_eq!(instance.swap_volume.capacity, Some(160));
        assert_eq!(instance.swap_volume.profile, "general-purpose");
        assert_eq!(instance.wait_for_ssh.command, "wait-for-ssh");
        assert_eq!(instance.wait_for_ssh.timeout, 240);
        assert_eq!(instance.playbook_runner, "ansible-playbook");
    }

    #[test]
    fn test_instance_section_incomplete() {
        let err = Config::from_yaml("instance:\n  vpc: vpc-1\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"region: jp-tok\n").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.region, "jp-tok");
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/ibm-cloud-vm.yaml"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}

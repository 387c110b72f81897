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

//! Cloud API.

use std::path::Path;

use async_trait::async_trait;

use super::config::Config;
use super::session::Session;
use super::vpc::{self, FloatingIp, FloatingIpPrototype, Instance, InstancePrototype, Volume};
use super::Result;

const DEFAULT_PAGE_LIMIT: usize = 100;

/// Operations the lister and the provisioner need from the cloud.
///
/// Implemented by [Cloud](struct.Cloud.html).
#[async_trait]
pub trait VpcApi: Send + Sync {
    /// List all instances.
    async fn list_instances(&self) -> Result<Vec<Instance>>;

    /// List all volumes.
    async fn list_volumes(&self) -> Result<Vec<Volume>>;

    /// List all floating IPs.
    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>>;

    /// Create an instance.
    async fn create_instance(&self, request: &InstancePrototype) -> Result<Instance>;

    /// Delete an instance.
    async fn delete_instance(&self, id: &str) -> Result<()>;

    /// Delete a volume.
    async fn delete_volume(&self, id: &str) -> Result<()>;

    /// Reserve a floating IP bound to a network interface.
    async fn create_floating_ip(&self, request: &FloatingIpPrototype) -> Result<FloatingIp>;

    /// Bind an existing floating IP to a network interface of an instance.
    async fn add_instance_floating_ip(
        &self,
        instance_id: &str,
        network_interface_id: &str,
        floating_ip_id: &str,
    ) -> Result<FloatingIp>;

    /// Release a floating IP.
    async fn delete_floating_ip(&self, id: &str) -> Result<()>;
}

/// IBM Cloud VPC API.
///
/// Provides high-level API for working with the VPC of one region.
#[derive(Debug, Clone)]
pub struct Cloud {
    session: Session,
    page_limit: usize,
}

impl Cloud {
    /// Create a new cloud object with a given session.
    pub fn new(session: Session) -> Cloud {
        Cloud {
            session,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Create a new cloud object from the configuration and a token file.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn cloud() -> resalloc_ibm_cloud::Result<()> {
    /// let config = resalloc_ibm_cloud::Config::load(None)?;
    /// let cloud = resalloc_ibm_cloud::Cloud::from_config(&config, "/etc/ibm-token").await?;
    /// # Ok(()) }
    /// ```
    pub async fn from_config<P: AsRef<Path>>(config: &Config, token_file: P) -> Result<Cloud> {
        let session = Session::from_config(config, token_file).await?;
        Ok(Cloud::new(session).with_page_limit(config.page_limit))
    }

    /// Convert this cloud into one using the given page size for listing.
    pub fn with_page_limit(mut self, page_limit: usize) -> Cloud {
        self.page_limit = page_limit;
        self
    }

    /// Session in use.
    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[async_trait]
impl VpcApi for Cloud {
    async fn list_instances(&self) -> Result<Vec<Instance>> {
        vpc::api::list_instances(&self.session, self.page_limit).await
    }

    async fn list_volumes(&self) -> Result<Vec<Volume>> {
        vpc::api::list_volumes(&self.session, self.page_limit).await
    }

    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>> {
        vpc::api::list_floating_ips(&self.session, self.page_limit).await
    }

    async fn create_instance(&self, request: &InstancePrototype) -> Result<Instance> {
        vpc::api::create_instance(&self.session, request).await
    }

    async fn delete_instance(&self, id: &str) -> Result<()> {
        vpc::api::delete_instance(&self.session, id).await
    }

    async fn delete_volume(&self, id: &str) -> Result<()> {
        vpc::api::delete_volume(&self.session, id).await
    }

    async fn create_floating_ip(&self, request: &FloatingIpPrototype) -> Result<FloatingIp> {
        vpc::api::create_floating_ip(&self.session, request).await
    }

    async fn add_instance_floating_ip(
        &self,
        instance_id: &str,
        network_interface_id: &str,
        floating_ip_id: &str,
    ) -> Result<FloatingIp> {
        vpc::api::add_instance_floating_ip(
            &self.session,
            instance_id,
            network_interface_id,
            floating_ip_id,
        )
        .await
    }

    async fn delete_floating_ip(&self, id: &str) -> Result<()> {
        vpc::api::delete_floating_ip(&self.session, id).await
    }
}

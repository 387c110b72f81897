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

//! Provisioning: creating and deleting VMs.

mod create;
mod delete;

pub use self::create::{build_instance_prototype, choose_zone, create_vm, CreateRequest};
pub use self::delete::{
    delete_free_floating_ips, delete_vm, find_vm_resources, VmResources, DELETE_ATTEMPTS,
};

#[cfg(test)]
pub mod test {
    #![allow(unused_results)]

    use std::collections::HashSet;
    use std::net::IpAddr;
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::cloud::VpcApi;
    use crate::config::{test::INSTANCE_CONFIG, Config, InstanceConfig};
    use crate::postboot::PostBoot;
    use crate::vpc::{FloatingIp, FloatingIpPrototype, Instance, InstancePrototype, Volume};
    use crate::{Error, ErrorKind, Result};

    /// Instance configuration used across tests.
    pub fn instance_config() -> InstanceConfig {
        Config::from_yaml(INSTANCE_CONFIG)
            .unwrap()
            .instance
            .unwrap()
    }

    fn instance(id: &str, name: &str) -> Instance {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "status": "running",
            "zone": {"name": "us-east-1"},
            "primary_network_interface": {"id": format!("nic-{}", id), "name": "eth0"},
        }))
        .unwrap()
    }

    fn floating_ip(id: &str, name: &str, address: &str, status: &str) -> FloatingIp {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "address": address,
            "status": status,
        }))
        .unwrap()
    }

    fn server_error() -> Error {
        Error::new(ErrorKind::InternalServerError, "injected failure")
    }

    /// In-memory cloud recording every call.
    #[derive(Debug, Default)]
    pub struct MockApi {
        instances: Vec<Instance>,
        volumes: Vec<Volume>,
        floating_ips: Vec<FloatingIp>,
        missing: HashSet<String>,
        fail_lists: bool,
        fail_create_instance: bool,
        fail_create_floating_ip: bool,
        fail_deletes: bool,
        calls: Mutex<Vec<String>>,
    }

    impl MockApi {
        pub fn new() -> MockApi {
            MockApi::default()
        }

        pub fn with_instance(mut self, id: &str, name: &str) -> MockApi {
            self.instances.push(instance(id, name));
            self
        }

        pub fn with_volume(mut self, id: &str, name: &str, status: &str) -> MockApi {
            self.volumes.push(
                serde_json::from_value(json!({"id": id, "name": name, "status": status}))
                    .unwrap(),
            );
            self
        }

        pub fn with_floating_ip(
            mut self,
            id: &str,
            name: &str,
            address: &str,
            status: &str,
        ) -> MockApi {
            self.floating_ips
                .push(floating_ip(id, name, address, status));
            self
        }

        /// Deleting this resource reports it as not found.
        pub fn missing_resource(mut self, id: &str) -> MockApi {
            self.missing.insert(id.to_string());
            self
        }

        pub fn failing_lists(mut self) -> MockApi {
            self.fail_lists = true;
            self
        }

        pub fn failing_create_instance(mut self) -> MockApi {
            self.fail_create_instance = true;
            self
        }

        pub fn failing_create_floating_ip(mut self) -> MockApi {
            self.fail_create_floating_ip = true;
            self
        }

        pub fn failing_deletes(mut self) -> MockApi {
            self.fail_deletes = true;
            self
        }

        /// All calls made so far.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// Number of calls starting with the prefix.
        pub fn count(&self, prefix: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.starts_with(prefix))
                .count()
        }

        fn record<S: Into<String>>(&self, call: S) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn list<T: Clone>(&self, call: &str, items: &[T]) -> Result<Vec<T>> {
            self.record(call);
            if self.fail_lists {
                Err(server_error())
            } else {
                Ok(items.to_vec())
            }
        }

        fn delete(&self, kind: &str, id: &str) -> Result<()> {
            self.record(format!("delete_{} {}", kind, id));
            if self.missing.contains(id) {
                Err(Error::new(ErrorKind::ResourceNotFound, "already gone"))
            } else if self.fail_deletes {
                Err(server_error())
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl VpcApi for MockApi {
        async fn list_instances(&self) -> Result<Vec<Instance>> {
            self.list("list_instances", &self.instances)
        }

        async fn list_volumes(&self) -> Result<Vec<Volume>> {
            self.list("list_volumes", &self.volumes)
        }

        async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>> {
            self.list("list_floating_ips", &self.floating_ips)
        }

        async fn create_instance(&self, request: &InstancePrototype) -> Result<Instance> {
            self.record(format!(
                "create_instance {} {}",
                request.name, request.zone.name
            ));
            if self.fail_create_instance {
                Err(server_error())
            } else {
                Ok(instance("new-instance", &request.name))
            }
        }

        async fn delete_instance(&self, id: &str) -> Result<()> {
            self.delete("instance", id)
        }

        async fn delete_volume(&self, id: &str) -> Result<()> {
            self.delete("volume", id)
        }

        async fn create_floating_ip(&self, request: &FloatingIpPrototype) -> Result<FloatingIp> {
            self.record(format!(
                "create_floating_ip {} {}",
                request.name, request.target.id
            ));
            if self.fail_create_floating_ip {
                Err(server_error())
            } else {
                Ok(floating_ip("new-fip", &request.name, "169.254.10.10", "pending"))
            }
        }

        async fn add_instance_floating_ip(
            &self,
            instance_id: &str,
            network_interface_id: &str,
            floating_ip_id: &str,
        ) -> Result<FloatingIp> {
            self.record(format!(
                "add_instance_floating_ip {} {} {}",
                instance_id, network_interface_id, floating_ip_id
            ));
            self.floating_ips
                .iter()
                .find(|fip| fip.id == floating_ip_id)
                .cloned()
                .ok_or_else(|| Error::new(ErrorKind::ResourceNotFound, "no such floating IP"))
        }

        async fn delete_floating_ip(&self, id: &str) -> Result<()> {
            self.delete("floating_ip", id)
        }
    }

    /// Post-boot steps recording their calls.
    #[derive(Debug, Default)]
    pub struct MockPostBoot {
        fail_ssh: bool,
        fail_playbook: bool,
        calls: Mutex<Vec<String>>,
    }

    impl MockPostBoot {
        pub fn new() -> MockPostBoot {
            MockPostBoot::default()
        }

        pub fn failing_ssh(mut self) -> MockPostBoot {
            self.fail_ssh = true;
            self
        }

        pub fn failing_playbook(mut self) -> MockPostBoot {
            self.fail_playbook = true;
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, prefix: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.starts_with(prefix))
                .count()
        }
    }

    #[async_trait]
    impl PostBoot for MockPostBoot {
        async fn wait_for_ssh(&self, address: IpAddr) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("wait_for_ssh {}", address));
            if self.fail_ssh {
                Err(Error::new(ErrorKind::OperationTimedOut, "no SSH"))
            } else {
                Ok(())
            }
        }

        async fn run_playbook(&self, playbook: &Path, address: IpAddr) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("run_playbook {} {}", playbook.display(), address));
            if self.fail_playbook {
                Err(Error::new(ErrorKind::OperationFailed, "playbook failed"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_create_floating_ip_fails_cleans_up() {
        let config = instance_config();
        let api = MockApi::new().failing_create_floating_ip();
        let post_boot = MockPostBoot::new();
        let request = super::CreateRequest::new("vm_1", &config);

        let err = super::create_vm(&api, &post_boot, &config, &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalServerError);
        assert_eq!(api.count("delete_instance new-instance"), 1);
        assert!(post_boot.calls().is_empty());
    }
}

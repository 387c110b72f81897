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

//! Creating instances.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use rand::seq::IndexedRandom;

use crate::cloud::VpcApi;
use crate::config::{InstanceConfig, VolumeConfig};
use crate::names::{to_cloud_name, volume_name, VolumeRole};
use crate::postboot::PostBoot;
use crate::vpc::{
    ById, ByName, FloatingIpPrototype, Instance, InstancePrototype, NetworkInterfacePrototype,
    VolumeAttachmentPrototype, VolumePrototype,
};
use crate::{Error, ErrorKind, Result};

const NETWORK_INTERFACE_NAME: &str = "eth0";

/// A request to create a new VM.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    name: String,
    playbook: Option<PathBuf>,
    image: Option<String>,
    zones: Vec<String>,
    floating_ip_name: Option<String>,
}

impl CreateRequest {
    /// Start a request with the defaults from the configuration.
    ///
    /// The name is in the Resalloc convention.
    pub fn new<S: Into<String>>(name: S, config: &InstanceConfig) -> CreateRequest {
        CreateRequest {
            name: name.into(),
            playbook: config.playbook.clone(),
            image: config.image.clone(),
            zones: config.zone_names(),
            floating_ip_name: None,
        }
    }

    /// Use the given playbook.
    pub fn with_playbook<P: Into<PathBuf>>(mut self, playbook: P) -> Self {
        self.playbook = Some(playbook.into());
        self
    }

    /// Boot from the given image.
    pub fn with_image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Pick a zone from the given list instead of all configured zones.
    ///
    /// An empty list keeps the current zones.
    pub fn with_zones(mut self, zones: Vec<String>) -> Self {
        if !zones.is_empty() {
            self.zones = zones;
        }
        self
    }

    /// Bind an existing floating IP instead of reserving a new one.
    pub fn with_floating_ip_name<S: Into<String>>(mut self, name: S) -> Self {
        self.floating_ip_name = Some(name.into());
        self
    }

    /// Name in the Resalloc convention.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zones to pick from.
    #[inline]
    pub fn zones(&self) -> &[String] {
        &self.zones
    }
}

/// Pick one of the zones at random.
pub fn choose_zone(zones: &[String]) -> Result<&str> {
    zones
        .choose(&mut rand::rng())
        .map(String::as_str)
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "No zones to create the instance in"))
}

fn attached_volume(
    instance_name: &str,
    role: VolumeRole,
    config: &VolumeConfig,
) -> VolumeAttachmentPrototype {
    VolumeAttachmentPrototype {
        delete_volume_on_instance_delete: true,
        volume: VolumePrototype {
            name: volume_name(instance_name, role),
            capacity: config.capacity,
            profile: ByName::new(config.profile.clone()),
        },
    }
}

/// Build the instance creation request.
///
/// `name` is the cloud name of the instance.
pub fn build_instance_prototype(
    config: &InstanceConfig,
    name: &str,
    image: &str,
    zone: &str,
) -> Result<InstancePrototype> {
    let zone_config = config.zone(zone)?;
    Ok(InstancePrototype {
        name: name.to_string(),
        keys: vec![ById::new(config.ssh_key.clone())],
        profile: ByName::new(config.profile.clone()),
        vpc: ById::new(config.vpc.clone()),
        resource_group: config.resource_group.clone().map(ById::new),
        image: ById::new(image),
        zone: ByName::new(zone),
        boot_volume_attachment: attached_volume(name, VolumeRole::Root, &config.boot_volume),
        primary_network_interface: NetworkInterfacePrototype {
            name: NETWORK_INTERFACE_NAME.to_string(),
            subnet: ById::new(zone_config.subnet.clone()),
            security_groups: vec![ById::new(zone_config.security_group.clone())],
        },
        volume_attachments: vec![attached_volume(name, VolumeRole::Swap, &config.swap_volume)],
    })
}

/// Create a VM, give it a public address and provision it.
///
/// Returns the public address. If anything fails after the instance has
/// been created, the instance is deleted before the error is returned.
pub async fn create_vm<A, P>(
    api: &A,
    post_boot: &P,
    config: &InstanceConfig,
    request: &CreateRequest,
) -> Result<IpAddr>
where
    A: VpcApi + ?Sized,
    P: PostBoot + ?Sized,
{
    let playbook = request
        .playbook
        .as_deref()
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "No playbook given"))?;
    let image = request
        .image
        .as_deref()
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "No image given"))?;
    let zone = choose_zone(&request.zones)?;
    let name = to_cloud_name(&request.name);

    let prototype = build_instance_prototype(config, &name, image, zone)?;
    info!("Creating instance {} in zone {}", name, zone);
    let instance = api.create_instance(&prototype).await?;
    info!("Instance {} created with ID {}", name, instance.id);

    match finish_instance(api, post_boot, &instance, playbook, request.floating_ip_name.as_deref())
        .await
    {
        Ok(address) => {
            info!("Instance {} is ready at {}", name, address);
            Ok(address)
        }
        Err(err) => {
            error!("Failed to set up instance {}: {}", name, err);
            warn!("Deleting instance {} ({})", name, instance.id);
            if let Err(cleanup_err) = api.delete_instance(&instance.id).await {
                error!(
                    "Failed to delete instance {} ({}): {}",
                    name, instance.id, cleanup_err
                );
            }
            Err(err)
        }
    }
}

async fn finish_instance<A, P>(
    api: &A,
    post_boot: &P,
    instance: &Instance,
    playbook: &Path,
    floating_ip_name: Option<&str>,
) -> Result<IpAddr>
where
    A: VpcApi + ?Sized,
    P: PostBoot + ?Sized,
{
    let interface = instance.floating_ip_interface().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidResponse,
            format!("Instance {} has no network interface", instance.id),
        )
    })?;

    let address = match floating_ip_name {
        Some(fip_name) => bind_floating_ip(api, instance, &interface.id, fip_name).await?,
        None => reserve_floating_ip(api, instance, &interface.id).await?,
    };

    post_boot.wait_for_ssh(address).await?;
    post_boot.run_playbook(playbook, address).await?;
    Ok(address)
}

async fn bind_floating_ip<A>(
    api: &A,
    instance: &Instance,
    interface_id: &str,
    fip_name: &str,
) -> Result<IpAddr>
where
    A: VpcApi + ?Sized,
{
    let fip_name = to_cloud_name(fip_name);
    let fip = api
        .list_floating_ips()
        .await?
        .into_iter()
        .find(|fip| fip.name == fip_name)
        .ok_or_else(|| {
            Error::new(
                ErrorKind::ResourceNotFound,
                format!("Floating IP {} was not found", fip_name),
            )
        })?;

    if !fip.is_free() {
        return Err(Error::new(
            ErrorKind::Conflict,
            format!(
                "Floating IP {} ({}) is already in use, status {}",
                fip_name, fip.address, fip.status
            ),
        ));
    }

    info!("Binding floating IP {} ({}) to {}", fip_name, fip.address, instance.name);
    let bound = api
        .add_instance_floating_ip(&instance.id, interface_id, &fip.id)
        .await?;
    Ok(bound.address)
}

async fn reserve_floating_ip<A>(api: &A, instance: &Instance, interface_id: &str) -> Result<IpAddr>
where
    A: VpcApi + ?Sized,
{
    let request = FloatingIpPrototype {
        name: instance.name.clone(),
        target: ById::new(interface_id),
    };
    let fip = api.create_floating_ip(&request).await?;
    info!("Reserved floating IP {} for {}", fip.address, instance.name);
    Ok(fip.address)
}

#[cfg(test)]
pub mod test {
    use std::net::IpAddr;

    use super::{build_instance_prototype, choose_zone, create_vm, CreateRequest};
    use crate::config::Config;
    use crate::provision::test::{instance_config, MockApi, MockPostBoot};
    use crate::ErrorKind;

    #[test]
    fn test_choose_zone() {
        let zones = vec!["us-east-1".to_string(), "us-east-2".to_string()];
        for _ in 0..20 {
            let zone = choose_zone(&zones).unwrap();
            assert!(zones.iter().any(|z| z == zone));
        }
        assert_eq!(
            choose_zone(&[]).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_build_instance_prototype() {
        let config = instance_config();
        let prototype = build_instance_prototype(&config, "copr-ibm-1", "image-9", "us-east-2")
            .unwrap();
        assert_eq!(prototype.name, "copr-ibm-1");
        assert_eq!(prototype.keys[0].id, "key-1");
        assert_eq!(prototype.profile.name, "cz2-2x4");
        assert_eq!(prototype.vpc.id, "vpc-1");
        assert_eq!(prototype.resource_group.as_ref().unwrap().id, "rg-1");
        assert_eq!(prototype.image.id, "image-9");
        assert_eq!(prototype.zone.name, "us-east-2");
        assert_eq!(prototype.boot_volume_attachment.volume.name, "copr-ibm-1-root");
        assert!(prototype.boot_volume_attachment.delete_volume_on_instance_delete);
        assert_eq!(prototype.primary_network_interface.subnet.id, "subnet-2");
        assert_eq!(
            prototype.primary_network_interface.security_groups[0].id,
            "sg-2"
        );
        assert_eq!(prototype.volume_attachments.len(), 1);
        assert_eq!(prototype.volume_attachments[0].volume.name, "copr-ibm-1-swap");
        assert_eq!(prototype.volume_attachments[0].volume.capacity, Some(160));
    }

    #[test]
    fn test_build_instance_prototype_unknown_zone() {
        let config = instance_config();
        let err = build_instance_prototype(&config, "vm", "image", "eu-de-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_request_defaults() {
        let config = instance_config();
        let request = CreateRequest::new("copr_ibm_1", &config);
        assert_eq!(request.name(), "copr_ibm_1");
        assert_eq!(request.zones(), &["us-east-1", "us-east-2"]);
        let request = request.with_zones(vec![]);
        assert_eq!(request.zones().len(), 2);
        let request = request.with_zones(vec!["us-east-2".to_string()]);
        assert_eq!(request.zones(), &["us-east-2"]);
    }

    #[tokio::test]
    async fn test_create_new_floating_ip() {
        let config = instance_config();
        let api = MockApi::new();
        let post_boot = MockPostBoot::new();
        let request = CreateRequest::new("copr_ibm_1", &config).with_zones(vec!["us-east-1".into()]);

        let address = create_vm(&api, &post_boot, &config, &request).await.unwrap();
        assert_eq!(address, "169.254.10.10".parse::<IpAddr>().unwrap());
        assert_eq!(
            api.calls(),
            vec![
                "create_instance copr-ibm-1 us-east-1",
                "create_floating_ip copr-ibm-1 nic-new-instance",
            ]
        );
        assert_eq!(
            post_boot.calls(),
            vec![
                "wait_for_ssh 169.254.10.10",
                "run_playbook /srv/builder.yml 169.254.10.10",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_existing_floating_ip() {
        let config = instance_config();
        let api = MockApi::new().with_floating_ip("fip-1", "reserved-1", "192.0.2.5", "available");
        let post_boot = MockPostBoot::new();
        let request = CreateRequest::new("copr_ibm_1", &config)
            .with_image("image-2")
            .with_playbook("/srv/other.yml")
            .with_floating_ip_name("reserved_1");

        let address = create_vm(&api, &post_boot, &config, &request).await.unwrap();
        assert_eq!(address, "192.0.2.5".parse::<IpAddr>().unwrap());
        assert_eq!(api.count("add_instance_floating_ip new-instance nic-new-instance fip-1"), 1);
        assert_eq!(api.count("create_floating_ip"), 0);
        assert_eq!(api.count("delete_instance"), 0);
        assert_eq!(post_boot.count("run_playbook /srv/other.yml 192.0.2.5"), 1);
    }

    #[tokio::test]
    async fn test_create_floating_ip_in_use() {
        let config = instance_config();
        let api = MockApi::new().with_floating_ip("fip-1", "reserved-1", "192.0.2.5", "pending");
        let post_boot = MockPostBoot::new();
        let request =
            CreateRequest::new("copr_ibm_1", &config).with_floating_ip_name("reserved-1");

        let err = create_vm(&api, &post_boot, &config, &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(api.count("delete_instance new-instance"), 1);
        assert!(post_boot.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_floating_ip_not_found() {
        let config = instance_config();
        let api = MockApi::new();
        let post_boot = MockPostBoot::new();
        let request =
            CreateRequest::new("copr_ibm_1", &config).with_floating_ip_name("reserved-1");

        let err = create_vm(&api, &post_boot, &config, &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
        assert_eq!(api.count("delete_instance"), 1);
    }

    #[tokio::test]
    async fn test_create_ssh_fails_cleans_up_once() {
        let config = instance_config();
        let api = MockApi::new();
        let post_boot = MockPostBoot::new().failing_ssh();
        let request = CreateRequest::new("copr_ibm_1", &config);

        let err = create_vm(&api, &post_boot, &config, &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationTimedOut);
        assert_eq!(api.count("delete_instance"), 1);
        assert_eq!(post_boot.count("run_playbook"), 0);
    }

    #[tokio::test]
    async fn test_create_playbook_fails_cleanup_fails() {
        let config = instance_config();
        let api = MockApi::new().failing_deletes();
        let post_boot = MockPostBoot::new().failing_playbook();
        let request = CreateRequest::new("copr_ibm_1", &config);

        let err = create_vm(&api, &post_boot, &config, &request).await.unwrap_err();
        // The provisioning error is returned, not the cleanup one
        assert_eq!(err.kind(), ErrorKind::OperationFailed);
        assert_eq!(api.count("delete_instance"), 1);
    }

    #[tokio::test]
    async fn test_create_instance_fails_no_cleanup() {
        let config = instance_config();
        let api = MockApi::new().failing_create_instance();
        let post_boot = MockPostBoot::new();
        let request = CreateRequest::new("copr_ibm_1", &config);

        let err = create_vm(&api, &post_boot, &config, &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalServerError);
        assert_eq!(api.count("delete_instance"), 0);
    }

    #[tokio::test]
    async fn test_create_missing_image() {
        let config = Config::from_yaml(
            "
instance:
  vpc: vpc-1
  ssh_key: key-1
  profile: cz2-2x4
  playbook: /srv/builder.yml
  zones:
    us-east-1: {subnet: subnet-1, security_group: sg-1}
",
        )
        .unwrap();
        let api = MockApi::new();
        let post_boot = MockPostBoot::new();
        let request = CreateRequest::new("vm", config.instance().unwrap());

        let err = create_vm(&api, &post_boot, config.instance().unwrap(), &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(api.calls().is_empty());
    }
}

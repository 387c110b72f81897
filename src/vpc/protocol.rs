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

//! JSON structures and protocol bits for the VPC API.

#![allow(missing_docs)]

use std::net;

use chrono::{DateTime, FixedOffset};
use serde_derive::{Deserialize, Serialize};

use crate::common::protocol::{ById, ByName, NextLink, Reference, ZoneReference};
use crate::common::ResourceCollection;

protocol_enum! {
    #[doc = "Possible instance statuses."]
    enum InstanceStatus {
        Deleting = "deleting",
        Failed = "failed",
        Pending = "pending",
        Restarting = "restarting",
        Running = "running",
        Starting = "starting",
        Stopped = "stopped",
        Stopping = "stopping"
    }
}

protocol_enum! {
    #[doc = "Possible volume statuses."]
    enum VolumeStatus {
        Available = "available",
        Failed = "failed",
        Pending = "pending",
        PendingDeletion = "pending_deletion",
        Unusable = "unusable",
        Updating = "updating"
    }
}

protocol_enum! {
    #[doc = "Possible floating IP statuses."]
    enum FloatingIpStatus {
        Available = "available",
        Deleting = "deleting",
        Failed = "failed",
        Pending = "pending"
    }
}

impl VolumeStatus {
    /// Whether a volume in this status may be deleted.
    #[inline]
    pub fn is_deletable(&self) -> bool {
        matches!(self, VolumeStatus::Available | VolumeStatus::Failed)
    }
}

/// An IP reserved on a subnet.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservedIp {
    pub address: net::IpAddr,
}

/// A network interface reference.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkInterface {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub primary_ip: Option<ReservedIp>,
}

/// An instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    pub id: String,
    pub name: String,
    pub status: InstanceStatus,
    pub zone: ZoneReference,
    #[serde(default)]
    pub primary_network_interface: Option<NetworkInterface>,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl Instance {
    /// The network interface floating IPs get bound to.
    pub fn floating_ip_interface(&self) -> Option<&NetworkInterface> {
        self.primary_network_interface
            .as_ref()
            .or_else(|| self.network_interfaces.first())
    }
}

/// A page of instances.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceCollection {
    pub instances: Vec<Instance>,
    #[serde(default)]
    pub next: Option<NextLink>,
}

/// A volume.
#[derive(Debug, Clone, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub status: VolumeStatus,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub zone: Option<ZoneReference>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
}

/// A page of volumes.
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeCollection {
    pub volumes: Vec<Volume>,
    #[serde(default)]
    pub next: Option<NextLink>,
}

/// A floating IP.
#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    pub name: String,
    pub address: net::IpAddr,
    pub status: FloatingIpStatus,
    #[serde(default)]
    pub target: Option<Reference>,
    #[serde(default)]
    pub zone: Option<ZoneReference>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl FloatingIp {
    /// Whether the floating IP is not bound to anything.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.status == FloatingIpStatus::Available
    }
}

/// A page of floating IPs.
#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIpCollection {
    pub floating_ips: Vec<FloatingIp>,
    #[serde(default)]
    pub next: Option<NextLink>,
}

impl ResourceCollection for InstanceCollection {
    type Item = Instance;

    fn into_parts(self) -> (Vec<Instance>, Option<NextLink>) {
        (self.instances, self.next)
    }
}

impl ResourceCollection for VolumeCollection {
    type Item = Volume;

    fn into_parts(self) -> (Vec<Volume>, Option<NextLink>) {
        (self.volumes, self.next)
    }
}

impl ResourceCollection for FloatingIpCollection {
    type Item = FloatingIp;

    fn into_parts(self) -> (Vec<FloatingIp>, Option<NextLink>) {
        (self.floating_ips, self.next)
    }
}

/// A new volume.
#[derive(Debug, Clone, Serialize)]
pub struct VolumePrototype {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    pub profile: ByName,
}

/// A volume attached on instance creation.
#[derive(Debug, Clone, Serialize)]
pub struct VolumeAttachmentPrototype {
    pub delete_volume_on_instance_delete: bool,
    pub volume: VolumePrototype,
}

/// A network interface created with an instance.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkInterfacePrototype {
    pub name: String,
    pub subnet: ById,
    pub security_groups: Vec<ById>,
}

/// A new instance.
#[derive(Debug, Clone, Serialize)]
pub struct InstancePrototype {
    pub name: String,
    pub keys: Vec<ById>,
    pub profile: ByName,
    pub vpc: ById,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ById>,
    pub image: ById,
    pub zone: ByName,
    pub boot_volume_attachment: VolumeAttachmentPrototype,
    pub primary_network_interface: NetworkInterfacePrototype,
    pub volume_attachments: Vec<VolumeAttachmentPrototype>,
}

/// A new floating IP bound to a network interface.
#[derive(Debug, Clone, Serialize)]
pub struct FloatingIpPrototype {
    pub name: String,
    pub target: ById,
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_instance_deserialize() {
        let instance: Instance = serde_json::from_str(
            r#"{
                "id": "0757_abc",
                "name": "copr-builder-1",
                "status": "running",
                "zone": {"name": "us-east-1", "href": "https://example.com"},
                "created_at": "2026-01-02T10:20:30Z",
                "primary_network_interface": {
                    "id": "0757-nic",
                    "name": "eth0",
                    "primary_ip": {"address": "10.0.0.4"}
                },
                "network_interfaces": [{"id": "0757-nic", "name": "eth0"}],
                "memory": 8
            }"#,
        )
        .unwrap();
        assert_eq!(instance.status, InstanceStatus::Running);
        assert_eq!(instance.zone.name, "us-east-1");
        assert_eq!(instance.floating_ip_interface().unwrap().id, "0757-nic");
        assert!(instance.created_at.is_some());
    }

    #[test]
    fn test_instance_interface_fallback() {
        let instance: Instance = serde_json::from_str(
            r#"{"id": "i", "name": "n", "status": "pending", "zone": {"name": "z"},
                "network_interfaces": [{"id": "nic-2"}]}"#,
        )
        .unwrap();
        assert_eq!(instance.floating_ip_interface().unwrap().id, "nic-2");
    }

    #[test]
    fn test_volume_status() {
        let volume: Volume = serde_json::from_str(
            r#"{"id": "v", "name": "vm-root", "status": "pending_deletion"}"#,
        )
        .unwrap();
        assert_eq!(volume.status, VolumeStatus::PendingDeletion);
        assert!(!volume.status.is_deletable());
        assert!(VolumeStatus::Available.is_deletable());
        assert!(VolumeStatus::Failed.is_deletable());
        assert!(!VolumeStatus::Unknown.is_deletable());
    }

    #[test]
    fn test_floating_ip_deserialize() {
        let fip: FloatingIp = serde_json::from_str(
            r#"{"id": "f", "name": "vm-1", "address": "169.63.1.2", "status": "available",
                "target": null}"#,
        )
        .unwrap();
        assert!(fip.is_free());
        assert_eq!(fip.address.to_string(), "169.63.1.2");
    }

    #[test]
    fn test_instance_prototype_serialize() {
        let prototype = InstancePrototype {
            name: "vm-1".to_string(),
            keys: vec![ById::new("key-1")],
            profile: ByName::new("cz2-2x4"),
            vpc: ById::new("vpc-1"),
            resource_group: None,
            image: ById::new("image-1"),
            zone: ByName::new("us-east-1"),
            boot_volume_attachment: VolumeAttachmentPrototype {
                delete_volume_on_instance_delete: true,
                volume: VolumePrototype {
                    name: "vm-1-root".to_string(),
                    capacity: None,
                    profile: ByName::new("general-purpose"),
                },
            },
            primary_network_interface: NetworkInterfacePrototype {
                name: "eth0".to_string(),
                subnet: ById::new("subnet-1"),
                security_groups: vec![ById::new("sg-1")],
            },
            volume_attachments: vec![],
        };
        let value = serde_json::to_value(&prototype).unwrap();
        assert!(value.get("resource_group").is_none());
        assert!(value["boot_volume_attachment"]["volume"]
            .get("capacity")
            .is_none());
        assert_eq!(value["keys"][0]["id"], "key-1");
        assert_eq!(value["zone"]["name"], "us-east-1");
        assert_eq!(
            value["primary_network_interface"]["security_groups"][0]["id"],
            "sg-1"
        );
    }
}

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

//! VPC API: instances, volumes and floating IPs.

pub mod api;
mod protocol;

pub use crate::common::protocol::{ById, ByName, Reference, ZoneReference};
pub use self::protocol::{
    FloatingIp, FloatingIpPrototype, FloatingIpStatus, Instance, InstancePrototype,
    InstanceStatus, NetworkInterface, NetworkInterfacePrototype, ReservedIp, Volume,
    VolumeAttachmentPrototype, VolumePrototype, VolumeStatus,
};

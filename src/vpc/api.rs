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

//! Foundation bits exposing the VPC API.

use futures::TryStreamExt;
use log::{debug, trace};

use super::protocol::*;
use crate::common::list_resources;
use crate::session::Session;
use crate::Result;

/// Bind a floating IP to a network interface of an instance.
pub async fn add_instance_floating_ip(
    session: &Session,
    instance_id: &str,
    network_interface_id: &str,
    floating_ip_id: &str,
) -> Result<FloatingIp> {
    debug!(
        "Binding floating IP {} to interface {} of instance {}",
        floating_ip_id, network_interface_id, instance_id
    );
    let fip: FloatingIp = session
        .put_empty(&[
            "instances",
            instance_id,
            "network_interfaces",
            network_interface_id,
            "floating_ips",
            floating_ip_id,
        ])
        .await?;
    debug!("Bound floating IP {} ({})", fip.id, fip.address);
    Ok(fip)
}

/// Reserve a floating IP.
pub async fn create_floating_ip(
    session: &Session,
    request: &FloatingIpPrototype,
) -> Result<FloatingIp> {
    debug!("Creating a new floating IP with {:?}", request);
    let fip: FloatingIp = session.post_json(&["floating_ips"], request).await?;
    debug!("Created floating IP {:?}", fip);
    Ok(fip)
}

/// Create an instance.
pub async fn create_instance(session: &Session, request: &InstancePrototype) -> Result<Instance> {
    debug!("Creating a new instance with {:?}", request);
    let instance: Instance = session.post_json(&["instances"], request).await?;
    debug!("Created instance {:?}", instance);
    Ok(instance)
}

/// Release a floating IP.
pub async fn delete_floating_ip<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting floating IP {}", id.as_ref());
    session.delete(&["floating_ips", id.as_ref()]).await?;
    debug!("Floating IP {} was deleted", id.as_ref());
    Ok(())
}

/// Delete an instance.
pub async fn delete_instance<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting instance {}", id.as_ref());
    session.delete(&["instances", id.as_ref()]).await?;
    debug!("Successfully requested deletion of instance {}", id.as_ref());
    Ok(())
}

/// Delete a volume.
pub async fn delete_volume<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting volume {}", id.as_ref());
    session.delete(&["volumes", id.as_ref()]).await?;
    debug!("Successfully requested deletion of volume {}", id.as_ref());
    Ok(())
}

/// List all floating IPs.
pub async fn list_floating_ips(session: &Session, limit: usize) -> Result<Vec<FloatingIp>> {
    trace!("Listing floating IPs");
    let result: Vec<FloatingIp> =
        list_resources::<FloatingIpCollection>(session, &["floating_ips"], limit)
            .try_collect()
            .await?;
    trace!("Received floating IPs: {:?}", result);
    Ok(result)
}

/// List all instances.
pub async fn list_instances(session: &Session, limit: usize) -> Result<Vec<Instance>> {
    trace!("Listing instances");
    let result: Vec<Instance> = list_resources::<InstanceCollection>(session, &["instances"], limit)
        .try_collect()
        .await?;
    trace!("Received instances: {:?}", result);
    Ok(result)
}

/// List all volumes.
pub async fn list_volumes(session: &Session, limit: usize) -> Result<Vec<Volume>> {
    trace!("Listing volumes");
    let result: Vec<Volume> = list_resources::<VolumeCollection>(session, &["volumes"], limit)
        .try_collect()
        .await?;
    trace!("Received volumes: {:?}", result);
    Ok(result)
}

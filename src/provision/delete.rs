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

//! Deleting instances and their leftovers.

use std::time::Duration;

use log::{debug, error, info, warn};

use crate::cloud::VpcApi;
use crate::names::{belongs_to_instance, to_cloud_name};
use crate::{ErrorKind, Result};

/// How many times deleting a VM is attempted.
pub const DELETE_ATTEMPTS: usize = 5;

/// Resources that make up a VM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmResources {
    /// ID of the instance with the exact name.
    pub instance: Option<String>,
    /// ID of the floating IP named after the instance.
    pub floating_ip: Option<String>,
    /// IDs of deletable volumes named after the instance.
    pub volumes: Vec<String>,
}

impl VmResources {
    /// Whether nothing was found.
    pub fn is_empty(&self) -> bool {
        self.instance.is_none() && self.floating_ip.is_none() && self.volumes.is_empty()
    }
}

/// Find resources of a VM by its cloud name.
pub async fn find_vm_resources<A>(api: &A, name: &str) -> Result<VmResources>
where
    A: VpcApi + ?Sized,
{
    let instance = api
        .list_instances()
        .await?
        .into_iter()
        .find(|instance| instance.name == name)
        .map(|instance| instance.id);

    let floating_ip = api
        .list_floating_ips()
        .await?
        .into_iter()
        .find(|fip| belongs_to_instance(&fip.name, name))
        .map(|fip| fip.id);

    let volumes = api
        .list_volumes()
        .await?
        .into_iter()
        .filter(|volume| belongs_to_instance(&volume.name, name))
        .filter(|volume| {
            let deletable = volume.status.is_deletable();
            if !deletable {
                debug!(
                    "Skipping volume {} ({}) in status {}",
                    volume.name, volume.id, volume.status
                );
            }
            deletable
        })
        .map(|volume| volume.id)
        .collect();

    Ok(VmResources {
        instance,
        floating_ip,
        volumes,
    })
}

async fn delete_attempt<A>(api: &A, name: &str) -> Result<()>
where
    A: VpcApi + ?Sized,
{
    let resources = find_vm_resources(api, name).await?;
    if resources.is_empty() {
        info!("Nothing to delete for {}", name);
        return Ok(());
    }

    if let Some(ref id) = resources.instance {
        info!("Deleting instance {} ({})", name, id);
        ignore_not_found(api.delete_instance(id).await, "Instance", id)?;
    }
    if let Some(ref id) = resources.floating_ip {
        info!("Deleting floating IP {} of {}", id, name);
        ignore_not_found(api.delete_floating_ip(id).await, "Floating IP", id)?;
    }
    for id in &resources.volumes {
        info!("Deleting volume {} of {}", id, name);
        ignore_not_found(api.delete_volume(id).await, "Volume", id)?;
    }
    Ok(())
}

/// Treat a resource deleted in the meantime as deleted.
fn ignore_not_found(result: Result<()>, what: &str, id: &str) -> Result<()> {
    match result {
        Err(err) if err.kind() == ErrorKind::ResourceNotFound => {
            debug!("{} {} is already gone", what, id);
            Ok(())
        }
        other => other,
    }
}

/// Delete a VM with its floating IP and volumes.
///
/// `name` is in the Resalloc convention. Deletion is attempted up to
/// [DELETE_ATTEMPTS](constant.DELETE_ATTEMPTS.html) times with `retry_delay`
/// in between. Failures are logged, never returned; the result tells
/// whether the last attempt succeeded.
pub async fn delete_vm<A>(api: &A, name: &str, retry_delay: Duration) -> bool
where
    A: VpcApi + ?Sized,
{
    let name = to_cloud_name(name);
    for attempt in 1..=DELETE_ATTEMPTS {
        match delete_attempt(api, &name).await {
            Ok(()) => return true,
            Err(err) => {
                warn!(
                    "Attempt {}/{} to delete {} failed: {}",
                    attempt, DELETE_ATTEMPTS, name, err
                );
            }
        }

        if attempt < DELETE_ATTEMPTS && !retry_delay.is_zero() {
            tokio::time::sleep(retry_delay).await;
        }
    }

    error!(
        "Giving up deleting {} after {} attempts",
        name, DELETE_ATTEMPTS
    );
    false
}

/// Release all floating IPs that are not bound to anything.
///
/// Floating IPs that vanish in the meantime are skipped. Returns how many
/// floating IPs were deleted.
pub async fn delete_free_floating_ips<A>(api: &A) -> Result<usize>
where
    A: VpcApi + ?Sized,
{
    let mut deleted = 0;
    for fip in api.list_floating_ips().await? {
        if !fip.is_free() {
            continue;
        }

        info!("Deleting free floating IP {} ({})", fip.name, fip.address);
        match api.delete_floating_ip(&fip.id).await {
            Ok(()) => deleted += 1,
            Err(err) if err.kind() == ErrorKind::ResourceNotFound => {
                debug!("Floating IP {} is already gone", fip.id);
            }
            Err(err) => return Err(err),
        }
    }

    info!("Deleted {} free floating IP(s)", deleted);
    Ok(deleted)
}

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

//! Listing resources of a pool.

use std::collections::BTreeSet;

use log::debug;

use super::cloud::VpcApi;
use super::names::{strip_volume_suffix, to_resalloc_name};
use super::Result;

/// Resalloc names of all resources belonging to a pool.
///
/// Names are converted to the Resalloc convention, only those starting with
/// `pool_id` are kept and volume suffixes are stripped, so an instance and
/// its volumes yield a single name.
pub fn filter_pool_names<I, S>(pool_id: &str, names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(to_resalloc_name)
        .filter(|name| name.starts_with(pool_id))
        .map(|name| strip_volume_suffix(&name).to_string())
        .collect()
}

/// Fetch instances and volumes and return the names belonging to a pool.
pub async fn list_pool_resources<A>(api: &A, pool_id: &str) -> Result<BTreeSet<String>>
where
    A: VpcApi + ?Sized,
{
    let instances = api.list_instances().await?;
    let volumes = api.list_volumes().await?;
    debug!(
        "Found {} instance(s) and {} volume(s) in total",
        instances.len(),
        volumes.len()
    );

    let names = instances
        .iter()
        .map(|instance| instance.name.as_str())
        .chain(volumes.iter().map(|volume| volume.name.as_str()));
    Ok(filter_pool_names(pool_id, names))
}

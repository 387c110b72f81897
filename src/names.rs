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

//! Resource naming conventions.
//!
//! Resalloc names resources with underscores, which the cloud does not
//! accept, so names are translated between `_` and `-` at the boundary.
//! Volumes carry the name of their instance plus a suffix.

/// Volume created together with an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeRole {
    /// Boot volume.
    Root,
    /// Extra swap volume.
    Swap,
}

impl VolumeRole {
    /// All roles.
    pub const ALL: [VolumeRole; 2] = [VolumeRole::Root, VolumeRole::Swap];

    /// Name suffix (without a separator).
    pub fn suffix(&self) -> &'static str {
        match self {
            VolumeRole::Root => "root",
            VolumeRole::Swap => "swap",
        }
    }
}

/// Convert a Resalloc name into a name acceptable by the cloud.
pub fn to_cloud_name<S: AsRef<str>>(name: S) -> String {
    name.as_ref().replace('_', "-")
}

/// Convert a cloud name back into the Resalloc convention.
pub fn to_resalloc_name<S: AsRef<str>>(name: S) -> String {
    name.as_ref().replace('-', "_")
}

/// Cloud name of a volume belonging to an instance.
pub fn volume_name<S: AsRef<str>>(instance_name: S, role: VolumeRole) -> String {
    format!("{}-{}", to_cloud_name(instance_name), role.suffix())
}

/// Strip a volume suffix from a name in the Resalloc convention.
///
/// Names without a known suffix are returned unchanged.
pub fn strip_volume_suffix(name: &str) -> &str {
    VolumeRole::ALL
        .iter()
        .find_map(|role| {
            name.strip_suffix(role.suffix())
                .and_then(|rest| rest.strip_suffix('_'))
        })
        .unwrap_or(name)
}

/// Whether a cloud resource name belongs to the given instance.
///
/// Matches the instance name itself and anything derived from it with a
/// `-` separator, so `vm-1` does not claim the resources of `vm-10`.
pub fn belongs_to_instance(resource_name: &str, instance_name: &str) -> bool {
    match resource_name.strip_prefix(instance_name) {
        Some(rest) => rest.is_empty() || rest.starts_with('-'),
        None => false,
    }
}

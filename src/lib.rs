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

//! Resalloc tooling for IBM Cloud VPC virtual machines.
//!
//! Resalloc keeps pools of VMs and calls out to external commands to create,
//! delete and enumerate them. This crate implements these commands for the
//! IBM Cloud VPC.
//!
//! # Features
//!
//! * [IAM authentication](identity/index.html) with an API key sourced from
//!   a shell token file
//! * A minimal [VPC API](vpc/index.html) client over [Session](struct.Session.html)
//! * [Listing](lister/index.html) resources of a pool
//! * [Creating and deleting](provision/index.html) VMs, including cleanup of
//!   free floating IPs
//!
//! # Example
//!
//! ```rust,no_run
//! use resalloc_ibm_cloud::{lister, Cloud, Config};
//!
//! # async fn list() -> resalloc_ibm_cloud::Result<()> {
//! let config = Config::load(None)?;
//! let cloud = Cloud::from_config(&config, "/etc/resallocserver/ibm-token").await?;
//! for name in lister::list_pool_resources(&cloud, "copr_ibm").await? {
//!     println!("{}", name);
//! }
//! # Ok(()) }
//! ```

// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
// Taken from https://github.com/rust-unofficial/patterns/
#![warn(
    missing_debug_implementations,
    missing_docs,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_extern_crates,
    unused_import_braces,
    unused_parens,
    unused_qualifications,
    while_true
)]

#[macro_use]
mod common;

pub mod cloud;
pub mod config;
mod error;
pub mod identity;
pub mod lister;
pub mod names;
pub mod postboot;
pub mod provision;
pub mod session;
pub mod vpc;

pub use crate::cloud::{Cloud, VpcApi};
pub use crate::config::Config;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::session::Session;

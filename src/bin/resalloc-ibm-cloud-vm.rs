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

//! Create and delete IBM Cloud VMs for Resalloc.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::{info, warn, LevelFilter};

use resalloc_ibm_cloud::postboot::ExternalCommands;
use resalloc_ibm_cloud::provision::{
    create_vm, delete_free_floating_ips, delete_vm, CreateRequest,
};
use resalloc_ibm_cloud::{Cloud, Config, Result};

#[derive(Debug, Parser)]
#[command(name = "resalloc-ibm-cloud-vm")]
#[command(about = "Create and delete IBM Cloud VMs for Resalloc", long_about = None)]
#[command(version)]
struct Args {
    /// Shell file defining IBMCLOUD_API_KEY
    #[arg(long, env = "IBMCLOUD_TOKEN_FILE")]
    token_file: PathBuf,

    /// Default log level: off, error, warn, info, debug or trace (also
    /// critical and warning); RUST_LOG takes precedence
    #[arg(long, default_value = "info", value_parser = parse_log_level)]
    log_level: LevelFilter,

    /// Configuration file
    #[arg(long, env = "RESALLOC_IBM_CLOUD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a VM and print its public IP address
    Create {
        /// Resalloc name of the VM
        name: String,

        /// Playbook to provision the VM with
        #[arg(long)]
        playbook: Option<PathBuf>,

        /// Image to boot from
        #[arg(long)]
        image_uuid: Option<String>,

        /// Bind this existing floating IP instead of reserving a new one
        #[arg(long)]
        floating_ip_name: Option<String>,

        /// Comma-separated zones to pick from
        #[arg(long, value_delimiter = ',')]
        zones: Vec<String>,
    },

    /// Delete a VM with its floating IP and volumes
    Delete {
        /// Resalloc name of the VM
        name: String,
    },

    /// Release all floating IPs that are not bound to anything
    DeleteFreeFloatingIps,
}

/// Parse a log level, also accepting the names used by Python logging.
fn parse_log_level(value: &str) -> std::result::Result<LevelFilter, String> {
    match value.to_ascii_lowercase().as_str() {
        "critical" | "fatal" => Ok(LevelFilter::Error),
        "warning" => Ok(LevelFilter::Warn),
        other => other
            .parse()
            .map_err(|_| format!("unknown log level {}", value)),
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Create {
            name,
            playbook,
            image_uuid,
            floating_ip_name,
            zones,
        } => {
            let instance_config = config.instance()?;
            let mut request = CreateRequest::new(name, instance_config).with_zones(zones);
            if let Some(playbook) = playbook {
                request = request.with_playbook(playbook);
            }
            if let Some(image) = image_uuid {
                request = request.with_image(image);
            }
            if let Some(fip_name) = floating_ip_name {
                request = request.with_floating_ip_name(fip_name);
            }

            let cloud = Cloud::from_config(&config, &args.token_file).await?;
            let post_boot = ExternalCommands::from_config(instance_config);
            let address = create_vm(&cloud, &post_boot, instance_config, &request).await?;
            println!("{}", address);
        }
        Command::Delete { name } => {
            let cloud = Cloud::from_config(&config, &args.token_file).await?;
            if !delete_vm(&cloud, &name, config.delete_retry_delay()).await {
                warn!("{} may have left resources behind", name);
            }
        }
        Command::DeleteFreeFloatingIps => {
            let cloud = Cloud::from_config(&config, &args.token_file).await?;
            let count = delete_free_floating_ips(&cloud).await?;
            info!("Released {} floating IP(s)", count);
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    if let Err(err) = run(args).await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

#[cfg(test)]
mod test {
    use clap::Parser;
    use log::LevelFilter;

    use super::{parse_log_level, Args};

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_log_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_log_level("WARNING").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_log_level("warn").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_log_level("CRITICAL").unwrap(), LevelFilter::Error);
        assert_eq!(parse_log_level("off").unwrap(), LevelFilter::Off);
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_args_log_level() {
        let args = Args::try_parse_from([
            "resalloc-ibm-cloud-vm",
            "--token-file",
            "/etc/ibm-token",
            "--log-level",
            "WARNING",
            "delete",
            "copr_ibm_1",
        ])
        .unwrap();
        assert_eq!(args.log_level, LevelFilter::Warn);

        let args = Args::try_parse_from([
            "resalloc-ibm-cloud-vm",
            "--token-file",
            "/etc/ibm-token",
            "delete-free-floating-ips",
        ])
        .unwrap();
        assert_eq!(args.log_level, LevelFilter::Info);
    }
}

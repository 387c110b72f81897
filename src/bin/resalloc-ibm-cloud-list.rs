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

//! List VMs belonging to a Resalloc pool, one name per line.

use std::fmt::Display;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::LevelFilter;

use resalloc_ibm_cloud::{lister, Cloud, Config};

#[derive(Debug, Parser)]
#[command(name = "resalloc-ibm-cloud-list")]
#[command(about = "List IBM Cloud VMs and volumes belonging to a Resalloc pool", long_about = None)]
#[command(version)]
struct Args {
    /// Shell file defining IBMCLOUD_API_KEY
    #[arg(long, env = "IBMCLOUD_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Pool ID, only names starting with it are listed
    #[arg(long, env = "RESALLOC_POOL_ID")]
    pool: Option<String>,

    /// Configuration file
    #[arg(long, env = "RESALLOC_IBM_CLOUD_CONFIG")]
    config: Option<PathBuf>,
}

fn fatal<E: Display>(err: E) -> ! {
    eprintln!("Error: {}", err);
    process::exit(1);
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .init();

    let pool = match args.pool {
        Some(pool) if !pool.is_empty() => pool,
        _ => fatal("pool ID is required, use --pool or RESALLOC_POOL_ID"),
    };
    let token_file = match args.token_file {
        Some(path) => path,
        None => fatal("token file is required, use --token-file or IBMCLOUD_TOKEN_FILE"),
    };

    let config = Config::load(args.config.as_deref()).unwrap_or_else(|e| fatal(e));
    let cloud = Cloud::from_config(&config, &token_file)
        .await
        .unwrap_or_else(|e| fatal(e));
    let names = lister::list_pool_resources(&cloud, &pool)
        .await
        .unwrap_or_else(|e| fatal(e));

    for name in names {
        println!("{}", name);
    }
}

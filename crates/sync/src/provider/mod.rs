// Copyright 2025 RISC Zero, Inc.
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

use crate::provider::zksync::ZkNodeProvider;
use alloy::providers::RootProvider;
use tracing::info;

pub mod zksync;

#[derive(clap::Args, Debug, Clone)]
pub struct ProviderArgs {
    /// Address of the L2 node endpoint to use (eth and zks namespaces required)
    #[clap(long, env)]
    pub l2_rpc_url: String,
    /// Address of the L1 ethereum rpc endpoint to use (eth namespace required)
    #[clap(long, env)]
    pub eth_rpc_url: String,
}

/// Read-only RPC handles for both chains. Cloning shares the underlying connection pools.
#[derive(Clone, Debug)]
pub struct SyncProvider {
    /// Provider for L1 settlement contract calls
    pub l1_provider: RootProvider,
    /// Provider for L2 receipts, proofs and network configuration
    pub l2_provider: ZkNodeProvider,
}

impl SyncProvider {
    pub fn new(args: &ProviderArgs) -> anyhow::Result<Self> {
        info!("Connecting to L2 node at {}", args.l2_rpc_url);
        let l2_provider = ZkNodeProvider::connect(&args.l2_rpc_url)?;
        info!("Connecting to L1 node at {}", args.eth_rpc_url);
        let l1_provider = RootProvider::new_http(args.eth_rpc_url.as_str().try_into()?);

        Ok(Self {
            l1_provider,
            l2_provider,
        })
    }
}

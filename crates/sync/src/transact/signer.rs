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

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, ChainId};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use anyhow::Context;
use std::str::FromStr;

#[derive(clap::Args, Debug, Clone)]
pub struct SenderSignerArgs {
    /// L2 wallet private key of the message sender
    #[clap(long, env)]
    pub sender_key: String,
}

impl From<String> for SenderSignerArgs {
    fn from(sender_key: String) -> Self {
        Self { sender_key }
    }
}

impl SenderSignerArgs {
    pub fn signer(&self, chain_id: Option<ChainId>) -> anyhow::Result<PrivateKeySigner> {
        let signer = PrivateKeySigner::from_str(&self.sender_key)
            .context("PrivateKeySigner::from_str")?;
        Ok(signer.with_chain_id(chain_id))
    }

    pub fn address(&self) -> anyhow::Result<Address> {
        Ok(self.signer(None)?.address())
    }

    pub fn wallet(&self, chain_id: Option<ChainId>) -> anyhow::Result<EthereumWallet> {
        Ok(EthereumWallet::from(self.signer(chain_id)?))
    }
}

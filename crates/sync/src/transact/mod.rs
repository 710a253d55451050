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

pub mod fillers;
pub mod signer;

use alloy::providers::fillers::JoinFill;
use alloy::providers::{Identity, ProviderBuilder};
use fillers::{PremiumExecGasFiller, PremiumFiller};

#[derive(clap::Args, Debug, Clone)]
pub struct TransactArgs {
    /// Execution Gas Fee Premium
    #[clap(long, env, required = false, default_value_t = 25)]
    pub exec_gas_premium: u128,
}

impl TransactArgs {
    pub fn premium_provider(&self) -> ProviderBuilder<Identity, JoinFill<Identity, PremiumFiller>> {
        premium_provider(self.exec_gas_premium)
    }
}

/// A provider builder whose gas prices are marked up by `premium_exec_gas` percent.
pub fn premium_provider(
    premium_exec_gas: u128,
) -> ProviderBuilder<Identity, JoinFill<Identity, PremiumFiller>> {
    ProviderBuilder::default().filler(JoinFill::new(
        PremiumExecGasFiller::with_premium(premium_exec_gas),
        Default::default(),
    ))
}

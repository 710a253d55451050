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

use crate::provider::ProviderArgs;
use crate::telemetry::TelemetryArgs;
use alloy::primitives::{Address, B256};
use std::str::FromStr;

#[derive(clap::Args, Debug, Clone)]
pub struct SyncArgs {
    #[clap(flatten)]
    pub provider: ProviderArgs,

    #[clap(flatten)]
    pub poll: PollArgs,

    #[clap(flatten)]
    pub telemetry: TelemetryArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PollArgs {
    /// Delay in milliseconds before the first re-poll of a pending receipt or proof
    #[clap(long, env, default_value_t = 1_000)]
    pub poll_interval_ms: u64,
    /// Upper bound in milliseconds on the backed-off poll delay
    #[clap(long, env, default_value_t = 30_000)]
    pub max_poll_interval_ms: u64,
    /// Seconds to wait for a receipt, and again for a proof, before giving up
    #[clap(long, env, default_value_t = 7_200)]
    pub max_wait_secs: u64,
}

impl Default for PollArgs {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            max_poll_interval_ms: 30_000,
            max_wait_secs: 7_200,
        }
    }
}

pub fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|_| format!("Invalid Address value: {s}"))
}

pub fn parse_b256(s: &str) -> Result<B256, String> {
    B256::from_str(s).map_err(|_| format!("Invalid B256 value: {s}"))
}

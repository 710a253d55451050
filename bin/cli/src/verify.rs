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

use crate::relay::report;
use crate::MessageArgs;
use alloy::primitives::{Address, B256};
use ferry_common::message::L2TransactionHandle;
use ferry_relayer::source::SettlementProvider;
use ferry_relayer::{PollConfig, Relay};
use ferry_sync::args::{parse_address, parse_b256, SyncArgs};
use ferry_sync::provider::SyncProvider;
use tracing::info;

#[derive(clap::Args, Debug, Clone)]
pub struct VerifyArgs {
    #[arg(long, short, help = "Verbosity level (0-4)", action = clap::ArgAction::Count)]
    pub v: u8,

    #[clap(flatten)]
    pub sync: SyncArgs,

    /// Hash of the L2 transaction that sent the message
    #[clap(long, env, value_parser = parse_b256)]
    pub tx_hash: B256,
    /// L2 account that sent the message
    #[clap(long, env, value_parser = parse_address)]
    pub sender: Address,

    #[clap(flatten)]
    pub message: MessageArgs,
}

pub async fn verify(args: VerifyArgs) -> anyhow::Result<()> {
    let message = args.message.message()?;
    let providers = SyncProvider::new(&args.sync.provider)?;
    let settlement = SettlementProvider(providers.l1_provider.clone());
    let handle = L2TransactionHandle::from(args.tx_hash);
    info!("Verifying message from {} in transaction {handle}.", args.sender);

    let relay = Relay::resume(
        &providers.l2_provider,
        &settlement,
        handle,
        message,
        args.sender,
        PollConfig::from(&args.sync.poll),
    );
    report(relay.run().await?)
}

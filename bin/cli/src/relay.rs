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

use crate::send::messenger_transport;
use crate::MessageArgs;
use anyhow::Context;
use ferry_common::batch::VerificationResult;
use ferry_relayer::source::SettlementProvider;
use ferry_relayer::{PollConfig, Relay, RelayEvent};
use ferry_sync::args::SyncArgs;
use ferry_sync::provider::SyncProvider;
use ferry_sync::transact::signer::SenderSignerArgs;
use ferry_sync::transact::TransactArgs;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(clap::Args, Debug, Clone)]
pub struct RelayArgs {
    #[arg(long, short, help = "Verbosity level (0-4)", action = clap::ArgAction::Count)]
    pub v: u8,

    #[clap(flatten)]
    pub sync: SyncArgs,

    /// L2 wallet to send the message from
    #[clap(flatten)]
    pub sender_signer: SenderSignerArgs,
    /// Transaction publication configuration
    #[clap(flatten)]
    pub txn_args: TransactArgs,

    #[clap(flatten)]
    pub message: MessageArgs,
}

/// Prints the result as json. A rejected message is reported but is not an error.
pub fn report(result: VerificationResult) -> anyhow::Result<()> {
    if result.included {
        info!(
            "Message included in batch {} at position {}.",
            result.batch_number, result.proof_id
        );
    } else {
        warn!(
            "Settlement contract {} rejected the message.",
            result.settlement_contract
        );
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("serde_json::to_string_pretty")?
    );
    Ok(())
}

pub async fn relay(args: RelayArgs) -> anyhow::Result<()> {
    let message = args.message.message()?;
    let providers = SyncProvider::new(&args.sync.provider)?;
    let settlement = SettlementProvider(providers.l1_provider.clone());
    let transport =
        messenger_transport(&args.sync, &args.sender_signer, &args.txn_args, &providers).await?;

    let relay = Relay::submit(
        &transport,
        &providers.l2_provider,
        &settlement,
        message,
        PollConfig::from(&args.sync.poll),
    )
    .await
    .context("Relay::submit")?;

    // Log transitions as they happen
    let (sender, mut receiver) = mpsc::channel(16);
    let logger = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            match event {
                RelayEvent::Submitted(handle) => info!("Submitted: {handle}"),
                RelayEvent::ReceiptResolved(receipt) => info!(
                    "Included in batch {} at index {}",
                    receipt.batch_number, receipt.batch_tx_index
                ),
                RelayEvent::ProofFetched(proof) => info!(
                    "Proof fetched for position {} ({} siblings)",
                    proof.proof_id,
                    proof.depth()
                ),
                RelayEvent::Verified(result) => info!("Verified: {}", result.included),
                RelayEvent::Failed { kind, reason } => error!("Failed ({kind:?}): {reason}"),
            }
        }
    });

    let result = relay.run_with_events(sender).await;
    logger.await.context("logger")?;
    report(result?)
}

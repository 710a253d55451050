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

use crate::MessageArgs;
use alloy::providers::Provider;
use anyhow::Context;
use ferry_relayer::receipt::ReceiptResolver;
use ferry_relayer::sender::MessageSender;
use ferry_relayer::source::MessengerTransport;
use ferry_relayer::PollConfig;
use ferry_sync::args::SyncArgs;
use ferry_sync::provider::SyncProvider;
use ferry_sync::transact::signer::SenderSignerArgs;
use ferry_sync::transact::TransactArgs;
use ferry_sync::await_tel_res;
use opentelemetry::global::tracer;
use opentelemetry::trace::{FutureExt, TraceContextExt, Tracer};
use tracing::info;

#[derive(clap::Args, Debug, Clone)]
pub struct SendArgs {
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

    /// Wait until the transaction is placed in an L1 batch before exiting
    #[clap(long)]
    pub wait: bool,
}

/// A messenger transport signing with the configured sender key on the L2 network.
pub async fn messenger_transport(
    sync: &SyncArgs,
    sender_signer: &SenderSignerArgs,
    txn_args: &TransactArgs,
    providers: &SyncProvider,
) -> anyhow::Result<MessengerTransport<impl Provider>> {
    let tracer = tracer("ferry");
    let context = opentelemetry::Context::current_with_span(tracer.start("messenger_transport"));

    let l2_chain_id = await_tel_res!(
        context,
        tracer,
        "ZkNodeProvider::chain_id",
        providers.l2_provider.chain_id()
    )?;
    let sender_wallet = sender_signer.wallet(Some(l2_chain_id))?;
    let sender_address = sender_signer.address()?;
    info!("Sender address: {sender_address} on chain {l2_chain_id}");

    let provider = txn_args
        .premium_provider()
        .wallet(sender_wallet)
        .connect_http(sync.provider.l2_rpc_url.as_str().try_into()?);
    Ok(MessengerTransport::new(provider, sender_address))
}

pub async fn send(args: SendArgs) -> anyhow::Result<()> {
    let message = args.message.message()?;
    let providers = SyncProvider::new(&args.sync.provider)?;
    let transport =
        messenger_transport(&args.sync, &args.sender_signer, &args.txn_args, &providers).await?;

    let handle = MessageSender::new(&transport)
        .submit(&message)
        .await
        .context("MessageSender::submit")?;
    println!("{handle}");

    if args.wait {
        let receipt = ReceiptResolver::new(&providers.l2_provider)
            .wait_for_inclusion(&handle, &PollConfig::from(&args.sync.poll))
            .await
            .context("ReceiptResolver::wait_for_inclusion")?;
        info!(
            "Transaction {handle} included in batch {} at index {}.",
            receipt.batch_number, receipt.batch_tx_index
        );
    }

    Ok(())
}

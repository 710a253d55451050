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

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::providers::{Provider, RootProvider};
use anyhow::Context;
use async_trait::async_trait;
use ferry_common::batch::L2Receipt;
use ferry_contracts::{IL1Messenger, IMailbox, L2Message, L1_MESSENGER_ADDRESS};
use ferry_sync::await_tel;
use ferry_sync::provider::zksync::{ZkNodeProvider, ZkTransactionReceipt};
use opentelemetry::global::tracer;
use opentelemetry::trace::{FutureExt, TraceContextExt, Tracer};
use std::future::IntoFuture;
use tracing::{debug, info};

/// What the L2 node currently knows about a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptLookup {
    /// The node has never seen the transaction
    Unknown,
    /// Known, but not yet assigned a batch position
    Pending,
    Included(L2Receipt),
}

/// An inclusion path as reported by the L2 node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogProof {
    pub id: u64,
    pub proof: Vec<B256>,
    pub root: B256,
    pub batch_number: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProofLookup {
    /// The containing batch is not sealed yet
    NotReady,
    /// The transaction emitted no log at the requested index
    NoSuchLog,
    Ready(LogProof),
}

/// Submits messages through the L2 messenger system contract.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// The L2 account whose transactions carry the messages.
    fn sender(&self) -> Address;

    async fn send_to_l1(&self, data: Bytes) -> anyhow::Result<TxHash>;
}

/// Read access to L2 receipts, log proofs and network configuration.
#[async_trait]
pub trait L2StateSource: Send + Sync {
    async fn receipt(&self, hash: TxHash) -> anyhow::Result<ReceiptLookup>;

    async fn log_proof(&self, hash: TxHash, log_index: u64) -> anyhow::Result<ProofLookup>;

    /// The L1 contract that stores committed batch roots.
    async fn main_contract(&self) -> anyhow::Result<Address>;

    /// Chain id of the settlement layer, as configured on the L2 node.
    async fn l1_chain_id(&self) -> anyhow::Result<u64>;
}

/// Read access to the settlement contract on L1.
#[async_trait]
pub trait SettlementLayer: Send + Sync {
    async fn chain_id(&self) -> anyhow::Result<u64>;

    async fn prove_l2_message_inclusion(
        &self,
        contract: Address,
        batch_number: u64,
        index: u64,
        message: L2Message,
        proof: Vec<B256>,
    ) -> anyhow::Result<bool>;
}

/// Sends messages as transactions signed by the wallet attached to `provider`.
#[derive(Clone, Debug)]
pub struct MessengerTransport<P> {
    pub provider: P,
    pub sender: Address,
}

impl<P: Provider> MessengerTransport<P> {
    pub fn new(provider: P, sender: Address) -> Self {
        Self { provider, sender }
    }
}

#[async_trait]
impl<P: Provider> MessageTransport for MessengerTransport<P> {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn send_to_l1(&self, data: Bytes) -> anyhow::Result<TxHash> {
        let tracer = tracer("ferry");
        let context = opentelemetry::Context::current_with_span(
            tracer.start("MessengerTransport::send_to_l1"),
        );

        let messenger = IL1Messenger::new(L1_MESSENGER_ADDRESS, &self.provider);
        let pending_txn = await_tel!(
            context,
            tracer,
            "IL1Messenger::sendToL1",
            messenger.sendToL1(data).send()
        )
        .context("IL1Messenger::sendToL1")?;
        info!("Transaction published: {:?}", pending_txn.tx_hash());

        Ok(*pending_txn.tx_hash())
    }
}

/// Index of the messenger's log among the receipt's L2->L1 logs, if the transaction sent one.
pub fn messenger_log_index(receipt: &ZkTransactionReceipt) -> Option<u64> {
    receipt
        .l2_to_l1_logs
        .iter()
        .position(|log| log.sender == L1_MESSENGER_ADDRESS)
        .map(|index| index as u64)
}

/// Converts a node receipt into a batch placement, if the batch position is known.
///
/// Without a messenger log the placement points one past the last log, so proof lookups for
/// it fail with [ProofLookup::NoSuchLog].
pub fn batch_placement(receipt: &ZkTransactionReceipt) -> Option<L2Receipt> {
    let batch_number = receipt.l1_batch_number?;
    let batch_tx_index = receipt.l1_batch_tx_index?;
    let l2_to_l1_log_count = receipt.l2_to_l1_logs.len() as u64;
    Some(L2Receipt {
        batch_number: batch_number.to::<u64>(),
        batch_tx_index: batch_tx_index.to::<u64>(),
        log_index: messenger_log_index(receipt).unwrap_or(l2_to_l1_log_count),
        l2_to_l1_log_count,
        block_number: receipt.block_number.map(|n| n.to::<u64>()),
    })
}

/// Classifies a receipt answer. `transaction_known` tells whether `eth_getTransactionByHash`
/// returned the transaction.
pub fn receipt_lookup(
    receipt: Option<&ZkTransactionReceipt>,
    transaction_known: bool,
) -> ReceiptLookup {
    match receipt.and_then(batch_placement) {
        Some(placement) => ReceiptLookup::Included(placement),
        None if receipt.is_some() || transaction_known => ReceiptLookup::Pending,
        None => ReceiptLookup::Unknown,
    }
}

/// Classifies a null proof answer using the transaction's receipt.
pub fn missing_proof_lookup(
    receipt: Option<&ZkTransactionReceipt>,
    log_index: u64,
) -> ProofLookup {
    match receipt {
        Some(receipt) if log_index >= receipt.l2_to_l1_logs.len() as u64 => {
            ProofLookup::NoSuchLog
        }
        _ => ProofLookup::NotReady,
    }
}

#[async_trait]
impl L2StateSource for ZkNodeProvider {
    async fn receipt(&self, hash: TxHash) -> anyhow::Result<ReceiptLookup> {
        let receipt = self.transaction_receipt(hash).await?;
        let transaction_known = match receipt {
            Some(_) => true,
            None => self.transaction_exists(hash).await?,
        };
        Ok(receipt_lookup(receipt.as_ref(), transaction_known))
    }

    async fn log_proof(&self, hash: TxHash, log_index: u64) -> anyhow::Result<ProofLookup> {
        let Some(proof) = ZkNodeProvider::log_proof(self, hash, log_index).await? else {
            // null for both unsealed batches and missing logs
            let receipt = self.transaction_receipt(hash).await?;
            return Ok(missing_proof_lookup(receipt.as_ref(), log_index));
        };
        Ok(ProofLookup::Ready(LogProof {
            id: proof.id,
            proof: proof.proof,
            root: proof.root,
            batch_number: proof.batch_number,
        }))
    }

    async fn main_contract(&self) -> anyhow::Result<Address> {
        ZkNodeProvider::main_contract(self).await
    }

    async fn l1_chain_id(&self) -> anyhow::Result<u64> {
        ZkNodeProvider::l1_chain_id(self).await
    }
}

/// Read-only calls against the L1 settlement contract.
#[derive(Clone, Debug)]
pub struct SettlementProvider(pub RootProvider);

#[async_trait]
impl SettlementLayer for SettlementProvider {
    async fn chain_id(&self) -> anyhow::Result<u64> {
        self.0.get_chain_id().await.context("eth_chainId")
    }

    async fn prove_l2_message_inclusion(
        &self,
        contract: Address,
        batch_number: u64,
        index: u64,
        message: L2Message,
        proof: Vec<B256>,
    ) -> anyhow::Result<bool> {
        let tracer = tracer("ferry");
        let context = opentelemetry::Context::current_with_span(
            tracer.start("SettlementProvider::prove_l2_message_inclusion"),
        );

        let mailbox = IMailbox::new(contract, &self.0);
        let included = await_tel!(
            context,
            tracer,
            "IMailbox::proveL2MessageInclusion",
            mailbox
                .proveL2MessageInclusion(
                    U256::from(batch_number),
                    U256::from(index),
                    message,
                    proof
                )
                .call()
                .into_future()
        )
        .context("IMailbox::proveL2MessageInclusion")?;
        debug!("proveL2MessageInclusion({batch_number}, {index}) = {included}");

        Ok(included)
    }
}

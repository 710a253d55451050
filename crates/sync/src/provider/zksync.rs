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

use crate::await_tel;
use alloy::primitives::{Address, TxHash, B256, U64};
use alloy::providers::{Provider, RootProvider};
use anyhow::Context;
use opentelemetry::global::tracer;
use opentelemetry::trace::{FutureExt, TraceContextExt, Tracer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// An L2->L1 log entry as listed in a zkSync transaction receipt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZkL2ToL1Log {
    /// System contract that emitted the log
    pub sender: Address,
}

/// The subset of a zkSync receipt needed to place a transaction within its batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZkTransactionReceipt {
    pub transaction_hash: TxHash,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// Unset until the sequencer seals the batch
    #[serde(default)]
    pub l1_batch_number: Option<U64>,
    #[serde(default)]
    pub l1_batch_tx_index: Option<U64>,
    #[serde(default)]
    pub l2_to_l1_logs: Vec<ZkL2ToL1Log>,
}

/// Response of `zks_getL2ToL1LogProof`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkLogProof {
    /// Sibling hashes, leaf to root
    pub proof: Vec<B256>,
    /// Leaf position
    pub id: u64,
    pub root: B256,
    #[serde(default, alias = "batchNumber")]
    pub batch_number: Option<u64>,
}

/// Queries against the `zks` and `eth` namespaces of a zkSync-flavoured L2 node.
#[derive(Clone, Debug)]
pub struct ZkNodeProvider(pub RootProvider);

impl ZkNodeProvider {
    pub fn connect(url: &str) -> anyhow::Result<Self> {
        Ok(Self(RootProvider::new_http(url.try_into()?)))
    }

    pub async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> anyhow::Result<Option<ZkTransactionReceipt>> {
        let tracer = tracer("ferry");
        let context = opentelemetry::Context::current_with_span(
            tracer.start("ZkNodeProvider::transaction_receipt"),
        );

        let receipt: Option<ZkTransactionReceipt> = await_tel!(
            context,
            tracer,
            "eth_getTransactionReceipt",
            self.0
                .client()
                .request("eth_getTransactionReceipt", (hash,))
        )
        .context(format!("eth_getTransactionReceipt {hash}"))?;
        debug!("Receipt for {hash}: {receipt:?}");

        Ok(receipt)
    }

    /// Whether the node knows the transaction at all, mined or not.
    pub async fn transaction_exists(&self, hash: TxHash) -> anyhow::Result<bool> {
        let tracer = tracer("ferry");
        let context = opentelemetry::Context::current_with_span(
            tracer.start("ZkNodeProvider::transaction_exists"),
        );

        let transaction: Option<Value> = await_tel!(
            context,
            tracer,
            "eth_getTransactionByHash",
            self.0
                .client()
                .request("eth_getTransactionByHash", (hash,))
        )
        .context(format!("eth_getTransactionByHash {hash}"))?;

        Ok(transaction.is_some_and(|tx| !tx.is_null()))
    }

    /// Returns `None` while the containing batch is not yet sealed, or if the log does not exist.
    pub async fn log_proof(
        &self,
        hash: TxHash,
        log_index: u64,
    ) -> anyhow::Result<Option<ZkLogProof>> {
        let tracer = tracer("ferry");
        let context =
            opentelemetry::Context::current_with_span(tracer.start("ZkNodeProvider::log_proof"));

        let proof: Option<ZkLogProof> = await_tel!(
            context,
            tracer,
            "zks_getL2ToL1LogProof",
            self.0
                .client()
                .request("zks_getL2ToL1LogProof", (hash, log_index))
        )
        .context(format!("zks_getL2ToL1LogProof {hash} {log_index}"))?;
        debug!("Log proof for {hash}/{log_index}: {proof:?}");

        Ok(proof)
    }

    /// Address of the L1 contract holding this network's committed batch roots.
    pub async fn main_contract(&self) -> anyhow::Result<Address> {
        let tracer = tracer("ferry");
        let context = opentelemetry::Context::current_with_span(
            tracer.start("ZkNodeProvider::main_contract"),
        );

        Ok(await_tel!(
            context,
            tracer,
            "zks_getMainContract",
            self.0.client().request_noparams("zks_getMainContract")
        )
        .context("zks_getMainContract")?)
    }

    /// Chain id of the L1 network this L2 settles to.
    pub async fn l1_chain_id(&self) -> anyhow::Result<u64> {
        let tracer = tracer("ferry");
        let context = opentelemetry::Context::current_with_span(
            tracer.start("ZkNodeProvider::l1_chain_id"),
        );

        let chain_id: U64 = await_tel!(
            context,
            tracer,
            "zks_L1ChainId",
            self.0.client().request_noparams("zks_L1ChainId")
        )
        .context("zks_L1ChainId")?;

        Ok(chain_id.to::<u64>())
    }

    pub async fn chain_id(&self) -> anyhow::Result<u64> {
        self.0.get_chain_id().await.context("eth_chainId")
    }
}

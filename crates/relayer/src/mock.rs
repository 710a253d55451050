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

//! A single-process rollup that sequences, batches and settles messages in memory.

use crate::source::{
    L2StateSource, LogProof, MessageTransport, ProofLookup, ReceiptLookup, SettlementLayer,
};
use alloy::primitives::{address, keccak256, Address, Bytes, TxHash, B256};
use anyhow::bail;
use async_trait::async_trait;
use ferry_common::batch::L2Receipt;
use ferry_common::merkle::{compute_root, LogMerkleTree};
use ferry_common::message::{L2MessageRecord, L2TransactionHandle};
use ferry_contracts::L2Message;
use std::collections::HashMap;
use std::sync::Mutex;

const L1_CHAIN_ID: u64 = 1;

#[derive(Clone, Copy, Debug)]
struct Placement {
    batch: u64,
    tx_index: u64,
    leaf_id: u64,
}

#[derive(Clone, Debug)]
struct SentTransaction {
    data: Bytes,
    placement: Option<Placement>,
}

#[derive(Clone, Copy, Debug)]
enum AutoInclude {
    At(Placement),
    Sequential { batch: u64, next: u64 },
}

#[derive(Debug, Default)]
struct RollupState {
    nonce: u64,
    transactions: HashMap<TxHash, SentTransaction>,
    batches: HashMap<u64, LogMerkleTree>,
    auto_include: Option<AutoInclude>,
    auto_seal: Option<(u64, usize)>,
    proof_polls: HashMap<TxHash, u64>,
    moves_after_proof: HashMap<TxHash, u64>,
    fail_sends: bool,
    send_attempts: usize,
    passing_l2_reads: usize,
    failing_l2_reads: usize,
    fail_l1_calls: bool,
    settlement_chain_id: Option<u64>,
}

impl RollupState {
    fn fail_l2_read(&mut self) -> anyhow::Result<()> {
        if self.passing_l2_reads > 0 {
            self.passing_l2_reads -= 1;
        } else if self.failing_l2_reads > 0 {
            self.failing_l2_reads -= 1;
            bail!("connection reset by L2 node");
        }
        Ok(())
    }

    fn next_placement(&mut self) -> Option<Placement> {
        match self.auto_include.as_mut()? {
            AutoInclude::At(placement) => Some(*placement),
            AutoInclude::Sequential { batch, next } => {
                let placement = Placement {
                    batch: *batch,
                    tx_index: *next,
                    leaf_id: *next,
                };
                *next += 1;
                Some(placement)
            }
        }
    }

    fn seal(&mut self, sender: Address, batch: u64, depth: usize) {
        let included: Vec<_> = self
            .transactions
            .values()
            .filter_map(|tx| Some((tx.placement?, tx.data.clone())))
            .filter(|(placement, _)| placement.batch == batch)
            .collect();
        let leaf_count = included
            .iter()
            .map(|(placement, _)| placement.leaf_id + 1)
            .max()
            .unwrap_or_default();
        let mut leaves: Vec<B256> = (0..leaf_count)
            .map(|i| keccak256([b"filler".as_slice(), i.to_be_bytes().as_slice()].concat()))
            .collect();
        for (placement, data) in included {
            let record = L2MessageRecord {
                tx_number_in_batch: placement.tx_index as u16,
                sender,
                data,
            };
            leaves[placement.leaf_id as usize] = record.leaf_hash();
        }
        let tree = LogMerkleTree::new(depth, leaves).unwrap();
        self.batches.insert(batch, tree);
    }
}

/// In-memory stand-in for an L2 node, its messenger and the L1 settlement contract.
#[derive(Debug)]
pub struct InMemoryRollup {
    sender: Address,
    main_contract: Address,
    state: Mutex<RollupState>,
}

impl Default for InMemoryRollup {
    fn default() -> Self {
        Self {
            sender: address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            main_contract: address!("32400084c286cf3e17e7b677ea9583e60a000324"),
            state: Default::default(),
        }
    }
}

impl InMemoryRollup {
    pub fn sender_address(&self) -> Address {
        self.sender
    }

    pub fn main_contract_address(&self) -> Address {
        self.main_contract
    }

    /// Accepts a messenger transaction without going through the transport.
    pub fn send(&self, data: Bytes) -> L2TransactionHandle {
        let mut state = self.state.lock().unwrap();
        state.nonce += 1;
        let hash = keccak256(state.nonce.to_be_bytes());
        let placement = state.next_placement();
        state
            .transactions
            .insert(hash, SentTransaction { data, placement });
        L2TransactionHandle::from(hash)
    }

    pub fn sent_data(&self, hash: TxHash) -> Option<Bytes> {
        let state = self.state.lock().unwrap();
        state.transactions.get(&hash).map(|tx| tx.data.clone())
    }

    pub fn include(&self, handle: L2TransactionHandle, batch: u64, tx_index: u64) {
        self.include_at(handle, batch, tx_index, tx_index);
    }

    /// Places the transaction in `batch`, with its log at leaf `leaf_id` of the batch tree.
    pub fn include_at(&self, handle: L2TransactionHandle, batch: u64, tx_index: u64, leaf_id: u64) {
        let mut state = self.state.lock().unwrap();
        let tx = state.transactions.get_mut(&handle.tx_hash()).unwrap();
        tx.placement = Some(Placement {
            batch,
            tx_index,
            leaf_id,
        });
    }

    pub fn forget(&self, handle: L2TransactionHandle) {
        let mut state = self.state.lock().unwrap();
        state.transactions.remove(&handle.tx_hash());
    }

    pub fn included_receipt(&self, handle: L2TransactionHandle) -> Option<L2Receipt> {
        let state = self.state.lock().unwrap();
        let placement = state.transactions.get(&handle.tx_hash())?.placement?;
        Some(receipt_for(placement))
    }

    pub fn seal(&self, batch: u64, depth: usize) {
        self.state.lock().unwrap().seal(self.sender, batch, depth);
    }

    pub fn batch_root(&self, batch: u64) -> Option<B256> {
        let state = self.state.lock().unwrap();
        state.batches.get(&batch).map(LogMerkleTree::root)
    }

    pub fn batch_proof(&self, batch: u64, leaf_id: u64) -> Option<Vec<B256>> {
        let state = self.state.lock().unwrap();
        state.batches.get(&batch)?.proof(leaf_id as usize)
    }

    /// Every later submission lands at this placement.
    pub fn auto_include_at(&self, batch: u64, tx_index: u64, leaf_id: u64) {
        self.state.lock().unwrap().auto_include = Some(AutoInclude::At(Placement {
            batch,
            tx_index,
            leaf_id,
        }));
    }

    /// Later submissions fill `batch` in submission order.
    pub fn auto_include_sequential(&self, batch: u64) {
        self.state.lock().unwrap().auto_include =
            Some(AutoInclude::Sequential { batch, next: 0 });
    }

    /// Seals a transaction's batch once its proof was requested `polls` times unsuccessfully.
    pub fn auto_seal_after(&self, polls: u64, depth: usize) {
        self.state.lock().unwrap().auto_seal = Some((polls, depth));
    }

    pub fn fail_sends(&self, fail: bool) {
        self.state.lock().unwrap().fail_sends = fail;
    }

    pub fn send_attempts(&self) -> usize {
        self.state.lock().unwrap().send_attempts
    }

    /// Fails the next `count` L2 reads with a transport error.
    pub fn fail_l2_reads(&self, count: usize) {
        self.fail_l2_reads_after(0, count);
    }

    /// Lets `passing` L2 reads through, then fails the following `count`.
    pub fn fail_l2_reads_after(&self, passing: usize, count: usize) {
        let mut state = self.state.lock().unwrap();
        state.passing_l2_reads = passing;
        state.failing_l2_reads = count;
    }

    /// Moves the transaction to `batch` right after its proof is served.
    pub fn move_after_proof(&self, handle: L2TransactionHandle, batch: u64) {
        let mut state = self.state.lock().unwrap();
        state.moves_after_proof.insert(handle.tx_hash(), batch);
    }

    pub fn fail_l1_calls(&self, fail: bool) {
        self.state.lock().unwrap().fail_l1_calls = fail;
    }

    /// Makes the L1 endpoint report a chain other than the one the L2 node settles to.
    pub fn set_settlement_chain_id(&self, chain_id: u64) {
        self.state.lock().unwrap().settlement_chain_id = Some(chain_id);
    }
}

fn receipt_for(placement: Placement) -> L2Receipt {
    L2Receipt {
        batch_number: placement.batch,
        batch_tx_index: placement.tx_index,
        log_index: 0,
        l2_to_l1_log_count: 1,
        block_number: Some(placement.batch * 10),
    }
}

#[async_trait]
impl MessageTransport for InMemoryRollup {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn send_to_l1(&self, data: Bytes) -> anyhow::Result<TxHash> {
        {
            let mut state = self.state.lock().unwrap();
            state.send_attempts += 1;
            if state.fail_sends {
                bail!("insufficient funds for gas");
            }
        }
        Ok(self.send(data).tx_hash())
    }
}

#[async_trait]
impl L2StateSource for InMemoryRollup {
    async fn receipt(&self, hash: TxHash) -> anyhow::Result<ReceiptLookup> {
        let mut state = self.state.lock().unwrap();
        state.fail_l2_read()?;
        Ok(match state.transactions.get(&hash) {
            None => ReceiptLookup::Unknown,
            Some(SentTransaction {
                placement: None, ..
            }) => ReceiptLookup::Pending,
            Some(SentTransaction {
                placement: Some(placement),
                ..
            }) => ReceiptLookup::Included(receipt_for(*placement)),
        })
    }

    async fn log_proof(&self, hash: TxHash, log_index: u64) -> anyhow::Result<ProofLookup> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        state.fail_l2_read()?;
        let Some(placement) = state.transactions.get(&hash).and_then(|tx| tx.placement) else {
            return Ok(ProofLookup::NotReady);
        };
        if log_index > 0 {
            return Ok(ProofLookup::NoSuchLog);
        }

        if !state.batches.contains_key(&placement.batch) {
            let polls = state.proof_polls.entry(hash).or_default();
            match state.auto_seal {
                Some((limit, depth)) if *polls >= limit => {
                    state.seal(self.sender, placement.batch, depth)
                }
                _ => {
                    *polls += 1;
                    return Ok(ProofLookup::NotReady);
                }
            }
        }

        let tree = &state.batches[&placement.batch];
        let Some(proof) = tree.proof(placement.leaf_id as usize) else {
            bail!("leaf {} outside of batch {}", placement.leaf_id, placement.batch);
        };
        let lookup = ProofLookup::Ready(LogProof {
            id: placement.leaf_id,
            proof,
            root: tree.root(),
            batch_number: Some(placement.batch),
        });

        if let Some(batch) = state.moves_after_proof.remove(&hash) {
            if let Some(tx) = state.transactions.get_mut(&hash) {
                tx.placement = Some(Placement { batch, ..placement });
            }
        }
        Ok(lookup)
    }

    async fn main_contract(&self) -> anyhow::Result<Address> {
        self.state.lock().unwrap().fail_l2_read()?;
        Ok(self.main_contract)
    }

    async fn l1_chain_id(&self) -> anyhow::Result<u64> {
        self.state.lock().unwrap().fail_l2_read()?;
        Ok(L1_CHAIN_ID)
    }
}

#[async_trait]
impl SettlementLayer for InMemoryRollup {
    async fn chain_id(&self) -> anyhow::Result<u64> {
        let state = self.state.lock().unwrap();
        if state.fail_l1_calls {
            bail!("L1 endpoint unreachable");
        }
        Ok(state.settlement_chain_id.unwrap_or(L1_CHAIN_ID))
    }

    async fn prove_l2_message_inclusion(
        &self,
        contract: Address,
        batch_number: u64,
        index: u64,
        message: L2Message,
        proof: Vec<B256>,
    ) -> anyhow::Result<bool> {
        let state = self.state.lock().unwrap();
        if state.fail_l1_calls {
            bail!("L1 endpoint unreachable");
        }
        if contract != self.main_contract {
            bail!("execution reverted: no code at {contract}");
        }
        let Some(tree) = state.batches.get(&batch_number) else {
            bail!("execution reverted: batch {batch_number} not executed");
        };
        let record = L2MessageRecord {
            tx_number_in_batch: message.txNumberInBatch,
            sender: message.sender,
            data: message.data,
        };
        let Some(root) = compute_root(record.leaf_hash(), index, &proof) else {
            bail!("execution reverted: malformed proof");
        };
        Ok(root == tree.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sealed_batch_contains_included_messages() {
        let rollup = InMemoryRollup::default();
        let first = rollup.send(Bytes::from_static(b"first"));
        let second = rollup.send(Bytes::from_static(b"second"));
        rollup.include(first, 3, 0);
        rollup.include_at(second, 3, 1, 5);
        rollup.seal(3, 6);

        let ProofLookup::Ready(proof) = rollup.log_proof(second.tx_hash(), 0).await.unwrap()
        else {
            panic!("batch should be sealed");
        };
        assert_eq!(proof.id, 5);
        assert_eq!(proof.proof.len(), 6);
        assert_eq!(Some(proof.root), rollup.batch_root(3));

        let message = L2Message {
            txNumberInBatch: 1,
            sender: rollup.sender_address(),
            data: Bytes::from_static(b"second"),
        };
        assert!(rollup
            .prove_l2_message_inclusion(rollup.main_contract_address(), 3, 5, message, proof.proof)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_auto_seal() {
        let rollup = InMemoryRollup::default();
        rollup.auto_include_sequential(1);
        rollup.auto_seal_after(2, 4);
        let handle = rollup.send(Bytes::from_static(b"hello"));

        for _ in 0..2 {
            assert_eq!(
                rollup.log_proof(handle.tx_hash(), 0).await.unwrap(),
                ProofLookup::NotReady
            );
        }
        assert!(matches!(
            rollup.log_proof(handle.tx_hash(), 0).await.unwrap(),
            ProofLookup::Ready(_)
        ));
    }
}

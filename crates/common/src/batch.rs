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

use crate::merkle::compute_root;
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// Batch placement of a mined L2 transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2Receipt {
    /// L1 batch containing the transaction
    pub batch_number: u64,
    /// Position of the transaction within the batch
    pub batch_tx_index: u64,
    /// Position of the relayed log among the transaction's L2->L1 logs
    pub log_index: u64,
    /// Number of L2->L1 logs emitted by the transaction
    pub l2_to_l1_log_count: u64,
    /// L2 block containing the transaction
    pub block_number: Option<u64>,
}

impl L2Receipt {
    /// Whether two receipts agree on where the transaction landed.
    pub fn same_placement(&self, other: &Self) -> bool {
        self.batch_number == other.batch_number
            && self.batch_tx_index == other.batch_tx_index
            && self.log_index == other.log_index
    }
}

/// Merkle path from a log leaf to its batch root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Leaf position in the batch tree
    pub proof_id: u64,
    /// Sibling hashes ordered from leaf to root
    pub sibling_hashes: Vec<B256>,
    /// Batch whose root this proof leads to
    pub batch_number: u64,
    /// Root as reported by the L2 node, if any
    pub root: Option<B256>,
}

impl InclusionProof {
    pub fn depth(&self) -> usize {
        self.sibling_hashes.len()
    }

    /// Walks the path from `leaf` and returns the resulting root.
    pub fn root_for(&self, leaf: B256) -> Option<B256> {
        compute_root(leaf, self.proof_id, &self.sibling_hashes)
    }

    /// Checks the path against the node-reported root. `None` if the node reported no root.
    pub fn matches_reported_root(&self, leaf: B256) -> Option<bool> {
        self.root.map(|root| self.root_for(leaf) == Some(root))
    }
}

/// Outcome of one L1 inclusion check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Value returned by the settlement contract
    pub included: bool,
    pub batch_number: u64,
    pub proof_id: u64,
    /// Contract that answered the call
    pub settlement_contract: Address,
}

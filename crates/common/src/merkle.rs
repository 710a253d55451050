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

//! Keccak binary tree over the L2->L1 logs of a batch.
//!
//! Unused leaves hold the hash of an all-zero packed log, so a tree of depth `d`
//! has `2^d` leaves regardless of how many logs the batch emitted.

use crate::message::L2_TO_L1_LOG_SERIALIZE_SIZE;
use alloy_primitives::{keccak256, B256};

/// Longest path the settlement contract accepts.
pub const MAX_PROOF_DEPTH: usize = 255;

/// Deepest tree [LogMerkleTree] will materialize.
#[cfg(any(test, feature = "test-utils"))]
pub const MAX_TREE_DEPTH: usize = 32;

pub fn empty_leaf_hash() -> B256 {
    keccak256([0u8; L2_TO_L1_LOG_SERIALIZE_SIZE])
}

pub fn hash_pair(left: &B256, right: &B256) -> B256 {
    keccak256([left.as_slice(), right.as_slice()].concat())
}

/// Recomputes a root from `leaf` at position `index` by walking `path` leaf-to-root.
/// The parity of the running index decides whether the sibling sits on the left.
///
/// Returns `None` for paths the settlement contract would reject outright.
pub fn compute_root(leaf: B256, index: u64, path: &[B256]) -> Option<B256> {
    if path.is_empty() || path.len() > MAX_PROOF_DEPTH {
        return None;
    }
    if path.len() < u64::BITS as usize && index >> path.len() != 0 {
        return None;
    }
    let mut index = index;
    let mut current = leaf;
    for sibling in path {
        current = if index % 2 == 0 {
            hash_pair(&current, sibling)
        } else {
            hash_pair(sibling, &current)
        };
        index /= 2;
    }
    Some(current)
}

/// Batch tree built from known leaves, for settling fixtures in tests.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Clone, Debug)]
pub struct LogMerkleTree {
    /// Populated nodes per level, leaves first
    levels: Vec<Vec<B256>>,
    /// Hash of an empty subtree per level
    empty: Vec<B256>,
}

#[cfg(any(test, feature = "test-utils"))]
impl LogMerkleTree {
    pub fn new(depth: usize, leaves: Vec<B256>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (1..=MAX_TREE_DEPTH).contains(&depth),
            "Tree depth {depth} out of range"
        );
        anyhow::ensure!(
            leaves.len() <= 1 << depth,
            "{} leaves do not fit a tree of depth {depth}",
            leaves.len()
        );

        let mut empty = Vec::with_capacity(depth + 1);
        empty.push(empty_leaf_hash());
        let mut levels = Vec::with_capacity(depth + 1);
        levels.push(leaves);
        for level in 0..depth {
            let next = levels[level]
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [left] => hash_pair(left, &empty[level]),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect::<Vec<_>>();
            empty.push(hash_pair(&empty[level], &empty[level]));
            levels.push(next);
        }

        Ok(Self { levels, empty })
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    pub fn root(&self) -> B256 {
        let depth = self.depth();
        self.levels[depth]
            .first()
            .copied()
            .unwrap_or(self.empty[depth])
    }

    /// Sibling path for the leaf at `index`, leaf-to-root. `None` for unpopulated leaves.
    pub fn proof(&self, index: usize) -> Option<Vec<B256>> {
        if index >= self.leaf_count() {
            return None;
        }
        let mut position = index;
        let mut path = Vec::with_capacity(self.depth());
        for (level, nodes) in self.levels[..self.depth()].iter().enumerate() {
            let sibling = nodes
                .get(position ^ 1)
                .copied()
                .unwrap_or(self.empty[level]);
            path.push(sibling);
            position >>= 1;
        }
        Some(path)
    }
}

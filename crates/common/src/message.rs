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

use crate::batch::L2Receipt;
use alloy_primitives::{hex, keccak256, Address, Bytes, TxHash, B256};
use anyhow::{ensure, Context};
use ferry_contracts::{L2Message, L1_MESSENGER_ADDRESS};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::num::TryFromIntError;

/// Size of an abi-packed L2->L1 log.
pub const L2_TO_L1_LOG_SERIALIZE_SIZE: usize = 88;

/// An opaque, non-empty payload to relay from L2 to L1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Bytes")]
pub struct Message(Bytes);

impl Message {
    pub fn new(data: impl Into<Bytes>) -> anyhow::Result<Self> {
        let data = data.into();
        ensure!(!data.is_empty(), "Message must not be empty");
        Ok(Self(data))
    }

    /// Parses a `0x`-prefixed (or bare) hex payload.
    pub fn from_hex(value: &str) -> anyhow::Result<Self> {
        let data = hex::decode(value).context("hex::decode")?;
        Self::new(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn to_bytes(&self) -> Bytes {
        self.0.clone()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Bytes> for Message {
    type Error = anyhow::Error;

    fn try_from(value: Bytes) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Message {
    type Error = anyhow::Error;

    /// Uses the utf-8 bytes of the text, not a hex interpretation.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.as_bytes().to_vec())
    }
}

/// Hash of a submitted L2 transaction. Finality is unknown at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct L2TransactionHandle(pub TxHash);

impl L2TransactionHandle {
    pub fn tx_hash(&self) -> TxHash {
        self.0
    }
}

impl From<TxHash> for L2TransactionHandle {
    fn from(value: TxHash) -> Self {
        Self(value)
    }
}

impl Display for L2TransactionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The leaf value committed to by the batch's L2->L1 log tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2MessageRecord {
    /// Position of the sending transaction within its batch
    pub tx_number_in_batch: u16,
    /// L2 account that called the messenger
    pub sender: Address,
    /// The message bytes, unmodified
    pub data: Bytes,
}

impl L2MessageRecord {
    /// Fails if the receipt's batch position does not fit the `uint16` the settlement contract uses.
    pub fn from_receipt(
        receipt: &L2Receipt,
        sender: Address,
        message: &Message,
    ) -> Result<Self, TryFromIntError> {
        Ok(Self {
            tx_number_in_batch: u16::try_from(receipt.batch_tx_index)?,
            sender,
            data: message.to_bytes(),
        })
    }

    /// Packs the log emitted by the L1 messenger for this message:
    /// `shard_id | is_service | tx_number | messenger | padded sender | keccak(data)`.
    pub fn packed_log(&self) -> [u8; L2_TO_L1_LOG_SERIALIZE_SIZE] {
        let mut buffer = [0u8; L2_TO_L1_LOG_SERIALIZE_SIZE];
        buffer[0] = 0;
        buffer[1] = 1;
        buffer[2..4].copy_from_slice(&self.tx_number_in_batch.to_be_bytes());
        buffer[4..24].copy_from_slice(L1_MESSENGER_ADDRESS.as_slice());
        buffer[24..56].copy_from_slice(self.sender.into_word().as_slice());
        buffer[56..88].copy_from_slice(keccak256(&self.data).as_slice());
        buffer
    }

    pub fn leaf_hash(&self) -> B256 {
        keccak256(self.packed_log())
    }
}

impl From<&L2MessageRecord> for L2Message {
    fn from(value: &L2MessageRecord) -> Self {
        L2Message {
            txNumberInBatch: value.tx_number_in_batch,
            sender: value.sender,
            data: value.data.clone(),
        }
    }
}

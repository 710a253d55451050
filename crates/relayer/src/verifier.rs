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

use crate::error::RelayError;
use crate::source::{L2StateSource, SettlementLayer};
use alloy::primitives::Address;
use anyhow::anyhow;
use ferry_common::batch::{InclusionProof, L2Receipt, VerificationResult};
use ferry_common::message::{L2MessageRecord, Message};
use ferry_contracts::L2Message;
use ferry_sync::retry_timeout;
use tracing::{info, warn};

/// Checks message inclusion against the settlement contract on L1.
#[derive(Debug)]
pub struct InclusionVerifier<'a, S, L> {
    pub source: &'a S,
    pub settlement: &'a L,
}

impl<'a, S: L2StateSource, L: SettlementLayer> InclusionVerifier<'a, S, L> {
    pub fn new(source: &'a S, settlement: &'a L) -> Self {
        Self { source, settlement }
    }

    /// Resolves the contract holding batch roots, making sure the L1 endpoint is the chain
    /// the L2 node settles to.
    pub async fn settlement_contract(&self) -> Result<Address, RelayError> {
        let contract = retry_timeout!(2, self.source.main_contract().await)
            .await
            .map_err(RelayError::VerificationCallFailed)?;
        let expected_chain_id = retry_timeout!(2, self.source.l1_chain_id().await)
            .await
            .map_err(RelayError::VerificationCallFailed)?;
        let chain_id = retry_timeout!(2, self.settlement.chain_id().await)
            .await
            .map_err(RelayError::VerificationCallFailed)?;
        if chain_id != expected_chain_id {
            return Err(RelayError::VerificationCallFailed(anyhow!(
                "L1 endpoint serves chain {chain_id} but the L2 node settles to {expected_chain_id}"
            )));
        }
        info!("Settlement contract on chain {chain_id}: {contract}");
        Ok(contract)
    }

    /// Asks the settlement contract whether the message is part of the receipt's batch.
    /// A negative answer is a result, not an error.
    pub async fn verify(
        &self,
        message: &Message,
        sender: Address,
        receipt: &L2Receipt,
        proof: &InclusionProof,
    ) -> Result<VerificationResult, RelayError> {
        let record = L2MessageRecord::from_receipt(receipt, sender, message)
            .map_err(|_| RelayError::TxIndexOverflow(receipt.batch_tx_index))?;
        if proof.matches_reported_root(record.leaf_hash()) == Some(false) {
            warn!(
                "Proof {} does not lead to the reported root of batch {}",
                proof.proof_id, proof.batch_number
            );
        }

        let contract = self.settlement_contract().await?;
        let included = self
            .settlement
            .prove_l2_message_inclusion(
                contract,
                proof.batch_number,
                proof.proof_id,
                L2Message::from(&record),
                proof.sibling_hashes.clone(),
            )
            .await
            .map_err(RelayError::VerificationCallFailed)?;
        info!(
            "Inclusion of message in batch {} at {}: {included}",
            proof.batch_number, proof.proof_id
        );

        Ok(VerificationResult {
            included,
            batch_number: proof.batch_number,
            proof_id: proof.proof_id,
            settlement_contract: contract,
        })
    }
}

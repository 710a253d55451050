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
use crate::source::{L2StateSource, ProofLookup};
use ferry_common::batch::{InclusionProof, L2Receipt};
use ferry_common::message::L2TransactionHandle;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProofStatus {
    Ready(InclusionProof),
    /// The containing batch has not been sealed yet
    NotReady,
}

/// Fetches inclusion proofs for the messenger log of an included transaction.
#[derive(Debug)]
pub struct ProofFetcher<'a, S> {
    pub source: &'a S,
}

impl<'a, S: L2StateSource> ProofFetcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub async fn fetch(
        &self,
        handle: &L2TransactionHandle,
        receipt: &L2Receipt,
    ) -> Result<ProofStatus, RelayError> {
        let hash = handle.tx_hash();
        let log_index = receipt.log_index;
        if log_index >= receipt.l2_to_l1_log_count {
            return Err(RelayError::NoSuchLog { hash, log_index });
        }

        let lookup = self
            .source
            .log_proof(hash, log_index)
            .await
            .map_err(RelayError::L2RequestFailed)?;

        let proof = match lookup {
            ProofLookup::Ready(proof) => proof,
            ProofLookup::NotReady => {
                debug!("Proof for {hash}/{log_index} not ready.");
                return Ok(ProofStatus::NotReady);
            }
            ProofLookup::NoSuchLog => return Err(RelayError::NoSuchLog { hash, log_index }),
        };

        if let Some(batch_number) = proof.batch_number {
            if batch_number != receipt.batch_number {
                warn!(
                    "Proof for {hash} targets batch {batch_number} instead of {}",
                    receipt.batch_number
                );
                let mut found = *receipt;
                found.batch_number = batch_number;
                return Err(RelayError::ReceiptInconsistency {
                    hash,
                    expected: *receipt,
                    found: Some(found),
                });
            }
        }
        debug!(
            "Proof for {hash}/{log_index}: id {} depth {}",
            proof.id,
            proof.proof.len()
        );

        Ok(ProofStatus::Ready(InclusionProof {
            proof_id: proof.id,
            sibling_hashes: proof.proof,
            batch_number: receipt.batch_number,
            root: Some(proof.root),
        }))
    }
}

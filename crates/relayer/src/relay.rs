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

use crate::error::{RelayError, RelayErrorKind, RelayStage};
use crate::poll::{PollBudget, PollConfig};
use crate::proof::{ProofFetcher, ProofStatus};
use crate::receipt::{ReceiptResolver, ReceiptStatus};
use crate::sender::MessageSender;
use crate::source::{L2StateSource, MessageTransport, SettlementLayer};
use crate::verifier::InclusionVerifier;
use alloy::primitives::Address;
use ferry_common::batch::{InclusionProof, L2Receipt, VerificationResult};
use ferry_common::message::{L2TransactionHandle, Message};
use ferry_sync::telemetry::RelayTelemetry;
use opentelemetry::KeyValue;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub enum RelayState {
    Submitted(L2TransactionHandle),
    AwaitingReceipt(L2TransactionHandle),
    AwaitingProof {
        handle: L2TransactionHandle,
        receipt: L2Receipt,
    },
    Verifying {
        handle: L2TransactionHandle,
        receipt: L2Receipt,
        proof: InclusionProof,
    },
    Verified(VerificationResult),
    Failed(RelayError),
}

impl RelayState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RelayState::Verified(_) | RelayState::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            RelayState::Submitted(_) => "Submitted",
            RelayState::AwaitingReceipt(_) => "AwaitingReceipt",
            RelayState::AwaitingProof { .. } => "AwaitingProof",
            RelayState::Verifying { .. } => "Verifying",
            RelayState::Verified(_) => "Verified",
            RelayState::Failed(_) => "Failed",
        }
    }
}

/// Published whenever a relay enters a new state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayEvent {
    Submitted(L2TransactionHandle),
    ReceiptResolved(L2Receipt),
    ProofFetched(InclusionProof),
    Verified(VerificationResult),
    Failed {
        kind: RelayErrorKind,
        reason: String,
    },
}

impl RelayEvent {
    fn for_state(state: &RelayState) -> Option<Self> {
        match state {
            RelayState::Submitted(_) => None,
            RelayState::AwaitingReceipt(handle) => Some(RelayEvent::Submitted(*handle)),
            RelayState::AwaitingProof { receipt, .. } => {
                Some(RelayEvent::ReceiptResolved(*receipt))
            }
            RelayState::Verifying { proof, .. } => Some(RelayEvent::ProofFetched(proof.clone())),
            RelayState::Verified(result) => Some(RelayEvent::Verified(*result)),
            RelayState::Failed(err) => Some(RelayEvent::Failed {
                kind: err.kind(),
                reason: err.to_string(),
            }),
        }
    }
}

/// Drives one message from submission to an L1 inclusion answer.
pub struct Relay<'a, S, L> {
    pub source: &'a S,
    pub settlement: &'a L,
    pub message: Message,
    pub sender: Address,
    pub config: PollConfig,
    state: RelayState,
    budget: Option<PollBudget>,
    telemetry: RelayTelemetry,
}

impl<'a, S: L2StateSource, L: SettlementLayer> Relay<'a, S, L> {
    /// Submits `message` through `transport` and starts tracking the resulting transaction.
    pub async fn submit<T: MessageTransport>(
        transport: &T,
        source: &'a S,
        settlement: &'a L,
        message: Message,
        config: PollConfig,
    ) -> Result<Self, RelayError> {
        let telemetry = RelayTelemetry::new();
        let sender = MessageSender::new(transport);
        let handle = match sender.submit(&message).await {
            Ok(handle) => handle,
            Err(err) => {
                telemetry.submit_errs.add(1, &[]);
                return Err(err);
            }
        };
        telemetry.submit_count.add(1, &[]);

        Ok(Self {
            source,
            settlement,
            message,
            sender: sender.sender(),
            config,
            state: RelayState::Submitted(handle),
            budget: None,
            telemetry,
        })
    }

    /// Tracks a message that was already sent by `sender` in transaction `handle`.
    pub fn resume(
        source: &'a S,
        settlement: &'a L,
        handle: L2TransactionHandle,
        message: Message,
        sender: Address,
        config: PollConfig,
    ) -> Self {
        Self {
            source,
            settlement,
            message,
            sender,
            config,
            state: RelayState::Submitted(handle),
            budget: None,
            telemetry: RelayTelemetry::new(),
        }
    }

    pub fn state(&self) -> &RelayState {
        &self.state
    }

    /// Performs at most one state transition, sleeping first if the current stage is still
    /// waiting on the L2 node. Returns the event for the new state, if any.
    pub async fn step(&mut self) -> Option<RelayEvent> {
        let next = match &self.state {
            RelayState::Submitted(handle) => Some(RelayState::AwaitingReceipt(*handle)),
            RelayState::AwaitingReceipt(handle) => {
                let handle = *handle;
                self.await_receipt(handle).await
            }
            RelayState::AwaitingProof { handle, receipt } => {
                let (handle, receipt) = (*handle, *receipt);
                self.await_proof(handle, receipt).await
            }
            RelayState::Verifying {
                handle,
                receipt,
                proof,
            } => {
                let (handle, receipt, proof) = (*handle, *receipt, proof.clone());
                Some(self.verify(handle, receipt, proof).await)
            }
            RelayState::Verified(_) | RelayState::Failed(_) => None,
        }?;

        self.transition(next);
        RelayEvent::for_state(&self.state)
    }

    /// Steps until a terminal state is reached.
    pub async fn run(self) -> Result<VerificationResult, RelayError> {
        self.drive(None).await
    }

    /// Like [Relay::run], publishing every transition on `events`.
    pub async fn run_with_events(
        self,
        events: mpsc::Sender<RelayEvent>,
    ) -> Result<VerificationResult, RelayError> {
        self.drive(Some(events)).await
    }

    async fn drive(
        mut self,
        events: Option<mpsc::Sender<RelayEvent>>,
    ) -> Result<VerificationResult, RelayError> {
        loop {
            if let Some(event) = self.step().await {
                if let Some(events) = &events {
                    if events.send(event).await.is_err() {
                        debug!("Relay event receiver dropped.");
                    }
                }
            }
            match self.state {
                RelayState::Verified(result) => return Ok(result),
                RelayState::Failed(err) => return Err(err),
                _ => {}
            }
        }
    }

    fn transition(&mut self, next: RelayState) {
        info!("Relay {} -> {}", self.state.name(), next.name());
        match &next {
            RelayState::Verified(result) => {
                self.telemetry.verify_count.add(
                    1,
                    &[KeyValue::new("included", result.included.to_string())],
                );
                self.telemetry
                    .verify_last_batch
                    .record(result.batch_number, &[]);
            }
            RelayState::Failed(err) => {
                error!("Relay failed: {err}");
                self.telemetry
                    .verify_errs
                    .add(1, &[KeyValue::new("kind", err.kind().as_str())]);
            }
            _ => {}
        }
        self.budget = None;
        self.state = next;
    }

    /// Sleeps within the current stage's budget. Returns the failed state once it is spent.
    async fn wait(&mut self, stage: RelayStage) -> Option<RelayState> {
        self.telemetry
            .poll_count
            .add(1, &[KeyValue::new("stage", stage.to_string())]);
        let config = self.config;
        let budget = self
            .budget
            .get_or_insert_with(|| PollBudget::start(stage, &config));
        budget.wait().await.err().map(RelayState::Failed)
    }

    async fn await_receipt(&mut self, handle: L2TransactionHandle) -> Option<RelayState> {
        match ReceiptResolver::new(self.source).resolve(&handle, None).await {
            Ok(ReceiptStatus::Included(receipt)) => {
                info!(
                    "Transaction {handle} included in batch {} at index {}.",
                    receipt.batch_number, receipt.batch_tx_index
                );
                Some(RelayState::AwaitingProof { handle, receipt })
            }
            Ok(ReceiptStatus::Pending) => self.wait(RelayStage::Receipt).await,
            Err(err) if err.is_transient() => {
                error!("(Retrying) {err:?}");
                self.wait(RelayStage::Receipt).await
            }
            Err(err) => Some(RelayState::Failed(err)),
        }
    }

    async fn await_proof(
        &mut self,
        handle: L2TransactionHandle,
        receipt: L2Receipt,
    ) -> Option<RelayState> {
        let proof = match ProofFetcher::new(self.source).fetch(&handle, &receipt).await {
            Ok(ProofStatus::Ready(proof)) => proof,
            Ok(ProofStatus::NotReady) => return self.wait(RelayStage::Proof).await,
            Err(err) if err.is_transient() => {
                error!("(Retrying) {err:?}");
                return self.wait(RelayStage::Proof).await;
            }
            Err(err) => return Some(RelayState::Failed(err)),
        };

        // the receipt must not have moved while the proof was pending
        let receipt = match ReceiptResolver::new(self.source)
            .resolve(&handle, Some(&receipt))
            .await
        {
            Ok(ReceiptStatus::Included(receipt)) => receipt,
            Ok(ReceiptStatus::Pending) => {
                return Some(RelayState::Failed(RelayError::ReceiptInconsistency {
                    hash: handle.tx_hash(),
                    expected: receipt,
                    found: None,
                }))
            }
            Err(err) if err.is_transient() => {
                error!("(Retrying) {err:?}");
                return self.wait(RelayStage::Proof).await;
            }
            Err(err) => return Some(RelayState::Failed(err)),
        };

        info!(
            "Proof for {handle} ready at position {} with depth {}.",
            proof.proof_id,
            proof.depth()
        );
        Some(RelayState::Verifying {
            handle,
            receipt,
            proof,
        })
    }

    async fn verify(
        &self,
        handle: L2TransactionHandle,
        receipt: L2Receipt,
        proof: InclusionProof,
    ) -> RelayState {
        let verifier = InclusionVerifier::new(self.source, self.settlement);
        match verifier
            .verify(&self.message, self.sender, &receipt, &proof)
            .await
        {
            Ok(result) => {
                if !result.included {
                    warn!("Settlement contract rejected the message from {handle}.");
                }
                RelayState::Verified(result)
            }
            Err(err) => RelayState::Failed(err),
        }
    }
}

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

use alloy::primitives::TxHash;
use ferry_common::batch::L2Receipt;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// The waiting stages of a relay, used to label timeouts and telemetry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelayStage {
    Receipt,
    Proof,
}

impl Display for RelayStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayStage::Receipt => write!(f, "receipt"),
            RelayStage::Proof => write!(f, "proof"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("SubmissionFailed error: {0:?}")]
    SubmissionFailed(anyhow::Error),

    #[error("ReceiptNotFound error: transaction {0} is unknown to the L2 node")]
    ReceiptNotFound(TxHash),

    #[error("ReceiptInconsistency error: transaction {hash} resolved to {found:?} after {expected:?}")]
    ReceiptInconsistency {
        hash: TxHash,
        expected: L2Receipt,
        found: Option<L2Receipt>,
    },

    #[error("TxIndexOverflow error: batch tx index {0} does not fit uint16")]
    TxIndexOverflow(u64),

    #[error("NoSuchLog error: transaction {hash} has no L2->L1 log at index {log_index}")]
    NoSuchLog { hash: TxHash, log_index: u64 },

    #[error("L2RequestFailed error: {0:?}")]
    L2RequestFailed(anyhow::Error),

    #[error("Timeout error: gave up waiting for {stage} after {waited:?}")]
    Timeout { stage: RelayStage, waited: Duration },

    #[error("VerificationCallFailed error: {0:?}")]
    VerificationCallFailed(anyhow::Error),
}

/// Fieldless mirror of [RelayError] for events and metric labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelayErrorKind {
    SubmissionFailed,
    ReceiptNotFound,
    ReceiptInconsistency,
    TxIndexOverflow,
    NoSuchLog,
    L2RequestFailed,
    Timeout,
    VerificationCallFailed,
}

impl RelayErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayErrorKind::SubmissionFailed => "submission_failed",
            RelayErrorKind::ReceiptNotFound => "receipt_not_found",
            RelayErrorKind::ReceiptInconsistency => "receipt_inconsistency",
            RelayErrorKind::TxIndexOverflow => "tx_index_overflow",
            RelayErrorKind::NoSuchLog => "no_such_log",
            RelayErrorKind::L2RequestFailed => "l2_request_failed",
            RelayErrorKind::Timeout => "timeout",
            RelayErrorKind::VerificationCallFailed => "verification_call_failed",
        }
    }
}

impl RelayError {
    pub fn kind(&self) -> RelayErrorKind {
        match self {
            RelayError::SubmissionFailed(_) => RelayErrorKind::SubmissionFailed,
            RelayError::ReceiptNotFound(_) => RelayErrorKind::ReceiptNotFound,
            RelayError::ReceiptInconsistency { .. } => RelayErrorKind::ReceiptInconsistency,
            RelayError::TxIndexOverflow(_) => RelayErrorKind::TxIndexOverflow,
            RelayError::NoSuchLog { .. } => RelayErrorKind::NoSuchLog,
            RelayError::L2RequestFailed(_) => RelayErrorKind::L2RequestFailed,
            RelayError::Timeout { .. } => RelayErrorKind::Timeout,
            RelayError::VerificationCallFailed(_) => RelayErrorKind::VerificationCallFailed,
        }
    }

    /// Whether the caller may retry the failed operation and expect a different outcome.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            RelayErrorKind::SubmissionFailed
                | RelayErrorKind::L2RequestFailed
                | RelayErrorKind::Timeout
                | RelayErrorKind::VerificationCallFailed
        )
    }

    /// Whether a polling loop may absorb the error and try again within its budget.
    pub fn is_transient(&self) -> bool {
        matches!(self, RelayError::L2RequestFailed(_))
    }
}

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
use crate::source::MessageTransport;
use alloy::primitives::Address;
use ferry_common::message::{L2TransactionHandle, Message};
use tracing::{error, info};

/// Submits messages to the L1 messenger. Submissions are never retried.
#[derive(Debug)]
pub struct MessageSender<'a, T> {
    pub transport: &'a T,
}

impl<'a, T: MessageTransport> MessageSender<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    pub fn sender(&self) -> Address {
        self.transport.sender()
    }

    pub async fn submit(&self, message: &Message) -> Result<L2TransactionHandle, RelayError> {
        info!(
            "Submitting {} byte message from {}.",
            message.len(),
            self.sender()
        );
        match self.transport.send_to_l1(message.to_bytes()).await {
            Ok(hash) => {
                info!("Message accepted in transaction {hash}.");
                Ok(L2TransactionHandle::from(hash))
            }
            Err(err) => {
                error!("Failed to submit message: {err:?}");
                Err(RelayError::SubmissionFailed(err))
            }
        }
    }
}

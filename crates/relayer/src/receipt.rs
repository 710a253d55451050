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

use crate::error::{RelayError, RelayStage};
use crate::poll::{PollBudget, PollConfig};
use crate::source::{L2StateSource, ReceiptLookup};
use ferry_common::batch::L2Receipt;
use ferry_common::message::L2TransactionHandle;
use tracing::{debug, error, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptStatus {
    Included(L2Receipt),
    /// Known to the node but not yet placed in a batch
    Pending,
}

/// Looks up batch placement for submitted transactions.
#[derive(Debug)]
pub struct ReceiptResolver<'a, S> {
    pub source: &'a S,
}

impl<'a, S: L2StateSource> ReceiptResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Resolves the receipt once. A `prior` receipt must be reproduced exactly.
    pub async fn resolve(
        &self,
        handle: &L2TransactionHandle,
        prior: Option<&L2Receipt>,
    ) -> Result<ReceiptStatus, RelayError> {
        let hash = handle.tx_hash();
        let lookup = self
            .source
            .receipt(hash)
            .await
            .map_err(RelayError::L2RequestFailed)?;
        debug!("Receipt lookup for {hash}: {lookup:?}");

        match (lookup, prior) {
            (ReceiptLookup::Included(receipt), Some(expected))
                if !expected.same_placement(&receipt) =>
            {
                warn!("Receipt for {hash} moved from {expected:?} to {receipt:?}");
                Err(RelayError::ReceiptInconsistency {
                    hash,
                    expected: *expected,
                    found: Some(receipt),
                })
            }
            (ReceiptLookup::Included(receipt), _) => Ok(ReceiptStatus::Included(receipt)),
            (ReceiptLookup::Pending | ReceiptLookup::Unknown, Some(expected)) => {
                warn!("Receipt for {hash} disappeared after {expected:?}");
                Err(RelayError::ReceiptInconsistency {
                    hash,
                    expected: *expected,
                    found: None,
                })
            }
            (ReceiptLookup::Pending, None) => Ok(ReceiptStatus::Pending),
            (ReceiptLookup::Unknown, None) => Err(RelayError::ReceiptNotFound(hash)),
        }
    }

    /// Polls until the transaction is placed in a batch, absorbing transport errors.
    pub async fn wait_for_inclusion(
        &self,
        handle: &L2TransactionHandle,
        config: &PollConfig,
    ) -> Result<L2Receipt, RelayError> {
        let mut budget = PollBudget::start(RelayStage::Receipt, config);
        loop {
            match self.resolve(handle, None).await {
                Ok(ReceiptStatus::Included(receipt)) => return Ok(receipt),
                Ok(ReceiptStatus::Pending) => {}
                Err(err) if err.is_transient() => error!("(Retrying) {err:?}"),
                Err(err) => return Err(err),
            }
            budget.wait().await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayErrorKind;
    use crate::mock::InMemoryRollup;
    use alloy::primitives::{Bytes, TxHash};
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolve_lifecycle() {
        let rollup = InMemoryRollup::default();
        let handle = rollup.send(Bytes::from_static(b"hello"));
        let resolver = ReceiptResolver::new(&rollup);

        assert_eq!(
            resolver.resolve(&handle, None).await.unwrap(),
            ReceiptStatus::Pending
        );

        rollup.include(handle, 42, 3);
        let ReceiptStatus::Included(receipt) = resolver.resolve(&handle, None).await.unwrap()
        else {
            panic!("receipt should be included");
        };
        assert_eq!(receipt.batch_number, 42);
        assert_eq!(receipt.batch_tx_index, 3);
        assert_eq!(receipt.log_index, 0);

        // stable across repeated lookups
        assert_eq!(
            resolver.resolve(&handle, Some(&receipt)).await.unwrap(),
            ReceiptStatus::Included(receipt)
        );
    }

    #[tokio::test]
    async fn test_unknown_handle() {
        let rollup = InMemoryRollup::default();
        let resolver = ReceiptResolver::new(&rollup);
        let handle = L2TransactionHandle::from(TxHash::repeat_byte(0xee));

        let err = resolver.resolve(&handle, None).await.unwrap_err();
        assert_eq!(err.kind(), RelayErrorKind::ReceiptNotFound);
    }

    #[tokio::test]
    async fn test_inconsistent_receipt() {
        let rollup = InMemoryRollup::default();
        let handle = rollup.send(Bytes::from_static(b"hello"));
        rollup.include(handle, 42, 3);
        let resolver = ReceiptResolver::new(&rollup);
        let ReceiptStatus::Included(receipt) = resolver.resolve(&handle, None).await.unwrap()
        else {
            panic!("receipt should be included");
        };

        rollup.include(handle, 43, 0);
        let err = resolver.resolve(&handle, Some(&receipt)).await.unwrap_err();
        assert_eq!(err.kind(), RelayErrorKind::ReceiptInconsistency);

        rollup.forget(handle);
        let err = resolver.resolve(&handle, Some(&receipt)).await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::ReceiptInconsistency { found: None, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_inclusion() {
        let rollup = InMemoryRollup::default();
        let handle = rollup.send(Bytes::from_static(b"hello"));
        rollup.fail_l2_reads(2);
        let resolver = ReceiptResolver::new(&rollup);
        let config = PollConfig {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(4),
            max_wait: Duration::from_secs(60),
        };

        let (receipt, _) = tokio::join!(resolver.wait_for_inclusion(&handle, &config), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            rollup.include(handle, 42, 3);
        });
        assert_eq!(receipt.unwrap().batch_number, 42);

        let pending = rollup.send(Bytes::from_static(b"later"));
        let err = resolver
            .wait_for_inclusion(&pending, &config)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RelayError::Timeout {
                stage: RelayStage::Receipt,
                ..
            }
        ));

        let unknown = L2TransactionHandle::from(TxHash::repeat_byte(0xee));
        let err = resolver
            .wait_for_inclusion(&unknown, &config)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), RelayErrorKind::ReceiptNotFound);
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let rollup = InMemoryRollup::default();
        let handle = rollup.send(Bytes::from_static(b"hello"));
        rollup.fail_l2_reads(1);
        let resolver = ReceiptResolver::new(&rollup);

        let err = resolver.resolve(&handle, None).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(
            resolver.resolve(&handle, None).await.unwrap(),
            ReceiptStatus::Pending
        );
    }
}

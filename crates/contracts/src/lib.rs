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

use alloy::primitives::{address, Address};
use alloy::sol;

/// L2 system contract that accepts user messages for L1.
pub const L1_MESSENGER_ADDRESS: Address = address!("0000000000000000000000000000000000008008");

sol!(
    #[sol(rpc)]
    interface IL1Messenger {
        function sendToL1(bytes calldata _message) external returns (bytes32);
    }
);

sol!(
    /// Leaf value proven by the settlement contract. Field order is part of the ABI.
    #[derive(Debug, PartialEq, Eq)]
    struct L2Message {
        uint16 txNumberInBatch;
        address sender;
        bytes data;
    }

    #[sol(rpc)]
    interface IMailbox {
        function proveL2MessageInclusion(
            uint256 _batchNumber,
            uint256 _index,
            L2Message calldata _message,
            bytes32[] calldata _proof
        ) external view returns (bool);
    }
);

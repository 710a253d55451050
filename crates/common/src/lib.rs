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

//! Data model shared by the L2->L1 message relay: messages, receipts, inclusion proofs
//! and the log tree the settlement contract verifies them against.

/// Receipts, inclusion proofs and verification outcomes.
pub mod batch;
/// The keccak log tree and the contract-equivalent tree walk.
pub mod merkle;
/// Message payloads, transaction handles and the leaf record encoding.
pub mod message;

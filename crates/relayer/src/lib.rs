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

//! Relays messages from L2 to L1: submission through the L1 messenger, receipt and proof
//! polling against the L2 node, and the inclusion check on the settlement contract.

pub mod error;
#[cfg(test)]
pub mod mock;
pub mod poll;
pub mod proof;
pub mod receipt;
pub mod relay;
pub mod sender;
pub mod source;
pub mod verifier;

pub use error::{RelayError, RelayErrorKind, RelayStage};
pub use poll::PollConfig;
pub use relay::{Relay, RelayEvent, RelayState};

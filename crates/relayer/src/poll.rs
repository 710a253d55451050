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
use ferry_sync::args::PollArgs;
use std::iter::{once, Chain, Once};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_retry::strategy::ExponentialBackoff;
use tracing::debug;

/// Bounds on how often and how long a relay waits for the L2 node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before the first re-poll
    pub initial_interval: Duration,
    /// Cap on the backed-off delay
    pub max_interval: Duration,
    /// Total time allowed in each waiting stage
    pub max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::from(&PollArgs::default())
    }
}

impl From<&PollArgs> for PollConfig {
    fn from(args: &PollArgs) -> Self {
        Self {
            initial_interval: Duration::from_millis(args.poll_interval_ms),
            max_interval: Duration::from_millis(args.max_poll_interval_ms),
            max_wait: Duration::from_secs(args.max_wait_secs),
        }
    }
}

/// Delays between polls: `initial_interval`, then doubling up to `max_interval`.
pub type PollDelays = Chain<Once<Duration>, ExponentialBackoff>;

impl PollConfig {
    /// Intervals below one millisecond are raised to it.
    pub fn backoff(&self) -> PollDelays {
        let initial = self.initial_interval.max(Duration::from_millis(1));
        let initial_ms = u64::try_from(initial.as_millis()).unwrap_or(u64::MAX);
        once(initial.min(self.max_interval)).chain(
            ExponentialBackoff::from_millis(2)
                .factor(initial_ms)
                .max_delay(self.max_interval),
        )
    }
}

/// Time spent in one waiting stage of a relay.
#[derive(Debug)]
pub struct PollBudget {
    pub stage: RelayStage,
    pub started: Instant,
    max_wait: Duration,
    max_interval: Duration,
    backoff: PollDelays,
}

impl PollBudget {
    pub fn start(stage: RelayStage, config: &PollConfig) -> Self {
        Self {
            stage,
            started: Instant::now(),
            max_wait: config.max_wait,
            max_interval: config.max_interval,
            backoff: config.backoff(),
        }
    }

    pub fn waited(&self) -> Duration {
        self.started.elapsed()
    }

    /// Sleeps until the next attempt is due, or fails once the budget is spent.
    pub async fn wait(&mut self) -> Result<(), RelayError> {
        let waited = self.waited();
        if waited >= self.max_wait {
            return Err(RelayError::Timeout {
                stage: self.stage,
                waited,
            });
        }
        let delay = self
            .backoff
            .next()
            .unwrap_or(self.max_interval)
            .min(self.max_wait - waited);
        debug!("Waiting {delay:?} for {} ({waited:?} elapsed).", self.stage);
        sleep(delay).await;
        Ok(())
    }
}

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

/// Retries `$e` up to `$n` more times with exponential backoff, returning the last error.
#[macro_export]
macro_rules! retry {
    ($n:expr, $e:expr) => {
        $crate::retry!($n, 250, 1000, $e)
    };
    ($n:expr, $m:literal, $e:expr) => {
        $crate::retry!($n, 250, $m, $e)
    };
    ($n:expr, $b:literal, $m:literal, $e:expr) => {
        tokio_retry::Retry::spawn(
            tokio_retry::strategy::ExponentialBackoff::from_millis($b)
                .max_delay(std::time::Duration::from_millis($m))
                .take($n),
            || async {
                let res = $e;
                if let Err(err) = &res {
                    tracing::error!("(Retrying) {err:?}");
                }
                res
            },
        )
    };
}

/// Like [retry], but each attempt is abandoned after `$t` seconds.
#[macro_export]
macro_rules! retry_timeout {
    ($n:expr, $e:expr) => {
        $crate::retry_timeout!($n, 2, 250, 1000, $e)
    };
    ($n:expr, $t:expr, $e:expr) => {
        $crate::retry_timeout!($n, $t, 250, 1000, $e)
    };
    ($n:expr, $t:expr, $b:literal, $m:literal, $e:expr) => {
        $crate::retry!(
            $n,
            $b,
            $m,
            tokio::time::timeout(core::time::Duration::from_secs($t), async { $e })
                .await
                .map_err(anyhow::Error::from)
                .and_then(|res| res)
        )
    };
}

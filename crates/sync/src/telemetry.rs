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

use anyhow::anyhow;
use opentelemetry::global::{meter, set_meter_provider, set_tracer_provider};
use opentelemetry::metrics::{Counter, Gauge, Meter};
use opentelemetry::KeyValue;
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider, Temporality};
use opentelemetry_sdk::{runtime::Tokio, trace::TracerProvider, Resource};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(clap::Args, Debug, Clone, Default)]
pub struct TelemetryArgs {
    /// OTLP Collector endpoint address
    #[clap(long, env, num_args = 0..=1, default_missing_value = "http://localhost:4317")]
    pub otlp_collector: Option<String>,
}

pub fn init_tracer_provider(args: &TelemetryArgs) -> anyhow::Result<()> {
    if let Some(otlp_collector) = &args.otlp_collector {
        println!("OTLP Collector endpoint: {otlp_collector}");
        // Build and set default global tracer provider
        set_tracer_provider(
            TracerProvider::builder()
                .with_batch_exporter(
                    SpanExporter::builder()
                        .with_tonic()
                        .with_endpoint(otlp_collector)
                        .build()?,
                    Tokio,
                )
                .with_resource(Resource::new(vec![KeyValue::new("service.name", "ferry")]))
                .build(),
        );
        // Build and set default global meter provider
        set_meter_provider(
            SdkMeterProvider::builder()
                .with_reader(
                    PeriodicReader::builder(
                        MetricExporter::builder()
                            .with_temporality(Temporality::Delta)
                            .with_tonic()
                            .with_endpoint(otlp_collector)
                            .build()?,
                        Tokio,
                    )
                    .build(),
                )
                .with_resource(Resource::new(vec![KeyValue::new("service.name", "ferry")]))
                .build(),
        )
    }
    Ok(())
}

/// Maps a `-v` count to a log level. `RUST_LOG` takes precedence when set.
pub fn verbosity_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn init_tracing_subscriber(verbosity: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_level(verbosity).as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!("{err}"))
}

#[macro_export]
macro_rules! await_tel {
    ($c:ident, $e:expr) => {
        $e.with_context($c.clone()).await
    };
    ($c:ident, $t:ident, $l:literal, $e:expr) => {
        $e.with_context($c.with_span($t.start_with_context($l, &$c)))
            .await
    };
}

#[macro_export]
macro_rules! await_tel_res {
    ($c:ident, $e:expr, $l:literal) => {
        $crate::await_tel!($c, $e).context($l)
    };
    ($c:ident, $t:ident, $l:literal, $e:expr) => {
        $crate::await_tel!($c, $t, $l, $e).context($l)
    };
}

/// A collection of instruments for reporting relay progress
pub struct RelayTelemetry {
    /// Global meter object
    pub meter: Meter,
    /// Messages submitted to the L1 messenger
    pub submit_count: Counter<u64>,
    /// Submissions rejected by the L2 node or signer
    pub submit_errs: Counter<u64>,
    /// Receipt and proof polls that found nothing yet
    pub poll_count: Counter<u64>,
    /// Completed L1 inclusion checks, labelled by outcome
    pub verify_count: Counter<u64>,
    /// Failed relays, labelled by error kind
    pub verify_errs: Counter<u64>,
    /// Batch number of the most recent verified message
    pub verify_last_batch: Gauge<u64>,
}

impl Default for RelayTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayTelemetry {
    pub fn new() -> Self {
        let meter = meter("ferry");
        let submit_count = meter.u64_counter("relay.submit.count").build();
        let submit_errs = meter.u64_counter("relay.submit.errs").build();
        let poll_count = meter.u64_counter("relay.poll.count").build();
        let verify_count = meter.u64_counter("relay.verify.count").build();
        let verify_errs = meter.u64_counter("relay.verify.errs").build();
        let verify_last_batch = meter.u64_gauge("relay.verify.last_batch").build();

        Self {
            meter,
            submit_count,
            submit_errs,
            poll_count,
            verify_count,
            verify_errs,
            verify_last_batch,
        }
    }
}

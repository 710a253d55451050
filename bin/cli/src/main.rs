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

use clap::Parser;
use ferry_cli::Cli;
use ferry_sync::telemetry::{init_tracer_provider, init_tracing_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_subscriber(cli.verbosity())?;
    init_tracer_provider(cli.telemetry_args())?;

    match cli {
        Cli::Send(args) => ferry_cli::send::send(args).await?,
        Cli::Verify(args) => ferry_cli::verify::verify(args).await?,
        Cli::Relay(args) => ferry_cli::relay::relay(args).await?,
    }
    Ok(())
}

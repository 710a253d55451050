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

use anyhow::bail;
use ferry_common::message::Message;
use ferry_sync::telemetry::TelemetryArgs;

pub mod relay;
pub mod send;
pub mod verify;

#[derive(clap::Parser, Debug, Clone)]
#[command(name = "ferry")]
#[command(bin_name = "ferry")]
#[command(author, version, about, long_about = None)]
pub enum Cli {
    /// Send a message to L1 and print the L2 transaction hash
    Send(send::SendArgs),
    /// Check an already sent message against the settlement contract
    Verify(verify::VerifyArgs),
    /// Send a message and wait until its inclusion is verified on L1
    Relay(relay::RelayArgs),
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        match self {
            Cli::Send(args) => args.v,
            Cli::Verify(args) => args.v,
            Cli::Relay(args) => args.v,
        }
    }

    pub fn telemetry_args(&self) -> &TelemetryArgs {
        match self {
            Cli::Send(args) => &args.sync.telemetry,
            Cli::Verify(args) => &args.sync.telemetry,
            Cli::Relay(args) => &args.sync.telemetry,
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct MessageArgs {
    /// Message text, relayed as its utf-8 bytes
    #[clap(long, env, conflicts_with = "message_hex")]
    pub message: Option<String>,
    /// Message bytes in hex
    #[clap(long, env)]
    pub message_hex: Option<String>,
}

impl MessageArgs {
    pub fn message(&self) -> anyhow::Result<Message> {
        match (&self.message, &self.message_hex) {
            (Some(text), None) => Message::try_from(text.as_str()),
            (None, Some(hex)) => Message::from_hex(hex),
            _ => bail!("Exactly one of --message or --message-hex is required"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_parse_relay() {
        let cli = Cli::try_parse_from([
            "ferry",
            "relay",
            "-vvv",
            "--l2-rpc-url",
            "http://localhost:3050",
            "--eth-rpc-url",
            "http://localhost:8545",
            "--sender-key",
            DEV_KEY,
            "--message",
            "hello",
            "--max-wait-secs",
            "60",
        ])
        .unwrap();
        assert_eq!(cli.verbosity(), 3);
        assert!(cli.telemetry_args().otlp_collector.is_none());
        let Cli::Relay(args) = cli else {
            panic!("expected relay");
        };
        assert_eq!(args.sync.poll.max_wait_secs, 60);
        assert_eq!(args.sync.poll.poll_interval_ms, 1_000);
        assert_eq!(args.txn_args.exec_gas_premium, 25);
        assert_eq!(args.message.message().unwrap().as_bytes(), b"hello");
    }

    #[test]
    fn test_parse_send() {
        let args = [
            "ferry",
            "send",
            "--l2-rpc-url",
            "http://localhost:3050",
            "--eth-rpc-url",
            "http://localhost:8545",
            "--sender-key",
            DEV_KEY,
            "--message",
            "hello",
        ];
        let Cli::Send(send) = Cli::try_parse_from(args).unwrap() else {
            panic!("expected send");
        };
        assert!(!send.wait);

        let cli = Cli::try_parse_from(args.into_iter().chain(["--wait"])).unwrap();
        let Cli::Send(send) = cli else {
            panic!("expected send");
        };
        assert!(send.wait);
    }

    #[test]
    fn test_parse_verify() {
        let cli = Cli::try_parse_from([
            "ferry",
            "verify",
            "--l2-rpc-url",
            "http://localhost:3050",
            "--eth-rpc-url",
            "http://localhost:8545",
            "--tx-hash",
            &format!("0x{}", "11".repeat(32)),
            "--sender",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "--message-hex",
            "0x68656c6c6f",
        ])
        .unwrap();
        assert_eq!(cli.verbosity(), 0);
        let Cli::Verify(args) = cli else {
            panic!("expected verify");
        };
        assert_eq!(
            args.message.message().unwrap(),
            Message::try_from("hello").unwrap()
        );
    }

    #[test]
    fn test_message_args() {
        let args = MessageArgs {
            message: None,
            message_hex: None,
        };
        assert!(args.message().is_err());
        let args = MessageArgs {
            message: Some(String::new()),
            message_hex: None,
        };
        assert!(args.message().is_err());
    }
}

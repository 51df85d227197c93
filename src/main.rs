//! Binary entrypoint for the chat relay server.

use std::process::ExitCode;

use chat_relay::start_chat_relay;

/// Serve chat turns until interrupted.
fn main() -> ExitCode {
    start_chat_relay::run()
}

//! HTTP relay forwarding chat turns to a completion API with bounded per-conversation history.

// Strict lint policy
#![deny(unsafe_code)] // No unsafe code anywhere
#![deny(missing_docs)] // Every public item is documented
#![deny(non_camel_case_types)] // Types are CamelCase
#![deny(unused_imports)] // No unused imports
#![deny(unused_variables)] // No unused variables
#![deny(unused_must_use)] // Results and must_use values are handled
#![deny(non_snake_case)] // Functions and variables are snake_case
#![deny(non_upper_case_globals)] // Constants and statics are UPPER_CASE
#![deny(nonstandard_style)] // No nonstandard naming
#![forbid(unsafe_op_in_unsafe_fn)] // Unsafe ops need their own block, even in unsafe fns

// Clippy
#![deny(clippy::all)] // Standard lints
#![deny(clippy::pedantic)] // Strict lints
#![deny(clippy::unwrap_used)] // No unwrap()
#![deny(clippy::expect_used)] // No expect()
#![deny(clippy::panic)] // No panic!()
#![deny(clippy::print_stdout)] // No println!() in production
#![deny(clippy::todo)] // No todo!()
#![deny(clippy::unimplemented)] // No unimplemented!()
#![deny(clippy::unwrap_in_result)] // No unwrap() inside functions returning Result
#![deny(clippy::module_inception)] // No module named after its parent
#![deny(clippy::redundant_clone)] // No needless clones
#![deny(clippy::shadow_unrelated)] // No shadowing with unrelated values
#![deny(clippy::too_many_arguments)] // Keep signatures short
#![deny(clippy::cognitive_complexity)] // Keep functions simple

#![deny(overflowing_literals)] // No literals that overflow their type

/// Relay configuration loaded from the environment.
pub mod config;
/// Bounded in-memory conversation history.
pub mod conversation;
/// Completion provider clients.
pub mod llm;
/// HTTP server and API routes.
#[allow(clippy::missing_errors_doc, clippy::unused_async)]
pub mod server;
/// Entry helpers to start the relay.
pub mod start_chat_relay;

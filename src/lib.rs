//! `farm-market-client` - client library for a farmers-market marketplace
//!
//! Consumers browse the catalog, keep a cart on the device and check out: the order
//! is created, paid for and optionally collected at the market office. Farmers manage
//! their listings, orders, farm profile and notifications through the same backend.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_types_passed_by_value,
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Complexity and readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::too_many_lines,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::result_large_err,
)]

/// Backend client - typed access to the market endpoints
pub mod client;
/// Configuration for the backend, retries, local storage and pickups
pub mod config;
/// Core business logic - cart, checkout flow and on-device records
pub mod core;
/// SeaORM entity definitions for local storage
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Tracing subscriber setup
pub mod logging;
/// Wire and domain models shared by the client and core
pub mod models;

#[cfg(test)]
pub mod test_utils;

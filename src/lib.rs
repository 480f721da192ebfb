//! # Mason
//!
//! Wraps a parallel, graph-driven external build tool: runs it as a
//! subprocess with live terminal-aware output, and accumulates the artifact
//! lists that concurrently-running build rules export, draining them
//! deterministically at the end of the build.
//!
//! ## Modules
//!
//! - `config` - Per-invocation configuration, cache-key suffix derivation
//! - `registry` - Thread-safe registry of exported build artifacts
//! - `subprocess` - External-tool invocation and output relay
//! - `term` - Terminal capability probing and ANSI stripping
pub mod config;
pub mod registry;
pub mod subprocess;
pub mod term;

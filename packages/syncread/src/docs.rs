//! Syncread's docs, baked into Rust modules
//!
//! - [Ch. 1: The channel protocol](ch_1_protocol)
#![allow(rustdoc::invalid_rust_codeblocks)]
#![cfg(not(doctest))]

#[doc = include_str!("../../../docs/PROTOCOL.md")]
pub mod ch_1_protocol {}

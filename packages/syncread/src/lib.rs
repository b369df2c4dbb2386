//! Two in-memory byte channels, alpha and beta, synchronized by one shared monitor.
//!
//! Each channel is a fixed-capacity append-only buffer. A writer opens it exclusively, appends,
//! and closes it. Readers open it at any time and observe bytes as they are written, blocking at
//! the end of the data while a writer is still open. See [the protocol docs](docs::ch_1_protocol).

#[macro_use]
extern crate tracing;

pub extern crate bytes;

mod arena;
mod config;
mod device;
mod monitor;
pub mod docs;

pub use crate::{
    config::{AdmissionPolicy, Config, CAPACITY},
    device::{
        api::*,
        state::{ChannelId, ChannelSnapshot},
    },
    monitor::Signal,
};

/// Error types
pub mod error {
    pub use crate::device::error::*;
}

#[cfg(test)]
mod tests;

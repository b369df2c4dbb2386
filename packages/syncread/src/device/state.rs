// per-channel mutable state, guarded as a whole by the device monitor.

use crate::{
    arena::Arena,
    error::UnknownChannel,
};
use std::{
    fmt::{self, Display, Formatter},
    ops::{Index, IndexMut},
};


/// Identity of one of the two channels of a device
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ChannelId {
    /// Channel with minor number 0
    Alpha = 0,
    /// Channel with minor number 1
    Beta = 1,
}

impl ChannelId {
    /// Both channels, in minor number order
    pub const ALL: [ChannelId; 2] = [ChannelId::Alpha, ChannelId::Beta];

    /// Minor number the channel is dispatched by
    pub fn minor(self) -> u32 {
        self as u32
    }

    /// Name the channel is registered under
    pub fn name(self) -> &'static str {
        match self {
            ChannelId::Alpha => "alpha",
            ChannelId::Beta => "beta",
        }
    }

    /// The channel that is not this one
    pub fn other(self) -> ChannelId {
        match self {
            ChannelId::Alpha => ChannelId::Beta,
            ChannelId::Beta => ChannelId::Alpha,
        }
    }
}

impl TryFrom<u32> for ChannelId {
    type Error = UnknownChannel;

    fn try_from(minor: u32) -> Result<Self, UnknownChannel> {
        match minor {
            0 => Ok(ChannelId::Alpha),
            1 => Ok(ChannelId::Beta),
            n => Err(UnknownChannel(n)),
        }
    }
}

impl Display for ChannelId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}


// state of a single channel.
//
// intended invariants, maintained by the admission, transfer and release modules:
//
// - write_position <= arena capacity.
// - readable_length <= write_position.
pub(crate) struct ChannelState {
    // fixed store of written bytes.
    pub(crate) arena: Arena,
    // offset the next write appends at. shared by every writer of the channel.
    pub(crate) write_position: usize,
    // offset up to which bytes are valid for readers.
    pub(crate) readable_length: usize,
    // open writer handles.
    pub(crate) writer_count: usize,
    // open reader handles. no operation currently counts readers, so this stays 0.
    pub(crate) reader_count: usize,
    // writer-opens waiting for admission (see AdmissionPolicy for how each policy counts).
    pub(crate) pending_write_opens: usize,
}

impl ChannelState {
    pub(crate) fn new(capacity: usize) -> Self {
        ChannelState {
            arena: Arena::new(capacity),
            write_position: 0,
            readable_length: 0,
            writer_count: 0,
            reader_count: 0,
            pending_write_opens: 0,
        }
    }

    pub(crate) fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            write_position: self.write_position,
            readable_length: self.readable_length,
            writer_count: self.writer_count,
            reader_count: self.reader_count,
            pending_write_opens: self.pending_write_opens,
        }
    }
}

/// Counters and cursors of a channel, read atomically with respect to every channel operation
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct ChannelSnapshot {
    /// Offset the next write appends at
    pub write_position: usize,
    /// Offset up to which bytes are valid for readers
    pub readable_length: usize,
    /// Number of writers currently counted as open
    pub writer_count: usize,
    /// Number of readers currently counted as open
    pub reader_count: usize,
    /// Number of writer-opens counted as pending admission
    ///
    /// Under [`AdmissionPolicy::PerChannel`](crate::AdmissionPolicy::PerChannel) this is the
    /// number of writer-opens currently waiting on this channel, for both alpha and beta. Under
    /// [`AdmissionPolicy::Legacy`](crate::AdmissionPolicy::Legacy) it is counted for alpha only
    /// and never decremented, so beta always reports 0.
    pub pending_write_opens: usize,
}


// the state of both channels of a device. this is what the device monitor guards.
pub(crate) struct Channels(pub(crate) [ChannelState; 2]);

impl Channels {
    // allocate both channels with zeroed buffers and counters.
    pub(crate) fn new(capacity: usize) -> Self {
        debug!(capacity, "inserting device");
        Channels([ChannelState::new(capacity), ChannelState::new(capacity)])
    }
}

impl Index<ChannelId> for Channels {
    type Output = ChannelState;

    fn index(&self, id: ChannelId) -> &ChannelState {
        &self.0[id as usize]
    }
}

impl IndexMut<ChannelId> for Channels {
    fn index_mut(&mut self, id: ChannelId) -> &mut ChannelState {
        &mut self.0[id as usize]
    }
}

impl Drop for Channels {
    fn drop(&mut self) {
        debug!("removing device");
    }
}

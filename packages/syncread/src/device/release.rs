// close-for-write and close-for-read.

use super::state::{Channels, ChannelId};
use crate::monitor::MonitorGuard;


// release writer exclusivity of channel `id` and wake everyone so blocked readers and
// writer-opens re-check. always succeeds.
pub(crate) fn close_writer(mut guard: MonitorGuard<'_, Channels>, id: ChannelId) {
    let channel = &mut guard[id];
    match channel.writer_count.checked_sub(1) {
        Some(n) => channel.writer_count = n,
        None => warn!(channel = %id, "close for write with no writer open"),
    }
    guard.broadcast();
    trace!(channel = %id, "close for write successful");
}

// closing a read-only handle has no effect on channel state.
pub(crate) fn close_reader(guard: MonitorGuard<'_, Channels>, id: ChannelId) {
    trace!(channel = %id, "close for read");
    drop(guard);
}

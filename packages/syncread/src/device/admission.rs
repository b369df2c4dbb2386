// open-for-write and open-for-read handshakes.
//
// each function is handed the acquired monitor and releases it by dropping the guard on return.

use super::state::{Channels, ChannelId};
use crate::{
    config::AdmissionPolicy,
    error::InterruptedWait,
    monitor::{MonitorGuard, Signal, Wake},
};


// admit a writer to channel `id`, blocking while the policy's admission predicate says another
// party holds the channel.
pub(crate) fn open_for_write(
    guard: MonitorGuard<'_, Channels>,
    id: ChannelId,
    policy: AdmissionPolicy,
    signal: &Signal,
) -> Result<(), InterruptedWait> {
    trace!(channel = %id, "open request for write");
    match policy {
        AdmissionPolicy::PerChannel => open_for_write_per_channel(guard, id, signal),
        AdmissionPolicy::Legacy => open_for_write_legacy(guard, id, signal),
    }
}

fn open_for_write_per_channel(
    mut guard: MonitorGuard<'_, Channels>,
    id: ChannelId,
    signal: &Signal,
) -> Result<(), InterruptedWait> {
    guard[id].pending_write_opens += 1;
    while guard[id].writer_count > 0 {
        let (g, wake) = guard.wait(signal);
        guard = g;
        if wake == Wake::Interrupted {
            guard[id].pending_write_opens -= 1;
            // our departure may change what other waiters are waiting for
            guard.broadcast();
            debug!(channel = %id, "open for write interrupted");
            return Err(InterruptedWait);
        }
    }
    guard[id].pending_write_opens -= 1;
    admit_writer(&mut guard, id);
    Ok(())
}

fn open_for_write_legacy(
    mut guard: MonitorGuard<'_, Channels>,
    id: ChannelId,
    signal: &Signal,
) -> Result<(), InterruptedWait> {
    let other = id.other();
    if id == ChannelId::Alpha {
        guard[id].pending_write_opens += 1;
    }
    while guard[other].writer_count > 0 || guard[other].reader_count > 0 {
        let (g, wake) = guard.wait(signal);
        guard = g;
        if wake == Wake::Interrupted {
            guard.broadcast();
            let channel = &mut guard[id];
            if channel.writer_count == 0 && channel.reader_count == 0 {
                channel.write_position = 0;
            }
            channel.writer_count += 1;
            debug!(channel = %id, "open for write interrupted");
            return Err(InterruptedWait);
        }
    }
    admit_writer(&mut guard, id);
    Ok(())
}

// state transition for a writer that passed the admission wait.
fn admit_writer(guard: &mut MonitorGuard<'_, Channels>, id: ChannelId) {
    let channel = &mut guard[id];
    if channel.writer_count == 0 && channel.reader_count == 0 {
        // a fresh writer on an idle channel rewinds the stream
        channel.write_position = 0;
    }
    channel.writer_count += 1;
    channel.readable_length = 0;
    guard.broadcast();
    trace!(channel = %id, "open for write successful");
}

// admit a reader to channel `id`. readers are never refused and never counted.
pub(crate) fn open_for_read(guard: MonitorGuard<'_, Channels>, id: ChannelId) {
    trace!(channel = %id, "open for read");
    drop(guard);
}

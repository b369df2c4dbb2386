// read and write paths.

use super::state::{Channels, ChannelId};
use crate::{
    error::{ReadError, TransferFault, InterruptedWait},
    monitor::{MonitorGuard, Signal, Wake},
};
use bytes::{Buf, BufMut};


// read up to `count` bytes of channel `id` starting at `*cursor` into `dst`.
//
// - blocks while the cursor is at or past the readable length and a writer is still open.
// - a request reaching past the readable length is shortened, never an error. returns 0 at end
//   of stream.
// - advances `*cursor` by the number of bytes read, and only on success.
pub(crate) fn read(
    mut guard: MonitorGuard<'_, Channels>,
    id: ChannelId,
    count: usize,
    cursor: &mut usize,
    dst: &mut dyn BufMut,
    signal: &Signal,
) -> Result<usize, ReadError> {
    while *cursor >= guard[id].readable_length && guard[id].writer_count > 0 {
        let (g, wake) = guard.wait(signal);
        guard = g;
        if wake == Wake::Interrupted {
            guard.broadcast();
            trace!(channel = %id, "read interrupted");
            return Err(InterruptedWait.into());
        }
    }

    let channel = &guard[id];
    let count = count.min(channel.readable_length.saturating_sub(*cursor));
    trace!(channel = %id, count, offset = *cursor, "read");
    channel.arena.copy_out(*cursor, count, dst)?;
    *cursor += count;
    Ok(count)
}

// append up to `count` bytes from `src` to channel `id` at its shared write position.
//
// bytes that would land past capacity are dropped. never blocks. returns the number of bytes
// actually written.
pub(crate) fn write(
    mut guard: MonitorGuard<'_, Channels>,
    id: ChannelId,
    count: usize,
    src: &mut dyn Buf,
) -> Result<usize, TransferFault> {
    let channel = &mut guard[id];
    let offset = channel.write_position;
    let requested = count;
    let count = channel.arena.clamp(offset, count);
    trace!(channel = %id, count, offset, requested, "write");
    channel.arena.copy_in(offset, count, src)?;
    channel.write_position += count;
    channel.readable_length = channel.write_position;
    guard.broadcast();
    Ok(count)
}

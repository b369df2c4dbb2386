// exposed API of the device.

use super::{
    admission,
    release,
    transfer,
    state::{Channels, ChannelId, ChannelSnapshot},
};
use crate::{
    config::{AdmissionPolicy, Config},
    error::*,
    monitor::{Monitor, Signal},
};
use bytes::{Buf, BufMut};
use std::{
    fmt::{self, Debug, Formatter},
    io,
    sync::Arc,
};


/// Pair of synchronized byte channels, alpha and beta, sharing one monitor
///
/// Constructing a device allocates and zeroes both channel buffers. They live until the last
/// clone of the device and of any [`Channel`], [`Reader`], [`Writer`] or [`Signal`] derived from
/// it is dropped.
///
/// See [the protocol docs](crate::docs::ch_1_protocol).
///
/// ```
/// use std::io::{Read, Write};
/// use syncread::{ChannelId, Device};
///
/// let device = Device::default();
/// let channel = device.channel(ChannelId::Alpha);
///
/// let mut writer = channel.open_writer().unwrap();
/// writer.write_all(b"hello").unwrap();
/// drop(writer);
///
/// let mut out = String::new();
/// channel.open_reader().read_to_string(&mut out).unwrap();
/// assert_eq!(out, "hello");
/// ```
#[derive(Clone)]
pub struct Device {
    monitor: Arc<Monitor<Channels>>,
    config: Config,
}

impl Device {
    /// Create a device with both channels idle and zeroed
    pub fn new(config: Config) -> Self {
        Device {
            monitor: Arc::new(Monitor::new(Channels::new(config.capacity()))),
            config,
        }
    }

    /// The configuration the device was created with
    pub fn config(&self) -> Config {
        self.config
    }

    /// Capacity in bytes of each channel
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Get a handle to one of the channels
    pub fn channel(&self, id: ChannelId) -> Channel {
        Channel {
            monitor: Arc::clone(&self.monitor),
            policy: self.config.admission(),
            id,
        }
    }

    /// Get a handle to the channel with the given minor number
    pub fn channel_by_minor(&self, minor: u32) -> Result<Channel, UnknownChannel> {
        ChannelId::try_from(minor).map(|id| self.channel(id))
    }

    /// Create a new, unraised signal for interrupting operations on this device
    pub fn signal(&self) -> Signal {
        Signal::new(self.monitor.clone())
    }
}

impl Default for Device {
    fn default() -> Self {
        Device::new(Config::default())
    }
}

impl Debug for Device {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Device")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}


/// Operations a channel exposes to its host
///
/// Every operation runs with the device monitor held. Operations on different channels of the
/// same device are therefore mutually exclusive, even though their state is independent.
pub trait ChannelOps {
    /// Admit a writer, blocking while the admission policy says the channel is held
    ///
    /// On success the channel counts one more writer, its readable length is reset to 0, and if
    /// the channel was idle its write position is rewound to 0. The caller must eventually
    /// balance this with [`close_writer`](Self::close_writer). Panics if `signal` was created from
    /// a different device.
    fn open_for_write(&self, signal: &Signal) -> Result<(), InterruptedWait>;

    /// Admit a reader. Never blocks, never refuses, and does not count the reader.
    fn open_for_read(&self);

    /// Release one writer and wake every blocked operation on the device
    fn close_writer(&self);

    /// Release a reader. Has no effect on channel state.
    fn close_reader(&self);

    /// Read up to `count` bytes starting at `*cursor` into `dst`
    ///
    /// Blocks while `*cursor` is at or past the readable length and a writer is open. A request
    /// past the readable length is shortened; 0 means end of stream. On success `*cursor` is
    /// advanced by the returned count. Panics if `signal` was created from a different device.
    fn read(
        &self,
        count: usize,
        cursor: &mut usize,
        dst: &mut dyn BufMut,
        signal: &Signal,
    ) -> Result<usize, ReadError>;

    /// Append up to `count` bytes from `src` at the channel's write position
    ///
    /// Bytes that do not fit in the channel's capacity are silently dropped. The returned count is
    /// the number of bytes actually written. Never blocks.
    fn write(&self, count: usize, src: &mut dyn Buf) -> Result<usize, TransferFault>;
}


/// Handle to one channel of a [`Device`]
///
/// Cloning produces another handle to the same channel.
#[derive(Clone)]
pub struct Channel {
    monitor: Arc<Monitor<Channels>>,
    policy: AdmissionPolicy,
    id: ChannelId,
}

impl Channel {
    /// Which channel this is
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Create a new, unraised signal for interrupting operations on this channel's device
    pub fn signal(&self) -> Signal {
        Signal::new(self.monitor.clone())
    }

    /// Read the channel's counters and cursors
    pub fn snapshot(&self) -> ChannelSnapshot {
        self.monitor.lock()[self.id].snapshot()
    }

    /// Open for writing with a fresh signal
    ///
    /// Blocks while another writer holds the channel. Use [`open_writer_with`](Self::open_writer_with)
    /// to be able to interrupt the wait.
    pub fn open_writer(&self) -> Result<Writer, InterruptedWait> {
        self.open_writer_with(self.signal())
    }

    /// Open for writing, interruptible through `signal`
    ///
    /// The writer keeps `signal` for its own operations.
    ///
    /// # Panics
    ///
    /// Panics if `signal` was created from a different device.
    pub fn open_writer_with(&self, signal: Signal) -> Result<Writer, InterruptedWait> {
        self.open_for_write(&signal)?;
        Ok(Writer {
            channel: self.clone(),
            signal,
        })
    }

    /// Open for reading with a fresh signal, starting at offset 0
    pub fn open_reader(&self) -> Reader {
        self.open_reader_with(self.signal())
    }

    /// Open for reading, with reads interruptible through `signal`, starting at offset 0
    ///
    /// # Panics
    ///
    /// Panics if `signal` was created from a different device.
    pub fn open_reader_with(&self, signal: Signal) -> Reader {
        self.assert_own_signal(&signal);
        self.open_for_read();
        Reader {
            channel: self.clone(),
            signal,
            position: 0,
        }
    }

    // a foreign signal would broadcast on the wrong monitor and never wake our waiters.
    fn assert_own_signal(&self, signal: &Signal) {
        assert!(signal.wakes(&self.monitor), "signal belongs to a different device");
    }
}

impl ChannelOps for Channel {
    fn open_for_write(&self, signal: &Signal) -> Result<(), InterruptedWait> {
        self.assert_own_signal(signal);
        admission::open_for_write(self.monitor.lock(), self.id, self.policy, signal)
    }

    fn open_for_read(&self) {
        admission::open_for_read(self.monitor.lock(), self.id)
    }

    fn close_writer(&self) {
        release::close_writer(self.monitor.lock(), self.id)
    }

    fn close_reader(&self) {
        release::close_reader(self.monitor.lock(), self.id)
    }

    fn read(
        &self,
        count: usize,
        cursor: &mut usize,
        dst: &mut dyn BufMut,
        signal: &Signal,
    ) -> Result<usize, ReadError> {
        self.assert_own_signal(signal);
        transfer::read(self.monitor.lock(), self.id, count, cursor, dst, signal)
    }

    fn write(&self, count: usize, src: &mut dyn Buf) -> Result<usize, TransferFault> {
        transfer::write(self.monitor.lock(), self.id, count, src)
    }
}

impl Debug for Channel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}


/// Open writer handle to a channel
///
/// Dropping the writer closes it, which wakes readers blocked at the end of the data.
pub struct Writer {
    channel: Channel,
    signal: Signal,
}

impl Writer {
    /// Which channel this writes to
    pub fn channel_id(&self) -> ChannelId {
        self.channel.id
    }

    /// The signal this writer was opened with
    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    /// Append `src` at the channel's write position, returning how many bytes fit
    pub fn write(&mut self, mut src: &[u8]) -> usize {
        // a slice always holds the bytes it claims to, so the transfer can not fault
        self.channel.write(src.len(), &mut src).unwrap_or(0)
    }

    /// Append up to `count` bytes taken from `src`, returning how many bytes fit
    pub fn write_buf(&mut self, count: usize, src: &mut dyn Buf) -> Result<usize, TransferFault> {
        self.channel.write(count, src)
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Writer::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        self.channel.close_writer();
    }
}

impl Debug for Writer {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Writer")
            .field("channel", &self.channel.id)
            .finish_non_exhaustive()
    }
}


/// Open reader handle to a channel
///
/// The reader owns its cursor. Reading at the end of the data blocks while the channel has an
/// open writer, and returns 0 once it does not.
pub struct Reader {
    channel: Channel,
    signal: Signal,
    position: usize,
}

impl Reader {
    /// Which channel this reads from
    pub fn channel_id(&self) -> ChannelId {
        self.channel.id
    }

    /// The signal that interrupts this reader's blocking reads
    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    /// Offset the next read starts at
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor to an absolute offset
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Read into `dst`, returning how many bytes were read
    pub fn read(&mut self, mut dst: &mut [u8]) -> Result<usize, ReadError> {
        let count = dst.len();
        self.channel.read(count, &mut self.position, &mut dst, &self.signal)
    }

    /// Read up to `count` bytes into `dst`
    pub fn read_buf(&mut self, count: usize, dst: &mut dyn BufMut) -> Result<usize, ReadError> {
        self.channel.read(count, &mut self.position, dst, &self.signal)
    }
}

impl io::Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(Reader::read(self, buf)?)
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        self.channel.close_reader();
    }
}

impl Debug for Reader {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Reader")
            .field("channel", &self.channel.id)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

//! Device configuration.

/// Capacity in bytes of each channel's buffer unless configured otherwise
pub const CAPACITY: usize = 8192;

/// Configuration for a [`Device`](crate::Device)
///
/// ```
/// use syncread::{AdmissionPolicy, Config, Device};
///
/// let device = Device::new(Config::default().with_admission(AdmissionPolicy::PerChannel));
/// assert_eq!(device.capacity(), syncread::CAPACITY);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Config {
    capacity: usize,
    admission: AdmissionPolicy,
}

/// Rule a writer-open uses to decide whether it must wait
///
/// See [the protocol docs](crate::docs::ch_1_protocol).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum AdmissionPolicy {
    /// A writer-open of a channel waits while that channel has an active writer
    ///
    /// An interrupted writer-open leaves channel state untouched.
    #[default]
    PerChannel,
    /// Bug-compatible emulation of the legacy syncread driver's admission
    ///
    /// - A writer-open of a channel waits while the *other* channel has an active writer or
    ///   reader, so writer exclusivity is not enforced per channel.
    /// - An interrupted writer-open still rewinds an idle channel and counts a writer before
    ///   failing. That writer slot is never released.
    /// - Pending writer-opens are counted only for alpha, and never decremented.
    Legacy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            capacity: CAPACITY,
            admission: AdmissionPolicy::default(),
        }
    }
}

impl Config {
    /// Capacity in bytes of each channel's buffer
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Writer admission policy
    pub fn admission(&self) -> AdmissionPolicy {
        self.admission
    }

    /// Set the capacity in bytes of each channel's buffer
    pub fn set_capacity(&mut self, capacity: usize) -> &mut Self {
        self.capacity = capacity;
        self
    }

    /// Builder version of [`set_capacity`](Self::set_capacity)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.set_capacity(capacity);
        self
    }

    /// Set the writer admission policy
    pub fn set_admission(&mut self, admission: AdmissionPolicy) -> &mut Self {
        self.admission = admission;
        self
    }

    /// Builder version of [`set_admission`](Self::set_admission)
    pub fn with_admission(mut self, admission: AdmissionPolicy) -> Self {
        self.set_admission(admission);
        self
    }
}

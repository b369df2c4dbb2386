// device error types.

use std::io;
use thiserror::Error;


// ==== base error types ====


/// Error for a blocking operation whose wait was interrupted by its [`Signal`](crate::Signal)
///
/// The operation had no effect on channel state. It is not retried internally; the caller may
/// retry the whole operation.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[error("wait interrupted")]
pub struct InterruptedWait;

/// Error for a caller-side buffer that could not take part in the requested transfer
///
/// A destination with too little room, or a source holding too few bytes. The operation aborted
/// before any byte was copied and without moving any cursor.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[error("invalid caller buffer for transfer")]
pub struct TransferFault;

/// Error for a minor number that names no channel of the device
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[error("no channel with minor number {0}")]
pub struct UnknownChannel(pub u32);


// ==== compound error types ====


/// Error for trying to read from a channel
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ReadError {
    /// The reader was waiting for a writer to extend the data and was interrupted
    #[error(transparent)]
    Interrupted(#[from] InterruptedWait),
    /// The destination buffer could not receive the bytes
    #[error(transparent)]
    Fault(#[from] TransferFault),
}


// ==== conversions into io errors ====


impl From<InterruptedWait> for io::Error {
    fn from(e: InterruptedWait) -> Self {
        io::Error::new(io::ErrorKind::Interrupted, e)
    }
}

impl From<TransferFault> for io::Error {
    fn from(e: TransferFault) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, e)
    }
}

impl From<ReadError> for io::Error {
    fn from(e: ReadError) -> Self {
        match e {
            ReadError::Interrupted(e) => e.into(),
            ReadError::Fault(e) => e.into(),
        }
    }
}

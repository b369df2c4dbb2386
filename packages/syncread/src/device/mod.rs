// implementation of the syncread device.
//
// the architecture is as such:
//
// device handles wrap around Arc<Monitor<both channels' state>>
//                                   |
//          /------------------------/
//          v
//       monitor
//          |
//          |------ one mutex around the state of both channels. every operation on either
//          |       channel runs with it held, start to finish (except while suspended in a wait).
//          |
//          \------ one condition variable. wakes are always broadcast: every waiter, on either
//                  channel, re-checks its own predicate. cross-channel wakes are expected.
//
// the state of each channel is an arena (fixed byte store) plus cursors and counters. nothing is
// allocated after the device is created.
//
// the organization of these modules is as such:
//
//      state<-------------admission: open-for-write handshake (may block), open-for-read.
//                   |
//                   |-----transfer: read (may block) and write (never blocks, truncates).
//                   |
//                   \-----release: close-for-write, close-for-read.
//
//      api: wraps the above into Device, Channel, Reader and Writer. the crate re-exports this
//           API publicly.
//
// there is also the error module, which contains the relevant error types, which is also
// re-exported publicly.

pub(crate) mod error;
pub(crate) mod api;
pub(crate) mod state;

mod admission;
mod transfer;
mod release;

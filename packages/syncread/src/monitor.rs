//! Monitor (mutex + condition variable) shared by every channel of a device.

use std::{
    ops::{Deref, DerefMut},
    sync::{
        atomic::{AtomicBool, Ordering::Relaxed},
        Arc,
        Condvar,
        Mutex,
        MutexGuard,
        PoisonError,
    },
    fmt::{self, Debug, Formatter},
};


// a lock around some state `S` plus one condition variable.
//
// - every waiter re-checks its own predicate after waking, because wakes are broadcast and never
//   targeted at a particular predicate.
// - poisoning is ignored: all state transitions are completed before the lock is released, so a
//   panicking thread can not leave the state half-updated.
pub(crate) struct Monitor<S> {
    state: Mutex<S>,
    cond: Condvar,
}

// outcome of a call to `MonitorGuard::wait`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Wake {
    // woken by a broadcast (or spuriously). the caller re-checks its predicate.
    Notified,
    // the waiting caller's signal was raised.
    Interrupted,
}

impl<S> Monitor<S> {
    // construct around initial state.
    pub(crate) fn new(state: S) -> Self {
        Monitor {
            state: Mutex::new(state),
            cond: Condvar::new(),
        }
    }

    // block until the lock is free, then hold it until the guard is dropped.
    pub(crate) fn lock(&self) -> MonitorGuard<'_, S> {
        MonitorGuard {
            lock: self.state.lock().unwrap_or_else(PoisonError::into_inner),
            cond: &self.cond,
        }
    }
}

// held lock on a monitor. dropping it releases the lock.
pub(crate) struct MonitorGuard<'a, S> {
    lock: MutexGuard<'a, S>,
    cond: &'a Condvar,
}

impl<'a, S> MonitorGuard<'a, S> {
    // atomically release the lock and suspend until woken, then reacquire the lock.
    //
    // a signal that is already pending interrupts immediately, without suspending. an observed
    // interruption consumes the pending signal.
    pub(crate) fn wait(self, signal: &Signal) -> (Self, Wake) {
        if signal.take_pending() {
            return (self, Wake::Interrupted);
        }
        let MonitorGuard { lock, cond } = self;
        let lock = cond.wait(lock).unwrap_or_else(PoisonError::into_inner);
        let guard = MonitorGuard { lock, cond };
        if signal.take_pending() {
            (guard, Wake::Interrupted)
        } else {
            (guard, Wake::Notified)
        }
    }

    // wake every thread currently suspended in `wait` on this monitor.
    pub(crate) fn broadcast(&self) {
        self.cond.notify_all();
    }
}

impl<'a, S> Deref for MonitorGuard<'a, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.lock
    }
}

impl<'a, S> DerefMut for MonitorGuard<'a, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.lock
    }
}

// something a raised signal must wake so that its waiter can observe the interruption.
pub(crate) trait WakeAll: Send + Sync {
    fn wake_all(&self);
}

impl<S: Send> WakeAll for Monitor<S> {
    fn wake_all(&self) {
        // taking the lock orders this broadcast after any waiter's pending-check, so the waiter
        // either sees the flag before suspending or is suspended by the time we notify.
        let guard = self.lock();
        guard.broadcast();
    }
}


/// Interruption source for blocking channel operations
///
/// A `Signal` stands in for a signal delivered to the thread that is blocked in an operation.
/// Blocking operations (opening a channel for writing, reading past the end of the written data
/// while a writer is active) are given a signal, and calling [`raise`](Self::raise) from any
/// thread makes the blocked operation fail with
/// [`InterruptedWait`](crate::error::InterruptedWait).
///
/// Raising a signal while no operation is blocked on it leaves it pending: the next blocking
/// wait that uses it is interrupted immediately. Interruption consumes the pending state. Clones
/// share the same pending state.
///
/// A signal only interrupts operations on the device it was created from. Passing it to another
/// device's channel panics.
#[derive(Clone)]
pub struct Signal {
    pending: Arc<AtomicBool>,
    target: Arc<dyn WakeAll>,
}

impl Signal {
    pub(crate) fn new(target: Arc<dyn WakeAll>) -> Self {
        Signal {
            pending: Arc::new(AtomicBool::new(false)),
            target,
        }
    }

    // whether raising this signal broadcasts on `monitor`.
    pub(crate) fn wakes<S: Send>(&self, monitor: &Arc<Monitor<S>>) -> bool {
        Arc::as_ptr(&self.target) as *const () == Arc::as_ptr(monitor) as *const ()
    }

    /// Interrupt the operation blocked on this signal, or the next one to block on it
    pub fn raise(&self) {
        // the monitor lock taken by wake_all synchronizes this store with the waiter
        self.pending.store(true, Relaxed);
        self.target.wake_all();
    }

    /// Whether the signal has been raised and not yet consumed by an interrupted wait
    pub fn is_pending(&self) -> bool {
        self.pending.load(Relaxed)
    }

    /// Discard a pending raise without interrupting anything
    pub fn clear(&self) {
        self.pending.store(false, Relaxed);
    }

    // consume a pending raise.
    fn take_pending(&self) -> bool {
        self.pending.swap(false, Relaxed)
    }
}

impl Debug for Signal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Signal")
            .field("pending", &self.is_pending())
            .finish()
    }
}

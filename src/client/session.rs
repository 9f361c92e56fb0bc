//! Connection session
//!
//! Per-connection client state: at most one outstanding request, completed
//! by the next response frame, failed on disconnect. The slot is generic
//! over the message type so both protocol variants share it; a future
//! revision multiplexing by serial number would widen this single slot into
//! a keyed map and change nothing else.

use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::error::{LinkError, Result};

/// Deadline for signin/query/delete/list-style exchanges
pub const SHORT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline for update/download-style exchanges with larger payloads
pub const LONG_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(60);

enum Slot<M> {
    /// No outstanding request
    Idle,

    /// One request sent, its future pending
    Awaiting(Sender<Result<M>>),

    /// Connection gone; every later send fails
    Closed,
}

/// What happened to an inbound message offered to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Resolved the pending future
    Completed,

    /// A future was pending but its caller had already given up
    /// (timed-out exchange); the message was dropped
    Stale,

    /// No future was pending; the message was dropped
    Unexpected,
}

/// Single-outstanding-request correlator.
///
/// Because the protocol allows only one request in flight per connection,
/// arrival order alone matches responses to requests; no sequence numbers
/// are needed. The slot is guarded by one mutex and must only ever be
/// touched through it.
pub struct Session<M> {
    slot: Mutex<Slot<M>>,
}

impl<M> Default for Session<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Session<M> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Idle),
        }
    }

    /// Arm the slot for one exchange.
    ///
    /// Fails immediately with [`LinkError::RequestInProgress`] while another
    /// exchange is pending, or [`LinkError::NotConnected`] once the session
    /// is closed. On success the returned receiver resolves exactly once.
    pub fn begin(&self) -> Result<Receiver<Result<M>>> {
        let mut slot = self.slot.lock();
        match *slot {
            Slot::Closed => Err(LinkError::NotConnected),
            Slot::Awaiting(_) => Err(LinkError::RequestInProgress),
            Slot::Idle => {
                let (tx, rx) = bounded(1);
                *slot = Slot::Awaiting(tx);
                Ok(rx)
            }
        }
    }

    /// Disarm a slot armed by [`begin`](Self::begin) after a failed write,
    /// before the request ever reached the wire.
    pub fn abort(&self) {
        let mut slot = self.slot.lock();
        if matches!(*slot, Slot::Awaiting(_)) {
            *slot = Slot::Idle;
        }
    }

    /// Offer an inbound message to the pending future.
    ///
    /// The session returns to `Idle` either way. A `Stale` delivery is the
    /// deliberate consequence of timeouts not tearing down the exchange: a
    /// late reply resolves the abandoned future, the delivery fails, and
    /// the next exchange starts clean. Clearing the slot on timeout instead
    /// would hand that late reply to the *next* exchange, which is worse.
    pub fn complete(&self, message: M) -> Delivery {
        let mut slot = self.slot.lock();
        if !matches!(*slot, Slot::Awaiting(_)) {
            return Delivery::Unexpected;
        }
        match std::mem::replace(&mut *slot, Slot::Idle) {
            Slot::Awaiting(tx) => {
                if tx.send(Ok(message)).is_ok() {
                    Delivery::Completed
                } else {
                    Delivery::Stale
                }
            }
            _ => Delivery::Unexpected,
        }
    }

    /// Terminate the session.
    ///
    /// Any pending future is failed with [`LinkError::ConnectionClosed`]
    /// before this call returns, so no caller waits past teardown. Idempotent.
    pub fn close(&self) {
        let mut slot = self.slot.lock();
        if let Slot::Awaiting(tx) = std::mem::replace(&mut *slot, Slot::Closed) {
            let _ = tx.send(Err(LinkError::ConnectionClosed));
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(*self.slot.lock(), Slot::Closed)
    }
}

/// The caller's half of one exchange.
///
/// Resolves exactly once with the matching response, a connection failure,
/// or a timeout. A timeout fails only this wait; the connection and the
/// outstanding exchange stay as they are.
#[derive(Debug)]
pub struct PendingResponse<M> {
    rx: Receiver<Result<M>>,
    timeout: Duration,
}

impl<M> PendingResponse<M> {
    pub(crate) fn new(rx: Receiver<Result<M>>, timeout: Duration) -> Self {
        Self { rx, timeout }
    }

    /// Block until the response arrives or the deadline passes.
    pub fn wait(self) -> Result<M> {
        match self.rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(LinkError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(LinkError::ConnectionClosed),
        }
    }
}

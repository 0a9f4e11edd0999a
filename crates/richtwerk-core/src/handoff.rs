// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-shot handoff of a transient result between two contexts (e.g. the
// crop page producing a corrected raster and the export page consuming it).
// Replaces a process-wide "read once then clear" slot with an explicit
// single-producer, single-consumer channel.

use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{Result, RichtwerkError};

/// Create a connected sender/receiver pair.
pub fn channel<T>() -> (HandoffSender<T>, HandoffReceiver<T>) {
    let (tx, rx) = oneshot::channel();
    (HandoffSender { inner: tx }, HandoffReceiver { inner: Some(rx) })
}

/// Producing half. Sending consumes it, so a value can only be handed off once.
#[derive(Debug)]
pub struct HandoffSender<T> {
    inner: oneshot::Sender<T>,
}

impl<T> HandoffSender<T> {
    /// Deliver `value`. Fails with `HandoffClosed` if the receiver is gone,
    /// in which case the value is dropped.
    pub fn send(self, value: T) -> Result<()> {
        self.inner.send(value).map_err(|_| {
            debug!("Handoff receiver dropped; discarding value");
            RichtwerkError::HandoffClosed
        })
    }

    /// Whether the consuming side has gone away.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Consuming half. The value is taken at most once; afterwards the slot is
/// empty for good.
#[derive(Debug)]
pub struct HandoffReceiver<T> {
    inner: Option<oneshot::Receiver<T>>,
}

impl<T> HandoffReceiver<T> {
    /// Wait for the value.
    pub async fn recv(mut self) -> Result<T> {
        let rx = self.inner.take().ok_or(RichtwerkError::HandoffClosed)?;
        rx.await.map_err(|_| RichtwerkError::HandoffClosed)
    }

    /// Take the value if it has already arrived.
    ///
    /// `Ok(None)` means nothing has been sent yet. Once a value has been
    /// taken, or the sender was dropped, every later call returns
    /// `HandoffClosed`.
    pub fn try_take(&mut self) -> Result<Option<T>> {
        let Some(rx) = self.inner.as_mut() else {
            return Err(RichtwerkError::HandoffClosed);
        };
        match rx.try_recv() {
            Ok(value) => {
                self.inner = None;
                Ok(Some(value))
            }
            Err(oneshot::error::TryRecvError::Empty) => Ok(None),
            Err(oneshot::error::TryRecvError::Closed) => {
                self.inner = None;
                Err(RichtwerkError::HandoffClosed)
            }
        }
    }
}

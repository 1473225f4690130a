//! Worker → consumer handoff for classified results.
//!
//! Each fetch task holds a [`ResultSender`] clone; exactly one
//! [`ResultReceiver`] lives on the consumer side for the lifetime of a screen.
//! Liveness is owned by the channel: once the receiver is closed or dropped,
//! every later delivery is a silent no-op.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use shared::domain::RequestId;
use tracing::debug;

use crate::{classify::ClassifiedResult, client::FetchKind};

/// One classified result, tagged with the fetch that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub request_id: RequestId,
    pub kind: FetchKind,
    pub result: ClassifiedResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    ConsumerGone,
}

pub fn result_channel() -> (ResultSender, ResultReceiver) {
    let (tx, rx) = unbounded();
    let alive = Arc::new(AtomicBool::new(true));
    (
        ResultSender {
            tx,
            alive: alive.clone(),
        },
        ResultReceiver { rx, alive },
    )
}

#[derive(Clone)]
pub struct ResultSender {
    tx: Sender<Delivery>,
    alive: Arc<AtomicBool>,
}

impl ResultSender {
    /// Enqueues without blocking. Never fails loudly: a torn-down consumer
    /// yields [`DeliveryOutcome::ConsumerGone`].
    pub fn deliver(&self, delivery: Delivery) -> DeliveryOutcome {
        if !self.alive.load(Ordering::Acquire) {
            debug!(
                request_id = %delivery.request_id,
                kind = ?delivery.kind,
                "result channel: consumer closed, discarding delivery"
            );
            return DeliveryOutcome::ConsumerGone;
        }

        match self.tx.send(delivery) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(err) => {
                debug!(
                    request_id = %err.0.request_id,
                    "result channel: consumer dropped, discarding delivery"
                );
                DeliveryOutcome::ConsumerGone
            }
        }
    }

    pub fn is_consumer_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

pub struct ResultReceiver {
    rx: Receiver<Delivery>,
    alive: Arc<AtomicBool>,
}

impl ResultReceiver {
    pub fn try_recv(&self) -> Option<Delivery> {
        self.rx.try_recv().ok()
    }

    /// `None` on timeout, or when no sender is left.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Delivery> {
        match self.rx.recv_timeout(timeout) {
            Ok(delivery) => Some(delivery),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn drain(&self) -> Vec<Delivery> {
        self.rx.try_iter().collect()
    }

    /// Marks the consumer dead. Deliveries already queued stay readable.
    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

impl Drop for ResultReceiver {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "tests/channel_tests.rs"]
mod tests;

/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A bounded, multi-producer/multi-consumer blocking queue with a cooperative
//! terminate signal, used to hand lines and edges between ingest pipeline
//! stages without per-item locking.
//!
//! This is a thin, purpose-named wrapper around [`crossbeam_channel`]'s
//! bounded channel: `push`/`pop` map directly onto `send`/`recv`, and
//! `terminate` maps onto dropping the sender side. Once every [`Sender`] is
//! dropped, pending items already queued are still delivered; only once the
//! channel is drained does `pop` report termination.

/// Default maximum queue depth, matching the source corpus's default.
pub const DEFAULT_MAX_DEPTH: usize = 4096;

/// The producing half of a [`BlockingQueue`].
#[derive(Clone)]
pub struct Sender<T> {
    inner: crossbeam_channel::Sender<T>,
}

impl<T> Sender<T> {
    /// Blocks while the queue is at capacity, then enqueues `item`.
    pub fn push(&self, item: T) {
        // The channel is only ever closed by dropping every sender, which
        // cannot happen while `self` is alive, so this can't fail.
        self.inner.send(item).ok();
    }
}

/// The consuming half of a [`BlockingQueue`].
#[derive(Clone)]
pub struct Receiver<T> {
    inner: crossbeam_channel::Receiver<T>,
}

impl<T> Receiver<T> {
    /// Blocks while the queue is empty and not terminated. Returns `None`
    /// once termination has been signaled (every [`Sender`] dropped) and the
    /// queue has been drained.
    pub fn pop(&self) -> Option<T> {
        self.inner.recv().ok()
    }

    /// Advisory current depth, for diagnostic logging only.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Creates a bounded queue with the given maximum depth, returning a
/// `(Sender, Receiver)` pair. Cloning either half shares the same
/// underlying queue, supporting multiple producers and/or consumers;
/// termination is signaled once every clone of the `Sender` is dropped.
pub fn bounded<T>(max_depth: usize) -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = crossbeam_channel::bounded(max_depth);
    (Sender { inner: tx }, Receiver { inner: rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn fifo_single_producer_consumer() {
        let (tx, rx) = bounded::<i32>(4);
        for i in 0..3 {
            tx.push(i);
        }
        drop(tx);
        assert_eq!(rx.pop(), Some(0));
        assert_eq!(rx.pop(), Some(1));
        assert_eq!(rx.pop(), Some(2));
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn terminate_drains_then_stops() {
        let (tx, rx) = bounded::<i32>(16);
        tx.push(1);
        tx.push(2);
        drop(tx);
        assert_eq!(rx.pop(), Some(1));
        assert_eq!(rx.pop(), Some(2));
        assert_eq!(rx.pop(), None);
        // idempotent once drained
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn blocks_until_item_available() {
        let (tx, rx) = bounded::<i32>(4);
        let handle = thread::spawn(move || rx.pop());
        thread::sleep(Duration::from_millis(20));
        tx.push(42);
        drop(tx);
        assert_eq!(handle.join().unwrap(), Some(42));
    }
}

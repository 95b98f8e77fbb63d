//! Fixed-capacity command queue between the receive interrupt and the main loop.
//!
//! [`CommandQueue`] is a single-producer/single-consumer ring buffer. It is
//! split exactly once into a [`Producer`], owned by the interrupt context
//! that runs the frame decoder, and a [`Consumer`], owned by the control
//! loop. No lock is held on either side:
//!
//! - the producer writes the slot at `head`, then publishes the advanced
//!   `head` with release ordering;
//! - the consumer reads the slot at `tail`, then publishes the advanced
//!   `tail` with release ordering.
//!
//! Each side only ever stores its own index, so a slot is never visible to
//! the consumer before it is fully written, and never reused by the producer
//! before it has been read.
//!
//! ## Overflow
//!
//! One slot is kept free to tell "full" from "empty", so a queue of `N`
//! slots holds at most `N - 1` commands. When it is full the newest command
//! is dropped and the queued ones are left untouched.
//!
//! ## Portability
//!
//! Indices are [`AtomicU8`] and only use `load`/`store`, which every target
//! with 8-bit atomics supports, AVR and Cortex-M0 included.

use core::cell::{Cell, UnsafeCell};
use core::fmt;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU8, Ordering};

use critical_section::Mutex;

use crate::command::Command;

/// A ring buffer of `N` command slots, `N` a power of two no larger than 256.
pub struct CommandQueue<const N: usize> {
    buf: UnsafeCell<[MaybeUninit<Command>; N]>,
    /// Next slot to write.
    head: AtomicU8,
    /// Next slot to read.
    tail: AtomicU8,
    split: Mutex<Cell<bool>>,
}

// SAFETY: slots are only accessed through the single `Producer` and the single
// `Consumer` handed out by `split`, which hand ownership of each slot back and
// forth through the release/acquire index stores.
unsafe impl<const N: usize> Sync for CommandQueue<N> {}

impl<const N: usize> CommandQueue<N> {
    const MASK: u8 = {
        assert!(N.is_power_of_two(), "queue length must be a power of two");
        assert!(N >= 2 && N <= 256, "queue length must be between 2 and 256");
        (N - 1) as u8
    };

    /// Creates an empty queue. Usable in `static` initializers.
    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            buf: UnsafeCell::new([MaybeUninit::uninit(); N]),
            head: AtomicU8::new(0),
            tail: AtomicU8::new(0),
            split: Mutex::new(Cell::new(false)),
        }
    }

    /// The maximum number of commands the queue can hold at once.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of commands currently queued.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        usize::from(head.wrapping_sub(tail) & Self::MASK)
    }

    /// Returns `true` if no command is queued.
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Splits the queue into its producer and consumer halves.
    ///
    /// Returns `None` if the queue has already been split, so there can never
    /// be more than one producer or more than one consumer.
    pub fn split(&self) -> Option<(Producer<'_, N>, Consumer<'_, N>)> {
        let already = critical_section::with(|cs| self.split.borrow(cs).replace(true));
        if already {
            return None;
        }
        Some((Producer { queue: self }, Consumer { queue: self }))
    }

    #[inline]
    fn next(index: u8) -> u8 {
        index.wrapping_add(1) & Self::MASK
    }
}

impl<const N: usize> Default for CommandQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for CommandQueue<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandQueue")
            .field("slots", &N)
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .finish()
    }
}

/// Write half of a [`CommandQueue`]. Lives in the receive interrupt.
pub struct Producer<'a, const N: usize> {
    queue: &'a CommandQueue<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Enqueues a command.
    ///
    /// Returns `false` and leaves the queue unchanged if it is full.
    pub fn push(&mut self, cmd: Command) -> bool {
        let head = self.queue.head.load(Ordering::Relaxed);
        let next = CommandQueue::<N>::next(head);
        if next == self.queue.tail.load(Ordering::Acquire) {
            return false;
        }
        // SAFETY: `head` is owned by the producer until the store below
        // publishes it; the consumer never reads at or past `head`.
        unsafe {
            (*self.queue.buf.get())[usize::from(head)] = MaybeUninit::new(cmd);
        }
        self.queue.head.store(next, Ordering::Release);
        true
    }

    /// Returns `true` if the next push would be dropped.
    pub fn is_full(&self) -> bool {
        let head = self.queue.head.load(Ordering::Relaxed);
        CommandQueue::<N>::next(head) == self.queue.tail.load(Ordering::Acquire)
    }
}

impl<const N: usize> fmt::Debug for Producer<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Producer").field(self.queue).finish()
    }
}

/// Read half of a [`CommandQueue`]. Lives in the main loop.
pub struct Consumer<'a, const N: usize> {
    queue: &'a CommandQueue<N>,
}

impl<const N: usize> Consumer<'_, N> {
    /// Dequeues the oldest command, if any.
    pub fn pop(&mut self) -> Option<Command> {
        let tail = self.queue.tail.load(Ordering::Relaxed);
        if tail == self.queue.head.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: the slot at `tail` was published by the producer's release
        // store of `head`, and stays ours until `tail` is advanced below.
        let cmd = unsafe { (*self.queue.buf.get())[usize::from(tail)].assume_init() };
        self.queue
            .tail
            .store(CommandQueue::<N>::next(tail), Ordering::Release);
        Some(cmd)
    }

    /// Returns `true` if no command is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of commands waiting.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

impl<const N: usize> fmt::Debug for Consumer<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Consumer").field(self.queue).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_starts_empty() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let (_, mut rx) = queue.split().unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), 3);
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn test_push_then_pop_preserves_order() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let (mut tx, mut rx) = queue.split().unwrap();
        assert!(tx.push(Command::PowerToggle));
        assert!(tx.push(Command::SpeedInc));
        assert!(tx.push(Command::SpeedDec));
        assert_eq!(rx.len(), 3);
        assert_eq!(rx.pop(), Some(Command::PowerToggle));
        assert_eq!(rx.pop(), Some(Command::SpeedInc));
        assert_eq!(rx.pop(), Some(Command::SpeedDec));
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let (mut tx, mut rx) = queue.split().unwrap();
        assert!(tx.push(Command::SpeedInc));
        assert!(tx.push(Command::SpeedInc));
        assert!(tx.push(Command::PowerToggle));
        assert!(tx.is_full());
        assert!(!tx.push(Command::SpeedDec));
        assert!(!tx.push(Command::SpeedDec));

        assert_eq!(rx.pop(), Some(Command::SpeedInc));
        assert_eq!(rx.pop(), Some(Command::SpeedInc));
        assert_eq!(rx.pop(), Some(Command::PowerToggle));
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn test_two_slot_queue_holds_one_command() {
        let queue: CommandQueue<2> = CommandQueue::new();
        let (mut tx, mut rx) = queue.split().unwrap();
        assert!(tx.push(Command::SpeedDec));
        assert!(!tx.push(Command::SpeedInc));
        assert_eq!(rx.pop(), Some(Command::SpeedDec));
        assert!(tx.push(Command::SpeedInc));
        assert_eq!(rx.pop(), Some(Command::SpeedInc));
    }

    #[test]
    fn test_indices_wrap_around() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let (mut tx, mut rx) = queue.split().unwrap();
        for round in 0..20 {
            let cmd = Command::ALL[round % 3];
            assert!(tx.push(cmd));
            assert!(!rx.is_empty());
            assert_eq!(rx.len(), 1);
            assert_eq!(rx.pop(), Some(cmd));
            assert!(rx.is_empty());
        }
    }

    #[test]
    fn test_split_only_once() {
        let queue: CommandQueue<2> = CommandQueue::new();
        assert!(queue.split().is_some());
        assert!(queue.split().is_none());
    }
}

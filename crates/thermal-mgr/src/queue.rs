use core::fmt;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::channel::Channel;

use embassy_time::{Duration, with_timeout};

/// Error returned when an event is sent into a full [`EventQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Event queue full")
    }
}

/// A fixed-capacity FIFO queue of events.
///
/// The storage for all `N` slots is part of the queue itself, so a queue
/// placed in a `static` never allocates.
///
/// Any number of producers may call [`EventQueue::send`], including from
/// interrupt context when the mutex is a [`CriticalSectionRawMutex`].
/// A single consumer calls [`EventQueue::receive`].
pub struct EventQueue<M, T, const N: usize>
where
    M: RawMutex,
{
    channel: Channel<M, T, N>,
}

impl<T, const N: usize> EventQueue<CriticalSectionRawMutex, T, N> {
    /// Creates an empty [`EventQueue`] guarded by a critical section.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_mutex()
    }
}

impl<T, const N: usize> Default for EventQueue<CriticalSectionRawMutex, T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, T, const N: usize> EventQueue<M, T, N>
where
    M: RawMutex,
{
    /// Creates an empty [`EventQueue`] guarded by the raw mutex `M`.
    #[must_use]
    pub const fn with_mutex() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueues an event without ever blocking the caller.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFull`] when all slots are taken. The queue is left
    /// untouched and the event is dropped.
    pub fn send(&self, event: T) -> Result<(), QueueFull> {
        self.channel
            .try_send(event)
            .map_err(|_| QueueFull)
    }

    /// Waits up to `timeout` for the oldest event in the queue.
    ///
    /// Returns [`None`] if no event arrives before `timeout` elapses.
    pub async fn receive(&self, timeout: Duration) -> Option<T> {
        with_timeout(timeout, self.channel.receive()).await.ok()
    }

    /// Dequeues the oldest event, if any, without waiting.
    pub fn try_receive(&self) -> Option<T> {
        self.channel.try_receive().ok()
    }

    /// Returns the number of events waiting in the queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// Returns whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Returns whether all slots of the queue are taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }

    /// Returns the number of slots of the queue.
    #[must_use]
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::{EventQueue, QueueFull};

    extern crate std;
    use std::thread;
    use std::time::Instant;
    use std::vec::Vec;

    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_time::Duration;

    const CAPACITY: usize = 4;

    #[tokio::test]
    async fn fifo_order() {
        let queue = EventQueue::<_, u8, CAPACITY>::new();

        for value in 0..3 {
            queue.send(value).unwrap();
        }

        for expected in 0..3 {
            assert_eq!(
                queue.receive(Duration::from_millis(10)).await,
                Some(expected)
            );
        }
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn fifo_order_across_interleaved_receives() {
        let queue = EventQueue::<_, u8, CAPACITY>::new();

        queue.send(1).unwrap();
        queue.send(2).unwrap();
        assert_eq!(queue.receive(Duration::from_millis(10)).await, Some(1));

        queue.send(3).unwrap();
        queue.send(4).unwrap();
        queue.send(5).unwrap();

        for expected in 2..=5 {
            assert_eq!(
                queue.receive(Duration::from_millis(10)).await,
                Some(expected)
            );
        }
    }

    #[test]
    fn full_queue_rejects_without_mutation() {
        let queue = EventQueue::<_, u8, CAPACITY>::new();

        for value in 0..CAPACITY as u8 {
            queue.send(value).unwrap();
        }
        assert!(queue.is_full());
        assert_eq!(queue.capacity(), CAPACITY);

        assert_eq!(queue.send(42), Err(QueueFull));
        assert_eq!(queue.len(), CAPACITY);

        // The rejected event never shows up.
        for expected in 0..CAPACITY as u8 {
            assert_eq!(queue.try_receive(), Some(expected));
        }
        assert_eq!(queue.try_receive(), None);
    }

    #[tokio::test]
    async fn receive_times_out() {
        let queue = EventQueue::<_, u8, CAPACITY>::new();
        let timeout = Duration::from_millis(50);

        let start = Instant::now();
        assert_eq!(queue.receive(timeout).await, None);
        let elapsed = start.elapsed();

        assert!(elapsed >= std::time::Duration::from_millis(50));
        assert!(elapsed < std::time::Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn receive_wakes_on_send() {
        static QUEUE: EventQueue<CriticalSectionRawMutex, u8, CAPACITY> = EventQueue::new();

        let producer = thread::spawn(|| {
            thread::sleep(std::time::Duration::from_millis(20));
            QUEUE.send(7).unwrap();
        });

        let start = Instant::now();
        assert_eq!(QUEUE.receive(Duration::from_secs(5)).await, Some(7));
        assert!(start.elapsed() < std::time::Duration::from_secs(5));

        producer.join().unwrap();
    }

    #[test]
    fn concurrent_producers_keep_per_producer_order() {
        const PRODUCERS: u8 = 4;
        const PER_PRODUCER: u8 = 8;

        let queue = EventQueue::<_, (u8, u8), 16>::new();

        thread::scope(|scope| {
            for producer in 0..PRODUCERS {
                let queue = &queue;
                let _ = scope.spawn(move || {
                    for sequence in 0..PER_PRODUCER {
                        // Rejections are expected once the queue fills up.
                        let _ = queue.send((producer, sequence));
                    }
                });
            }
        });

        assert!(queue.len() <= queue.capacity());

        let mut received = Vec::new();
        while let Some(event) = queue.try_receive() {
            received.push(event);
        }
        assert_eq!(received.len(), 16);

        for producer in 0..PRODUCERS {
            let sequences: Vec<u8> = received
                .iter()
                .filter(|(id, _)| *id == producer)
                .map(|(_, sequence)| *sequence)
                .collect();
            assert!(sequences.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
}

use core::sync::atomic::{AtomicU32, Ordering};

use heapless::spsc::{Consumer, Producer};

use crate::ring::RingBuffer;
use crate::RawSample;

/// Something that yields one conversion per call without blocking.
pub trait SampleSource {
    fn read_sample(&mut self) -> RawSample;
}

/// Samples lost to a full queue. Written by the interrupt only.
pub struct Dropped(AtomicU32);

impl Dropped {
    pub const fn new() -> Self {
        Dropped(AtomicU32::new(0))
    }

    fn record(&self) {
        let n = self.0.load(Ordering::Relaxed);
        self.0.store(n.wrapping_add(1), Ordering::Relaxed);
    }

    pub fn count(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for Dropped {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt side of the pipeline: one sample in, one enqueue attempt out.
pub struct Acquisition<'a, S, const LEN: usize> {
    source: S,
    producer: Producer<'a, RawSample, LEN>,
    dropped: &'a Dropped,
}

impl<'a, S, const LEN: usize> Acquisition<'a, S, LEN>
where
    S: SampleSource,
{
    pub fn new(source: S, producer: Producer<'a, RawSample, LEN>, dropped: &'a Dropped) -> Self {
        Acquisition {
            source,
            producer,
            dropped,
        }
    }

    pub fn on_interrupt(&mut self) {
        let code = self.source.read_sample();
        self.on_sample_ready(code);
    }

    /// Never blocks; a sample that does not fit is counted and discarded.
    pub fn on_sample_ready(&mut self, code: RawSample) {
        if self.producer.enqueue(code).is_err() {
            self.dropped.record();
        }
    }
}

/// Moves queued samples into the ring buffer.
pub struct Sampler<'a, const LEN: usize, const C: usize> {
    consumer: Consumer<'a, RawSample, LEN>,
    ring: &'a RingBuffer<C>,
}

impl<'a, const LEN: usize, const C: usize> Sampler<'a, LEN, C> {
    pub fn new(consumer: Consumer<'a, RawSample, LEN>, ring: &'a RingBuffer<C>) -> Self {
        Sampler { consumer, ring }
    }

    /// Drains the queue, returns the number of samples written.
    pub fn service(&mut self) -> usize {
        let mut written = 0;
        while let Some(sample) = self.consumer.dequeue() {
            self.ring.push(sample);
            written += 1;
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::spsc::Queue;

    struct Ramp(RawSample);

    impl SampleSource for Ramp {
        fn read_sample(&mut self) -> RawSample {
            self.0 += 1;
            self.0
        }
    }

    #[test]
    fn samples_flow_into_ring() {
        let mut queue: Queue<RawSample, 8> = Queue::new();
        let (producer, consumer) = queue.split();
        let ring = RingBuffer::<16>::new();
        let dropped = Dropped::new();
        let mut acquisition = Acquisition::new(Ramp(0), producer, &dropped);
        let mut sampler = Sampler::new(consumer, &ring);

        for _ in 0..5 {
            acquisition.on_interrupt();
        }
        assert_eq!(sampler.service(), 5);
        assert_eq!(ring.written(), 5);
        assert_eq!((0..5).map(|i| ring.get(i)).collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
        assert_eq!(sampler.service(), 0);
        assert_eq!(dropped.count(), 0);
    }

    #[test]
    fn full_queue_drops_and_counts() {
        // Holds LEN - 1 samples.
        let mut queue: Queue<RawSample, 4> = Queue::new();
        let (producer, consumer) = queue.split();
        let ring = RingBuffer::<16>::new();
        let dropped = Dropped::new();
        let mut acquisition = Acquisition::new(Ramp(0), producer, &dropped);
        let mut sampler = Sampler::new(consumer, &ring);

        for _ in 0..10 {
            acquisition.on_interrupt();
        }
        assert_eq!(dropped.count(), 7);
        assert_eq!(sampler.service(), 3);
        assert_eq!((0..3).map(|i| ring.get(i)).collect::<Vec<_>>(), [1, 2, 3]);

        acquisition.on_sample_ready(99);
        assert_eq!(sampler.service(), 1);
        assert_eq!(ring.get(3), 99);
    }
}

use core::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

use crate::RawSample;

/// Fixed-capacity circular store of raw samples.
///
/// One writer (the sampler task) pushes, any number of readers index into it
/// without locking. A reader may observe `written()` one push behind the
/// writer; readers only touch slots the window clamp in
/// [`Window`](crate::timebase::Window) keeps out of the writer's way. Only
/// atomic loads and stores are used, so this works on cores without CAS.
pub struct RingBuffer<const C: usize> {
    slots: [AtomicU16; C],
    written: AtomicUsize,
}

impl<const C: usize> RingBuffer<C> {
    const EMPTY: AtomicU16 = AtomicU16::new(0);

    pub const fn new() -> Self {
        assert!(C.is_power_of_two(), "ring capacity must be a power of two");
        RingBuffer {
            slots: [Self::EMPTY; C],
            written: AtomicUsize::new(0),
        }
    }

    /// Writer side. Must only ever be called from a single context.
    pub fn push(&self, sample: RawSample) {
        let w = self.written.load(Ordering::Relaxed);
        self.slots[w & (C - 1)].store(sample, Ordering::Relaxed);
        self.written.store(w.wrapping_add(1), Ordering::Release);
    }

    /// Total number of pushes so far, wrapping.
    pub fn written(&self) -> usize {
        self.written.load(Ordering::Acquire)
    }

    pub fn get(&self, index: usize) -> RawSample {
        self.slots[index & (C - 1)].load(Ordering::Relaxed)
    }

    pub const fn capacity(&self) -> usize {
        C
    }
}

impl<const C: usize> Default for RingBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_capacity_samples_in_order() {
        let ring = RingBuffer::<16>::new();
        for n in [16usize, 17, 40, 100] {
            let ring = RingBuffer::<16>::new();
            for code in 0..n {
                ring.push(code as RawSample);
            }
            let w = ring.written();
            let kept: Vec<RawSample> = (0..16).map(|age| ring.get(w - 16 + age)).collect();
            let expected: Vec<RawSample> = ((n - 16)..n).map(|code| code as RawSample).collect();
            assert_eq!(kept, expected, "after {} writes", n);
        }
        assert_eq!(ring.capacity(), 16);
    }

    #[test]
    fn write_counter_wraps_without_breaking_slots() {
        let ring = RingBuffer::<8>::new();
        ring.written.store(usize::MAX, Ordering::Relaxed);
        ring.push(7);
        ring.push(9);
        assert_eq!(ring.written(), 1);
        assert_eq!(ring.get(usize::MAX), 7);
        assert_eq!(ring.get(0), 9);
    }

    #[test]
    #[should_panic]
    fn rejects_non_power_of_two() {
        let _ = RingBuffer::<12>::new();
    }
}

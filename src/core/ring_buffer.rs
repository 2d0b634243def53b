//! Fixed-capacity sample ring for the real-time path.
//!
//! Decouples the host's callback block size from the engine's internal hop
//! size. Capacity is fixed at construction; nothing here allocates or shifts
//! memory afterwards. Index wrap-around uses compare-and-subtract rather
//! than per-sample modulo, keeping division out of the hot path.

/// Fixed-capacity ring of `f32` samples.
#[derive(Debug, Clone)]
pub struct SampleRing {
    data: Vec<f32>,
    head: usize,
    tail: usize,
    len: usize,
}

#[inline]
fn wrap(index: usize, capacity: usize) -> usize {
    if index >= capacity {
        index - capacity
    } else {
        index
    }
}

impl SampleRing {
    /// Creates a ring with fixed capacity, zero-filled.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            data: vec![0.0; cap],
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Number of samples currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Fixed capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Free space remaining.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity().saturating_sub(self.len)
    }

    /// True when no samples are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops all stored samples and zeroes the backing store.
    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|s| *s = 0.0);
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Pushes as many samples as fit from `input`, oldest-first semantics.
    ///
    /// Returns the number of samples pushed.
    pub fn push_slice(&mut self, input: &[f32]) -> usize {
        if input.is_empty() || self.capacity() == 0 || self.available() == 0 {
            return 0;
        }
        let to_push = input.len().min(self.available());
        let first = to_push.min(self.capacity() - self.tail);
        self.data[self.tail..self.tail + first].copy_from_slice(&input[..first]);
        self.tail = wrap(self.tail + first, self.capacity());

        let second = to_push - first;
        if second > 0 {
            self.data[..second].copy_from_slice(&input[first..first + second]);
            self.tail = second;
        }

        self.len += to_push;
        to_push
    }

    /// Pops up to `output.len()` samples from the front.
    ///
    /// Returns the number of samples popped.
    pub fn pop_slice(&mut self, output: &mut [f32]) -> usize {
        let to_pop = output.len().min(self.len);
        if to_pop == 0 || self.capacity() == 0 {
            return 0;
        }
        let first = to_pop.min(self.capacity() - self.head);
        output[..first].copy_from_slice(&self.data[self.head..self.head + first]);
        self.head = wrap(self.head + first, self.capacity());

        let second = to_pop - first;
        if second > 0 {
            output[first..first + second].copy_from_slice(&self.data[..second]);
            self.head = second;
        }

        self.len -= to_pop;
        if self.len == 0 {
            self.head = 0;
            self.tail = 0;
        }
        to_pop
    }

    /// Copies the front samples into `out` without removing them.
    ///
    /// Returns the number of samples copied.
    pub fn peek_slice(&self, out: &mut [f32]) -> usize {
        let to_copy = out.len().min(self.len);
        if to_copy == 0 || self.capacity() == 0 {
            return 0;
        }
        let first = to_copy.min(self.capacity() - self.head);
        out[..first].copy_from_slice(&self.data[self.head..self.head + first]);
        let second = to_copy - first;
        if second > 0 {
            out[first..first + second].copy_from_slice(&self.data[..second]);
        }
        to_copy
    }

    /// Discards up to `n` samples from the front.
    ///
    /// Returns the number discarded.
    pub fn discard(&mut self, n: usize) -> usize {
        let to_drop = n.min(self.len);
        if to_drop == 0 || self.capacity() == 0 {
            return 0;
        }
        let first = to_drop.min(self.capacity() - self.head);
        self.head = wrap(self.head + first, self.capacity());
        let second = to_drop - first;
        if second > 0 {
            self.head = second;
        }
        self.len -= to_drop;
        if self.len == 0 {
            self.head = 0;
            self.tail = 0;
        }
        to_drop
    }
}

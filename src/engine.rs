//! The processing contract shared by every engine in the suite.

/// Capability interface for a real-time audio engine.
///
/// The surrounding host drives implementations through this trait; the
/// factory/registry mapping engine IDs to implementations lives outside
/// this crate. All methods run on the caller's thread, never block, and
/// never allocate in the `process` path after `prepare`.
pub trait AudioEngine {
    /// (Re)allocates all internal buffers for the given sample rate and
    /// worst-case host block size. Idempotent; calling again performs a
    /// full reallocation and state reset.
    fn prepare(&mut self, sample_rate: f64, max_block_size: usize);

    /// Transforms audio in place, one slice per channel.
    fn process(&mut self, buffer: &mut [&mut [f32]]);

    /// Clears all buffers and persistent state to the post-`prepare`
    /// baseline.
    fn reset(&mut self);

    /// Sets one normalized parameter in [0, 1]. Values are clamped before
    /// use and take effect no later than the next frame boundary. Unknown
    /// indices are ignored.
    fn set_parameter(&mut self, index: usize, value: f32);

    /// Fixed processing latency in samples, constant after `prepare`.
    fn latency_samples(&self) -> usize;
}

//! Ring buffers, window functions, FFT calibration, and numerical safety.

pub mod fft;
pub mod ring_buffer;
pub mod safety;
pub mod window;

pub use ring_buffer::SampleRing;
pub use window::hann_window;

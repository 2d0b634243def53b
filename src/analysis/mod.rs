//! Time-domain analysis: transient envelope tracking.

pub mod transient;

pub use transient::TransientFollower;

//! # redirect-core
//!
//! Platform-agnostic audio redirection core.
//!
//! Provides the format/result lexicon, device model, lock-free ring buffer,
//! data callbacks, and the per-mode session state machines. Platform
//! backends implement the `AudioHost` trait and plug into the generic
//! `Redirector`.
//!
//! ## Architecture
//!
//! ```text
//! redirect-core (this crate)
//! ├── traits/       ← AudioHost, DeviceHandle, DataCallback, RedirectObserver
//! ├── models/       ← RedirectError, ResultCode, SampleFormat, StreamConfig, DeviceList, etc.
//! ├── processing/   ← SPSC ring buffer, linear gain
//! ├── session/      ← LoopbackSession, DuplexSession, Redirector (controller)
//! └── testing/      ← MockHost (tests and feature "mock")
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod testing;

// Re-export key types at crate root for convenience.
pub use models::config::{StreamConfig, VolumeBoost, RING_BUFFER_SECONDS};
pub use models::device::{DeviceDescriptor, DeviceDirection, DeviceId, DeviceList};
pub use models::error::{ErrorKind, RedirectError};
pub use models::format::{
    parse_sample_rate, sample_rate_label, SampleFormat, SUPPORTED_FORMATS, SUPPORTED_SAMPLE_RATES,
};
pub use models::lexicon::{format_to_string, result_code_to_string, string_to_format};
pub use models::result_code::ResultCode;
pub use models::state::{DeviceRole, DeviceState, RedirectMode, RedirectState};
pub use processing::gain::apply_gain;
pub use processing::ring_buffer::{
    ring_buffer, ReadGrant, RingConsumer, RingProducer, RingStatus, WriteGrant,
};
pub use session::redirector::Redirector;
pub use traits::audio_host::{AudioHost, DeviceHandle};
pub use traits::data_callback::DataCallback;
pub use traits::redirect_observer::RedirectObserver;

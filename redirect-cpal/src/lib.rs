//! # redirect-cpal
//!
//! cpal backend for redirect-core.
//!
//! Provides:
//! - `CpalHost` — `AudioHost` over a cpal host: device directory and stream handles
//! - `DeviceEnumerator` — playback/capture endpoint listing
//! - `CpalDeviceHandle` — one or more cpal streams behind the `DeviceHandle` trait
//!
//! ## Platform Requirements
//! - Loopback capture needs WASAPI (Windows); elsewhere it fails with
//!   `DeviceTypeNotSupported`
//! - Playback and duplex work on every cpal host
//!
//! ## Usage
//! ```ignore
//! use redirect_core::{DeviceId, Redirector};
//! use redirect_cpal::CpalHost;
//!
//! let mut redirector = Redirector::new(CpalHost::new()?);
//! redirector.start_loopback_redirect(&DeviceId::new("Speakers"), &DeviceId::new("Headphones"))?;
//! ```

pub mod convert;
pub mod device_enumerator;
pub mod host;
pub mod stream_handle;

pub use device_enumerator::DeviceEnumerator;
pub use host::CpalHost;
pub use stream_handle::CpalDeviceHandle;

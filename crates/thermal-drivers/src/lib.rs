//! `thermal-drivers` is a library crate that provides architecture-agnostic
//! drivers for the temperature sensors supervised by the thermal manager.
//!
//! All drivers are implemented using only the [`embedded-hal-async`] traits,
//! ensuring compatibility with any platform that supports these
//! abstractions.
//!
//! [`embedded-hal-async`]: https://crates.io/crates/embedded-hal-async

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![no_std]

/// The `LM75BD` driver.
#[cfg(feature = "lm75bd")]
pub mod lm75bd;

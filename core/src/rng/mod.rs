//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, deterministic random number generation.
//! CRITICAL: All randomness in the simulator MUST go through this module.
//! The context owns the single stream; distributions receive it explicitly.

pub mod distributions;
mod xorshift;

pub use xorshift::RngManager;

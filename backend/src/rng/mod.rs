//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: All randomness in the simulator MUST go through this module.
//! Selection policies receive the orchestrator's generator by `&mut`; they
//! never seed one of their own.

mod xorshift;

pub use xorshift::RngManager;

//! Shared utilities and error types for the health records contract suite.
//!
//! This crate provides:
//! - [`CommonError`]: error codes shared by every contract.
//! - [`nonce`]: per-sender monotonic counters used to derive collision-free
//!   identifiers.
//!
//! Contract-specific errors convert from [`CommonError`] into their own enums.

#![no_std]

use soroban_sdk::contracterror;

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod nonce;

pub use nonce::*;

// ── Shared error enum ────────────────────────────────────────────────────────

/// Error codes raised by the shared helpers in this crate.
///
/// # Code ranges
/// | Range   | Purpose                       |
/// |---------|-------------------------------|
/// | 30 – 39 | Validation / input            |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum CommonError {
    // ── Validation (30–39) ───────────────────────────────────
    /// The per-sender nonce counter is exhausted.
    NonceOverflow = 32,
}

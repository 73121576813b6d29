//! Pipeline stages for memorial rendering.
//!
//! Each submodule implements exactly one concern.
//! Keeping them separate makes each independently testable and keeps page
//! renderers free of file-system and parsing code.
//!
//! ## Data Flow
//!
//! ```text
//! request ──▶ normalize ──▶ cover ──▶ entry × N ──▶ closing ──▶ bytes
//!                            ▲          ▲
//!                         layout     assets
//! ```
//!
//! 1. [`normalize`] — clean user strings so the base-14 fonts can draw them
//! 2. [`layout`]    — page geometry shared read-only by every renderer
//! 3. [`assets`]    — resolve and decode entry photos; failures are values
//! 4. [`cover`], [`entry`], [`closing`] — one renderer per page kind
//! 5. [`ornaments`] — palette and recurring decorative shapes

pub mod assets;
pub mod closing;
pub mod cover;
pub mod entry;
pub mod layout;
pub mod normalize;
pub mod ornaments;

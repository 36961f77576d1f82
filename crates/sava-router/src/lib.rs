// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider endpoint routing for the SAVA sentiment classifier.
//!
//! This crate provides:
//! - [`RouterPolicy`]: cooldown, candidate cap, and per-attempt timeout as data
//! - [`ProviderRouter`]: rotation over model endpoints with last-known-good ordering
//!
//! The router is the only place that retries. Provider adapters report one
//! failure per call and the router decides whether to drop, cool down, or skip.

pub mod policy;
pub mod router;

pub use policy::RouterPolicy;
pub use router::{ProviderRouter, RouteExhausted};

// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache-first batch classification for the SAVA sentiment classifier.
//!
//! [`BatchDispatcher`] answers what it can from the result store, sends every
//! remaining text to the provider in one combined prompt, and writes each
//! parsed verdict back before returning. The only error it surfaces is a
//! store that fails its health check.

pub mod dispatcher;

pub use dispatcher::BatchDispatcher;

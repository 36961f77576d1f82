// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for SAVA integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock LLM provider with scripted per-endpoint outcomes
//! - [`MockStore`] - In-memory result store with switchable failures
//! - [`TestHarness`] - Store, router and dispatcher wired on a temp database

pub mod harness;
pub mod mock_provider;
pub mod mock_store;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_provider::{MockOutcome, MockProvider};
pub use mock_store::MockStore;

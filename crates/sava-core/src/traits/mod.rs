// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` so they can be held as `Arc<dyn ...>`.

pub mod adapter;
pub mod provider;
pub mod store;

pub use adapter::PluginAdapter;
pub use provider::ProviderAdapter;
pub use store::ResultStore;

// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply parsing and prompt building for the SAVA sentiment classifier.
//!
//! Model replies are free text. [`parse_single`] runs an ordered cascade of
//! extraction strategies over one reply; [`parse_batch`] splits a combined
//! `index|label|explanation` reply into exactly one verdict per item. Neither
//! function fails: whatever cannot be read becomes `Neutral`.

pub mod batch;
pub mod cascade;
pub mod keywords;
pub mod prompt;

pub use batch::parse_batch;
pub use cascade::{ParseOutcome, Strategy, parse_single};
pub use prompt::{batch_prompt, single_prompt};

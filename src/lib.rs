// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Archivist: AI-assisted filing of scanned documents
//!
//! Documents dropped into an intake folder are classified by an external
//! service, held for human review, and on confirmation copied into a
//! classified output tree while the originals are archived.

pub mod classifier;
pub mod config;
pub mod confirm;
pub mod error;
pub mod extract;
pub mod history;
pub mod naming;
pub mod orchestrator;
pub mod queue;
pub mod vocabulary;
pub mod web;

#[cfg(test)]
mod testing;

pub use config::{AppConfig, IntakeConfig};
pub use error::{ArchivistError, Result};

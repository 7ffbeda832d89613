//! First-run setup for the local mail client
//!
//! Brings a fresh or existing install to its baseline state: the system tag
//! taxonomy, optional subsystems, profiles and encryption policy seeded from
//! the user's secret keys, and the one-time search index obfuscation.
//! Safe to run on every start.
//!
//! ## Module Organization
//!
//! - `services/`: Setup stages and the orchestrator (`run_setup`)
//! - `config/`: Configuration tree and its stores
//! - `tags/`: Canonical tag taxonomy and reconciliation
//! - `keyring/`: Secret key discovery (GnuPG)
//! - `adapters/`: SQLite-backed tag, mailbox and index stores
//! - `storage`: Mailbox and index capabilities
//! - `types/`: Error types

pub mod adapters;
pub mod config;
pub mod keyring;
pub mod services;
pub mod storage;
pub mod tags;
pub mod types;

pub use services::{check_guard, run_setup, SetupEnvironment, SetupReport, SetupServices};
pub use types::error::{Result, SetupError};

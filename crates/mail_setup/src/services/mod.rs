//! Setup stages and the orchestrator that sequences them
//!
//! Each stage takes the configuration by `&mut` plus the collaborators it
//! needs, and records what it did as [`Notice`]s. Stages never abort the run.

pub mod capabilities;
pub mod identity_discovery;
pub mod index_obfuscation;
pub mod migrations;
pub mod notice;
pub mod setup;

pub use notice::{Notice, NoticeLevel, Notices};
pub use setup::{check_guard, run_setup, SetupEnvironment, SetupReport, SetupServices, SetupStage};

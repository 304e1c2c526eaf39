//! Shared fixtures for integration tests

#![allow(dead_code)]

mod collaborators;
mod project;
mod registry;

pub use collaborators::{RecordingRunner, ScriptedPrompter, test_services};
pub use project::{write_file, write_snapshot_metadata};
pub use registry::MockRegistry;

//! Registry implementations for searching published artifacts

pub mod nexus;

pub use nexus::NexusClient;

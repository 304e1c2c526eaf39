//! Version layer: registry search, semver utilities, resolution and validation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│  Resolver   │     │  Validator  │
//! │  (search)   │     │ (pre-rel.)  │     │ (monotonic) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │                   │
//!        ▼                   ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Registries  │     │  Metadata   │     │   Semver    │
//! │   (nexus)   │     │ (local .m2) │     │  (+ range)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`registry`]: Registry trait and search query construction
//! - [`registries`]: Concrete registry implementations (Nexus)
//! - [`resolver`]: Pre-release version resolution
//! - [`validator`]: Project and tool version checks
//! - [`metadata`]: Local Maven snapshot metadata
//! - [`semver`] / [`range`]: Shared semver utilities and range expressions
//! - [`error`]: Error types for registry and metadata access
//! - [`types`]: Nexus search response types

pub mod error;
pub mod metadata;
pub mod range;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod semver;
pub mod types;
pub mod validator;

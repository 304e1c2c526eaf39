//! Stage pipeline
//!
//! - stage.rs: the Stage trait and the per-run Services bundle
//! - engine.rs: ordered, fail-fast execution
//! - predicates.rs: building blocks for stage applicability
//! - stages/: the fixed default stage list

pub mod engine;
pub mod predicates;
pub mod stage;
pub mod stages;

pub use engine::Pipeline;
pub use stage::{Services, Stage};
pub use stages::default_stages;

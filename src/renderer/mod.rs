//! Renderer boundary
//!
//! Window, shaders and GPU upload live outside this crate. The core only
//! prepares the flat per-seed buffer the instanced quad pass consumes.

pub mod instance;

pub use instance::SeedInstance;

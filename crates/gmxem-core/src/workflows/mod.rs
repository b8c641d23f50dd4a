//! # Workflows Module
//!
//! This module provides the high-level entry points that compose the pipeline
//! stages into complete runs.
//!
//! ## Overview
//!
//! Workflows are the top-level API of the library. They tie the [`crate::core`]
//! schemas and the [`crate::engine`] stages together, handle progress
//! reporting, and guarantee that a run either returns a complete outcome or a
//! single typed error with every staged resource already released.
//!
//! - **Minimization Workflow** ([`minimize`]) - The full
//!   preparation → compute → post-processing energy-minimization pipeline.

pub mod minimize;

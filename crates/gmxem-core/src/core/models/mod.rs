//! Data schemas exchanged between the pipeline and its callers.
//!
//! The [`request`] module defines the minimization request consumed (read-only)
//! as pipeline input. The [`schema`] module provides the opaque molecule,
//! force-field, and trajectory objects whose only contract is file import and
//! export. The [`artifact`] module defines the role-tagged temporary files the
//! stages hand to each other.

pub mod artifact;
pub mod request;
pub mod schema;

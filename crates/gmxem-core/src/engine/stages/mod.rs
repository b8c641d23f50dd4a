//! The three pipeline stages, in execution order.
//!
//! Each stage is a run-to-completion function consuming the previous stage's
//! output. Ownership of staged artifacts and scratch directories transfers
//! strictly forward: preparation → compute → post-processing, never
//! backwards and never shared.

pub mod compute;
pub mod post_processing;
pub mod preparation;

//! Test harness for the o-grid builders and the command framework.
//!
//! Provides programmatic tools for scripting multi-step topology workflows,
//! verifying correctness at every step, and producing diagnostic output on
//! failure.
//!
//! # Key components
//!
//! - [`Scenario`] — fluent API for building volumes and running o-grid
//!   commands through the real history
//! - [`assertions`] — assertion helpers with contextual diagnostics
//! - [`helpers`] — volume spec shorthands and the harness error type

pub mod assertions;
pub mod helpers;
pub mod scenario;

pub use helpers::HarnessError;
pub use scenario::Scenario;

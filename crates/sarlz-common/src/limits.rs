//! Centralized limits and thresholds for the sarlz compiler.
//!
//! Every bound that keeps a computation finite on degenerate input lives
//! here, so the solver and the driver agree on the same values.

/// Maximum number of default-valued parameters a single action may declare
/// before overload synthesis refuses to run.
///
/// Synthesis produces `2^k - 1` overloads for `k` default-valued
/// parameters. Sixteen already means 65 535 generated members; anything
/// beyond is treated as a degenerate declaration and reported instead of
/// being expanded.
///
/// # SARL example
///
/// ```text
/// def configure(a : int = 0, b : int = 1, c : String = null /* ... 17 defaults ... */)
/// //  ~~~~~~~~~ too many default-valued parameters
/// ```
pub const MAX_DEFAULT_PARAMETERS: u32 = 16;

/// Hard ceiling for [`MAX_DEFAULT_PARAMETERS`] overrides coming from
/// configuration. Subsets are enumerated through a `u32` bitmask.
pub const MAX_DEFAULT_PARAMETERS_CEILING: u32 = 24;

/// Maximum number of ancestor edges processed by one inheritance walk.
///
/// Cycles are already cut by the visited set; this bounds graphs whose
/// provider keeps producing fresh identities.
pub const MAX_ANCESTOR_EDGES: u32 = 100_000;

/// Initial capacity for the ancestor work queue.
pub const ANCESTOR_QUEUE_CAPACITY: usize = 16;

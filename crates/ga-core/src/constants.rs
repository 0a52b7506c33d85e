/// Largest supported vector-space dimension (blade IDs are `u64` bit patterns).
pub const MAX_DIMENSION: u32 = 64;

/// Default near-zero tolerance for `f64` scalars.
pub const DEFAULT_EPSILON: f64 = 1e-12;

/// `Auto` strategy switches from pairwise products to GBT traversal once
/// `terms(a) * terms(b)` reaches this many candidate pairs.
pub const GBT_PAIR_THRESHOLD: usize = 256;

/// Composer emits graded storage only when every populated grade is at
/// least this dense (populated / C(n, k)).
pub const GRADED_DENSITY: f64 = 0.5;

/// Largest dimension accepted for symbolic generic multivectors.
pub const MAX_SYMBOLIC_DIMENSION: u32 = 10;

/// Largest number of coefficients the dense random generators will produce.
pub const MAX_DENSE_TERMS: u64 = 1 << 20;

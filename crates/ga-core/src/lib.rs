//! Generic geometric (Clifford) algebra engine.
//!
//! Multivectors over basis blades identified by `u64` bit patterns, in any
//! signature up to 64 dimensions. Products are computed from basis-blade
//! signs, either pairwise or by a guided binary tree (GBT) walk that prunes
//! the `2^n` blade space down to the terms actually present. Linear maps
//! extend to every grade as outermorphisms.
//!
//! All arithmetic goes through a [`ScalarProcessor`], so the same code runs on
//! `f64` and on symbolic polynomials.
//!
//! Zero I/O: the wire and text modules only convert to and from strings.

pub mod basis;
pub mod composer;
pub mod constants;
pub mod error;
pub mod gbt;
pub mod outermorphism;
pub mod polynomial;
pub mod processor;
pub mod product;
pub mod sampling;
pub mod scalar;
pub mod signature;
pub mod storage;
pub mod text;
pub mod wire;

pub use basis::{
    basis_bivector_index, basis_bivector_indices, blade_name, checked_basis_bivector_indices,
    grade, id_to_index, index_to_id,
};
pub use composer::Composer;
pub use constants::{DEFAULT_EPSILON, GBT_PAIR_THRESHOLD, MAX_DIMENSION, MAX_SYMBOLIC_DIMENSION};
pub use error::{GaError, Result};
pub use gbt::{GbtProductTraversal, GbtStats, GbtTermTraversal, traverse};
pub use outermorphism::Outermorphism;
pub use polynomial::{Polynomial, PolynomialProcessor};
pub use processor::{ChangeOfBasisProcessor, OrthonormalProcessor, ProductStrategy};
pub use product::{BladeProduct, ProductKind, basis_blade_product, product_sign};
pub use scalar::{FloatProcessor, ScalarProcessor};
pub use signature::{BasisSquare, Signature};
pub use storage::{Storage, StorageKind};
pub use text::{format_storage, parse_blade, parse_storage, parse_terms};
pub use wire::{CURRENT_VERSION, export_json, import_json};

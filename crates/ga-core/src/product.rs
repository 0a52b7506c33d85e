//! Bilinear product signatures on basis blades.
//!
//! Every product of two basis blades `e_A`, `e_B` is either zero or
//! `±e_(A xor B)`. The sign combines the parity of the swaps that sort the
//! concatenated basis vectors into canonical order with the metric squares
//! of the shared basis vectors. Product kinds differ only in which blade
//! pairs they keep.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GaError, Result};
use crate::signature::Signature;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    /// Scalar product: grade-0 part of the geometric product.
    Sp,
    /// Outer (wedge) product.
    Op,
    /// Geometric product.
    Gp,
    /// Left contraction.
    Lcp,
    /// Right contraction.
    Rcp,
    /// Fat dot product: left or right contraction.
    Fdp,
    /// Hestenes inner product: fat dot without scalar operands.
    Hip,
    /// Commutator product `(AB - BA) / 2`.
    Cp,
    /// Anti-commutator product `(AB + BA) / 2`.
    Acp,
}

impl ProductKind {
    pub const ALL: [ProductKind; 9] = [
        ProductKind::Sp,
        ProductKind::Op,
        ProductKind::Gp,
        ProductKind::Lcp,
        ProductKind::Rcp,
        ProductKind::Fdp,
        ProductKind::Hip,
        ProductKind::Cp,
        ProductKind::Acp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProductKind::Sp => "sp",
            ProductKind::Op => "op",
            ProductKind::Gp => "gp",
            ProductKind::Lcp => "lcp",
            ProductKind::Rcp => "rcp",
            ProductKind::Fdp => "fdp",
            ProductKind::Hip => "hip",
            ProductKind::Cp => "cp",
            ProductKind::Acp => "acp",
        }
    }

    /// Whether the blade pair passes this product's grade filter.
    ///
    /// Commutator kinds additionally depend on whether the blades commute,
    /// which [`product_sign`] checks separately.
    #[inline]
    pub fn keeps_pair(self, id1: u64, id2: u64) -> bool {
        let left = id1 & !id2 == 0;
        let right = id2 & !id1 == 0;
        match self {
            ProductKind::Gp | ProductKind::Cp | ProductKind::Acp => true,
            ProductKind::Op => id1 & id2 == 0,
            ProductKind::Sp => id1 == id2,
            ProductKind::Lcp => left,
            ProductKind::Rcp => right,
            ProductKind::Fdp => left || right,
            ProductKind::Hip => id1 != 0 && id2 != 0 && (left || right),
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProductKind {
    type Err = GaError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        ProductKind::ALL
            .into_iter()
            .find(|kind| kind.name() == lower)
            .ok_or_else(|| GaError::invalid(format!("unknown product kind '{s}'")))
    }
}

/// Result of a basis-blade product: `sign * e_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BladeProduct {
    pub id: u64,
    pub sign: i32,
}

impl BladeProduct {
    pub fn is_zero(self) -> bool {
        self.sign == 0
    }
}

/// Sign of reordering `e_id1 e_id2` into canonical ascending order.
#[inline]
pub fn reorder_sign(id1: u64, id2: u64) -> i32 {
    let mut a = id1 >> 1;
    let mut swaps = 0u32;
    while a != 0 {
        swaps += (a & id2).count_ones();
        a >>= 1;
    }
    if swaps & 1 == 0 { 1 } else { -1 }
}

/// Product of the squares of the basis vectors in `shared`. Any zero
/// square makes the whole product zero.
#[inline]
pub fn metric_sign(signature: &Signature, shared: u64) -> i32 {
    if shared & signature.zero_mask() != 0 {
        return 0;
    }
    if (shared & signature.negative_mask()).count_ones() & 1 == 0 {
        1
    } else {
        -1
    }
}

/// Whether `e_id1 e_id2 == e_id2 e_id1`. The metric part is symmetric, so
/// only the reordering parity matters.
#[inline]
pub fn blades_commute(id1: u64, id2: u64) -> bool {
    reorder_sign(id1, id2) == reorder_sign(id2, id1)
}

/// Geometric product sign under `signature`.
#[inline]
pub fn gp_sign(signature: &Signature, id1: u64, id2: u64) -> i32 {
    let metric = metric_sign(signature, id1 & id2);
    if metric == 0 {
        return 0;
    }
    metric * reorder_sign(id1, id2)
}

/// Geometric product sign when every basis vector squares to +1.
#[inline]
pub fn egp_sign(id1: u64, id2: u64) -> i32 {
    reorder_sign(id1, id2)
}

#[inline]
fn commutator_filter(kind: ProductKind, id1: u64, id2: u64, sign: i32) -> i32 {
    match kind {
        ProductKind::Cp if blades_commute(id1, id2) => 0,
        ProductKind::Acp if !blades_commute(id1, id2) => 0,
        _ => sign,
    }
}

/// Sign of `kind` applied to `e_id1`, `e_id2`; the result blade is `id1 ^ id2`.
#[inline]
pub fn product_sign(kind: ProductKind, signature: &Signature, id1: u64, id2: u64) -> i32 {
    if !kind.keeps_pair(id1, id2) {
        return 0;
    }
    let sign = gp_sign(signature, id1, id2);
    if sign == 0 {
        return 0;
    }
    commutator_filter(kind, id1, id2, sign)
}

/// [`product_sign`] for Euclidean signatures, skipping the metric lookup.
#[inline]
pub fn euclidean_product_sign(kind: ProductKind, id1: u64, id2: u64) -> i32 {
    if !kind.keeps_pair(id1, id2) {
        return 0;
    }
    commutator_filter(kind, id1, id2, egp_sign(id1, id2))
}

#[inline]
pub fn basis_blade_product(
    kind: ProductKind,
    signature: &Signature,
    id1: u64,
    id2: u64,
) -> BladeProduct {
    BladeProduct {
        id: id1 ^ id2,
        sign: product_sign(kind, signature, id1, id2),
    }
}

/// Reverse: `(-1)^(g(g-1)/2)`.
#[inline]
pub fn reverse_sign(grade: u32) -> i32 {
    if grade % 4 >= 2 { -1 } else { 1 }
}

/// Grade involution: `(-1)^g`.
#[inline]
pub fn grade_involution_sign(grade: u32) -> i32 {
    if grade % 2 == 1 { -1 } else { 1 }
}

/// Clifford conjugate: `(-1)^(g(g+1)/2)`.
#[inline]
pub fn clifford_conjugate_sign(grade: u32) -> i32 {
    if matches!(grade % 4, 1 | 2) { -1 } else { 1 }
}

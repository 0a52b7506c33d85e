//! Processor facades: named products and unary operations over a signature.
//!
//! [`OrthonormalProcessor`] evaluates products directly on basis-blade pairs,
//! either by nested iteration or by a joint GBT walk. [`ChangeOfBasisProcessor`]
//! handles a non-orthonormal frame by mapping operands into an orthonormal
//! frame, delegating, and mapping the result back.

use serde::{Deserialize, Serialize};

use crate::basis::grade;
use crate::composer::Composer;
use crate::constants::GBT_PAIR_THRESHOLD;
use crate::error::{GaError, Result};
use crate::gbt::{GbtProductTraversal, GbtTermTraversal};
use crate::outermorphism::Outermorphism;
use crate::product::{
    ProductKind, clifford_conjugate_sign, euclidean_product_sign, gp_sign, grade_involution_sign,
    product_sign, reverse_sign,
};
use crate::scalar::ScalarProcessor;
use crate::signature::Signature;
use crate::storage::Storage;

/// How [`OrthonormalProcessor::product`] enumerates blade pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStrategy {
    /// Every stored pair, one sign lookup each.
    Pairwise,
    /// Joint GBT traversal with subtree pruning.
    Gbt,
    /// GBT once the operands have at least `GBT_PAIR_THRESHOLD` candidate pairs.
    #[default]
    Auto,
}

macro_rules! named_products {
    ($($(#[$doc:meta])* $name:ident => $kind:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(
                &self,
                a: &Storage<P::Scalar>,
                b: &Storage<P::Scalar>,
            ) -> Result<Storage<P::Scalar>> {
                self.product(ProductKind::$kind, a, b)
            }
        )*

        /// Scalar product `<a b>_0`.
        pub fn sp(&self, a: &Storage<P::Scalar>, b: &Storage<P::Scalar>) -> Result<P::Scalar> {
            let result = self.product(ProductKind::Sp, a, b)?;
            Ok(self.scalar_part(&result))
        }
    };
}

pub struct OrthonormalProcessor<P: ScalarProcessor> {
    signature: Signature,
    scalar: P,
    strategy: ProductStrategy,
}

impl<P: ScalarProcessor> OrthonormalProcessor<P> {
    pub fn new(signature: Signature, scalar: P) -> Self {
        tracing::debug!(%signature, "orthonormal processor");
        Self {
            signature,
            scalar,
            strategy: ProductStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ProductStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn scalar_processor(&self) -> &P {
        &self.scalar
    }

    pub fn strategy(&self) -> ProductStrategy {
        self.strategy
    }

    pub fn dimension(&self) -> u32 {
        self.signature.dimension()
    }

    /// Fails when `storage` holds a blade outside this algebra.
    pub fn validate(&self, storage: &Storage<P::Scalar>) -> Result<()> {
        storage.validate(self.signature.dimension())
    }

    pub fn product(
        &self,
        kind: ProductKind,
        a: &Storage<P::Scalar>,
        b: &Storage<P::Scalar>,
    ) -> Result<Storage<P::Scalar>> {
        self.validate(a)?;
        self.validate(b)?;
        let mut composer = Composer::new(&self.scalar);
        if self.use_gbt(a, b) {
            self.product_gbt(kind, a, b, &mut composer);
        } else {
            self.product_pairwise(kind, a, b, &mut composer);
        }
        Ok(composer.into_storage())
    }

    fn use_gbt(&self, a: &Storage<P::Scalar>, b: &Storage<P::Scalar>) -> bool {
        match self.strategy {
            ProductStrategy::Pairwise => false,
            ProductStrategy::Gbt => true,
            ProductStrategy::Auto => {
                a.term_count().saturating_mul(b.term_count()) >= GBT_PAIR_THRESHOLD
            }
        }
    }

    fn product_pairwise(
        &self,
        kind: ProductKind,
        a: &Storage<P::Scalar>,
        b: &Storage<P::Scalar>,
        composer: &mut Composer<'_, P>,
    ) {
        let euclidean = self.signature.is_euclidean();
        for (id1, v1) in a.terms() {
            for (id2, v2) in b.terms() {
                let sign = if euclidean {
                    euclidean_product_sign(kind, id1, id2)
                } else {
                    product_sign(kind, &self.signature, id1, id2)
                };
                if sign != 0 {
                    composer.add_signed_term(id1 ^ id2, sign, &self.scalar.times(v1, v2));
                }
            }
        }
    }

    fn product_gbt(
        &self,
        kind: ProductKind,
        a: &Storage<P::Scalar>,
        b: &Storage<P::Scalar>,
        composer: &mut Composer<'_, P>,
    ) {
        let p = &self.scalar;
        GbtProductTraversal::new(kind, &self.signature, a, b).run(|id1, v1, id2, v2, sign| {
            composer.add_signed_term(id1 ^ id2, sign, &p.times(v1, v2));
        });
    }

    named_products! {
        /// Outer product `a ^ b`.
        op => Op,
        /// Geometric product `a b`.
        gp => Gp,
        lcp => Lcp,
        rcp => Rcp,
        fdp => Fdp,
        hip => Hip,
        cp => Cp,
        acp => Acp,
    }

    pub fn add(
        &self,
        a: &Storage<P::Scalar>,
        b: &Storage<P::Scalar>,
    ) -> Result<Storage<P::Scalar>> {
        self.validate(a)?;
        self.validate(b)?;
        let mut composer = Composer::from_storage(&self.scalar, a);
        composer.add_terms(b);
        Ok(composer.into_storage())
    }

    pub fn subtract(
        &self,
        a: &Storage<P::Scalar>,
        b: &Storage<P::Scalar>,
    ) -> Result<Storage<P::Scalar>> {
        self.validate(a)?;
        self.validate(b)?;
        let mut composer = Composer::from_storage(&self.scalar, a);
        composer.subtract_terms(b);
        Ok(composer.into_storage())
    }

    pub fn scale(&self, a: &Storage<P::Scalar>, factor: &P::Scalar) -> Result<Storage<P::Scalar>> {
        self.validate(a)?;
        let mut composer = Composer::new(&self.scalar);
        composer.add_scaled_terms(a, factor);
        Ok(composer.into_storage())
    }

    pub fn negative(&self, a: &Storage<P::Scalar>) -> Result<Storage<P::Scalar>> {
        self.validate(a)?;
        let mut composer = Composer::new(&self.scalar);
        composer.subtract_terms(a);
        Ok(composer.into_storage())
    }

    /// Terms of `a` whose grade is in `grades`.
    pub fn grade_part(&self, a: &Storage<P::Scalar>, grades: &[u32]) -> Result<Storage<P::Scalar>> {
        self.validate(a)?;
        let (found, _) = GbtTermTraversal::new(a, grades).run(self.dimension());
        let mut composer = Composer::new(&self.scalar);
        for (id, value) in found {
            composer.set_term(id, value.clone());
        }
        Ok(composer.into_storage())
    }

    fn map_grade_sign(
        &self,
        a: &Storage<P::Scalar>,
        sign_of: fn(u32) -> i32,
    ) -> Result<Storage<P::Scalar>> {
        self.validate(a)?;
        let mut composer = Composer::new(&self.scalar);
        for (id, value) in a.terms() {
            composer.add_signed_term(id, sign_of(grade(id)), value);
        }
        Ok(composer.into_storage())
    }

    pub fn reverse(&self, a: &Storage<P::Scalar>) -> Result<Storage<P::Scalar>> {
        self.map_grade_sign(a, reverse_sign)
    }

    pub fn grade_involution(&self, a: &Storage<P::Scalar>) -> Result<Storage<P::Scalar>> {
        self.map_grade_sign(a, grade_involution_sign)
    }

    pub fn clifford_conjugate(&self, a: &Storage<P::Scalar>) -> Result<Storage<P::Scalar>> {
        self.map_grade_sign(a, clifford_conjugate_sign)
    }

    /// `<a ~a>_0`.
    pub fn norm_squared(&self, a: &Storage<P::Scalar>) -> Result<P::Scalar> {
        let reversed = self.reverse(a)?;
        self.sp(a, &reversed)
    }

    pub fn scalar_part(&self, a: &Storage<P::Scalar>) -> P::Scalar {
        a.get(0).cloned().unwrap_or_else(|| self.scalar.zero())
    }

    pub fn pseudo_scalar(&self) -> Storage<P::Scalar> {
        Storage::basis_blade(self.signature.pseudo_scalar_id(), self.scalar.one())
    }

    /// `I^-1 = (I I) I`, since `I I = ±1`. Fails for degenerate signatures.
    pub fn pseudo_scalar_inverse(&self) -> Result<Storage<P::Scalar>> {
        if self.signature.is_degenerate() {
            return Err(GaError::Singular(format!(
                "pseudoscalar of {} has no inverse",
                self.signature
            )));
        }
        let id = self.signature.pseudo_scalar_id();
        let sign = gp_sign(&self.signature, id, id);
        Ok(Storage::basis_blade(id, self.scalar.from_i32(sign)))
    }

    /// `a ⌋ I^-1`.
    pub fn dual(&self, a: &Storage<P::Scalar>) -> Result<Storage<P::Scalar>> {
        let inverse = self.pseudo_scalar_inverse()?;
        self.lcp(a, &inverse)
    }

    /// `a ⌋ I`; inverts [`dual`](Self::dual).
    pub fn undual(&self, a: &Storage<P::Scalar>) -> Result<Storage<P::Scalar>> {
        self.lcp(a, &self.pseudo_scalar())
    }

    /// `~a / <a ~a>_0`, the inverse of a versor. Fails for null versors.
    pub fn versor_inverse(&self, a: &Storage<P::Scalar>) -> Result<Storage<P::Scalar>> {
        let reversed = self.reverse(a)?;
        let norm = self.sp(a, &reversed)?;
        if self.scalar.is_zero(&norm) {
            return Err(GaError::Singular("versor has zero norm".to_string()));
        }
        let mut composer = Composer::new(&self.scalar);
        for (id, value) in reversed.terms() {
            composer.set_term(id, self.scalar.divide(value, &norm)?);
        }
        Ok(composer.into_storage())
    }

    /// Applies an outermorphism whose domain and target are this algebra.
    pub fn map(
        &self,
        outermorphism: &Outermorphism<P::Scalar>,
        a: &Storage<P::Scalar>,
    ) -> Result<Storage<P::Scalar>> {
        if outermorphism.target_dimension() != self.dimension() {
            return Err(GaError::DimensionMismatch {
                expected: self.dimension(),
                found: outermorphism.target_dimension(),
            });
        }
        outermorphism.map(&self.scalar, a)
    }

    pub fn are_equal(&self, a: &Storage<P::Scalar>, b: &Storage<P::Scalar>) -> Result<bool> {
        Ok(self.subtract(a, b)?.is_empty())
    }
}

/// Products in a non-orthonormal frame.
///
/// Operands and results are expressed on the frame's basis blades
/// `f_A = f_a1 ^ f_a2 ^ ...`. Products are evaluated in the orthonormal frame.
pub struct ChangeOfBasisProcessor<P: ScalarProcessor> {
    orthonormal: OrthonormalProcessor<P>,
    to_orthonormal: Outermorphism<P::Scalar>,
    from_orthonormal: Outermorphism<P::Scalar>,
}

impl<P: ScalarProcessor> ChangeOfBasisProcessor<P> {
    /// `to_orthonormal` maps frame coordinates to orthonormal coordinates.
    pub fn new(
        orthonormal: OrthonormalProcessor<P>,
        to_orthonormal: Outermorphism<P::Scalar>,
    ) -> Result<Self> {
        let n = orthonormal.dimension();
        for found in [to_orthonormal.domain_dimension(), to_orthonormal.target_dimension()] {
            if found != n {
                return Err(GaError::DimensionMismatch { expected: n, found });
            }
        }
        let from_orthonormal = to_orthonormal.inverse(orthonormal.scalar_processor())?;
        tracing::debug!(dimension = n, "change of basis processor");
        Ok(Self {
            orthonormal,
            to_orthonormal,
            from_orthonormal,
        })
    }

    /// Frame given as its vectors in orthonormal coordinates.
    pub fn from_frame(
        orthonormal: OrthonormalProcessor<P>,
        frame: Vec<Storage<P::Scalar>>,
    ) -> Result<Self> {
        let n = orthonormal.dimension();
        let to_orthonormal = Outermorphism::new(n, n, frame)?;
        Self::new(orthonormal, to_orthonormal)
    }

    pub fn orthonormal(&self) -> &OrthonormalProcessor<P> {
        &self.orthonormal
    }

    pub fn to_orthonormal_map(&self) -> &Outermorphism<P::Scalar> {
        &self.to_orthonormal
    }

    pub fn from_orthonormal_map(&self) -> &Outermorphism<P::Scalar> {
        &self.from_orthonormal
    }

    pub fn to_orthonormal(&self, a: &Storage<P::Scalar>) -> Result<Storage<P::Scalar>> {
        self.to_orthonormal.map(self.orthonormal.scalar_processor(), a)
    }

    pub fn from_orthonormal(&self, a: &Storage<P::Scalar>) -> Result<Storage<P::Scalar>> {
        self.from_orthonormal
            .map(self.orthonormal.scalar_processor(), a)
    }

    pub fn product(
        &self,
        kind: ProductKind,
        a: &Storage<P::Scalar>,
        b: &Storage<P::Scalar>,
    ) -> Result<Storage<P::Scalar>> {
        let a = self.to_orthonormal(a)?;
        let b = self.to_orthonormal(b)?;
        let result = self.orthonormal.product(kind, &a, &b)?;
        self.from_orthonormal(&result)
    }

    pub fn scalar_part(&self, a: &Storage<P::Scalar>) -> P::Scalar {
        self.orthonormal.scalar_part(a)
    }

    named_products! {
        op => Op,
        gp => Gp,
        lcp => Lcp,
        rcp => Rcp,
        fdp => Fdp,
        hip => Hip,
        cp => Cp,
        acp => Acp,
    }

    /// Gram matrix `g_ij = f_i · f_j` of the frame vectors.
    pub fn frame_metric(&self) -> Result<Vec<Vec<P::Scalar>>> {
        let n = self.orthonormal.dimension();
        let frame = (0..n)
            .map(|i| self.to_orthonormal.image(i))
            .collect::<Result<Vec<_>>>()?;
        frame
            .iter()
            .map(|fi| {
                frame
                    .iter()
                    .map(|fj| self.orthonormal.sp(fi, fj))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::PolynomialProcessor;
    use crate::scalar::FloatProcessor;
    use approx::assert_relative_eq;

    fn e3() -> OrthonormalProcessor<FloatProcessor> {
        OrthonormalProcessor::new(Signature::euclidean(3).unwrap(), FloatProcessor::default())
    }

    fn blade(id: u64) -> Storage<f64> {
        Storage::basis_blade(id, 1.0)
    }

    #[test]
    fn test_euclidean_scenario() {
        let ga = e3();
        assert_eq!(
            ga.op(&blade(0b001), &blade(0b010)).unwrap().to_sparse_map(),
            blade(0b011).to_sparse_map()
        );
        assert_eq!(ga.sp(&blade(0b001), &blade(0b001)).unwrap(), 1.0);
        let sq = ga.gp(&blade(0b011), &blade(0b011)).unwrap();
        assert_eq!(sq.get(0), Some(&-1.0));
        assert_eq!(sq.term_count(), 1);
    }

    #[test]
    fn test_degenerate_axis_collapses() {
        let sig = Signature::from_squares(&[
            crate::signature::BasisSquare::Zero,
            crate::signature::BasisSquare::Positive,
        ])
        .unwrap();
        let ga = OrthonormalProcessor::new(sig, FloatProcessor::default());
        assert!(ga.gp(&blade(0b01), &blade(0b01)).unwrap().is_empty());
        assert!(ga.gp(&blade(0b11), &blade(0b01)).unwrap().is_empty());
        assert_eq!(ga.gp(&blade(0b10), &blade(0b10)).unwrap().get(0), Some(&1.0));
    }

    #[test]
    fn test_dimension_mismatch_is_reported() {
        let ga = e3();
        let err = ga.gp(&blade(0b1000), &blade(1)).unwrap_err();
        assert!(matches!(err, GaError::DimensionMismatch { expected: 3, found: 4 }));
    }

    #[test]
    fn test_strategies_agree() {
        let sig = Signature::new(2, 1, 1).unwrap();
        let a = Storage::sparse((0..16u64).map(|id| (id, id as f64 + 1.0)));
        let b = Storage::sparse((0..16u64).map(|id| (id, 0.5 - id as f64)));
        let pairwise = OrthonormalProcessor::new(sig, FloatProcessor::default())
            .with_strategy(ProductStrategy::Pairwise);
        let gbt = OrthonormalProcessor::new(sig, FloatProcessor::default())
            .with_strategy(ProductStrategy::Gbt);
        for kind in ProductKind::ALL {
            let x = pairwise.product(kind, &a, &b).unwrap().to_sparse_map();
            let y = gbt.product(kind, &a, &b).unwrap().to_sparse_map();
            assert_eq!(x, y, "{kind}");
        }
    }

    #[test]
    fn test_commutator_products() {
        let ga = e3();
        let e1 = blade(0b001);
        let e2 = blade(0b010);
        // e1 e2 = -e2 e1: all commutator, no anti-commutator
        assert_eq!(ga.cp(&e1, &e2).unwrap().get(0b011), Some(&1.0));
        assert!(ga.acp(&e1, &e2).unwrap().is_empty());
        assert_eq!(ga.acp(&e1, &e1).unwrap().get(0), Some(&1.0));
        assert!(ga.cp(&e1, &e1).unwrap().is_empty());
    }

    #[test]
    fn test_contractions() {
        let ga = e3();
        let e1 = blade(0b001);
        let e12 = blade(0b011);
        assert_eq!(ga.lcp(&e1, &e12).unwrap().get(0b010), Some(&1.0));
        assert!(ga.rcp(&e1, &e12).unwrap().is_empty());
        assert_eq!(ga.rcp(&e12, &e1).unwrap().get(0b010), Some(&-1.0));
        assert_eq!(ga.fdp(&e12, &e1).unwrap().get(0b010), Some(&-1.0));
        let s = Storage::scalar(2.0);
        assert_eq!(ga.fdp(&s, &e1).unwrap().get(0b001), Some(&2.0));
        assert!(ga.hip(&s, &e1).unwrap().is_empty());
    }

    #[test]
    fn test_unary_operations() {
        let ga = e3();
        let mv = Storage::sparse([(0, 1.0), (0b001, 2.0), (0b011, 3.0), (0b111, 4.0)]);
        let rev = ga.reverse(&mv).unwrap();
        assert_eq!(rev.get(0b011), Some(&-3.0));
        assert_eq!(rev.get(0b111), Some(&-4.0));
        let inv = ga.grade_involution(&mv).unwrap();
        assert_eq!(inv.get(0b001), Some(&-2.0));
        assert_eq!(inv.get(0b111), Some(&-4.0));
        let conj = ga.clifford_conjugate(&mv).unwrap();
        assert_eq!(conj.get(0b011), Some(&-3.0));
        assert_eq!(conj.get(0b111), Some(&4.0));
        let part = ga.grade_part(&mv, &[0, 2]).unwrap();
        assert_eq!(part.term_count(), 2);
        assert_eq!(ga.norm_squared(&mv).unwrap(), 1.0 + 4.0 + 9.0 + 16.0);
    }

    #[test]
    fn test_pseudo_scalar_inverse() {
        let ga = e3();
        let i = ga.pseudo_scalar();
        let i_inv = ga.pseudo_scalar_inverse().unwrap();
        let one = ga.gp(&i, &i_inv).unwrap();
        assert_eq!(one.to_sparse_map(), Storage::scalar(1.0).to_sparse_map());

        let degenerate =
            OrthonormalProcessor::new(Signature::new(2, 0, 1).unwrap(), FloatProcessor::default());
        assert!(matches!(degenerate.pseudo_scalar_inverse(), Err(GaError::Singular(_))));
    }

    #[test]
    fn test_dual_round_trip() {
        let ga =
            OrthonormalProcessor::new(Signature::new(3, 1, 0).unwrap(), FloatProcessor::default());
        let mv = Storage::sparse([(0b0001, 1.0), (0b0110, -2.0), (0b1011, 0.5)]);
        let back = ga.undual(&ga.dual(&mv).unwrap()).unwrap();
        assert!(ga.are_equal(&back, &mv).unwrap());
    }

    #[test]
    fn test_versor_inverse() {
        let ga = e3();
        // rotor-like versor 1 + e12
        let v = Storage::sparse([(0, 1.0), (0b011, 1.0)]);
        let inv = ga.versor_inverse(&v).unwrap();
        let one = ga.gp(&v, &inv).unwrap();
        assert_relative_eq!(*one.get(0).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(one.term_count(), 1);
        assert!(ga.versor_inverse(&Storage::zero()).is_err());
    }

    #[test]
    fn test_linear_operations() {
        let ga = e3();
        let a = Storage::vector(vec![1.0, 2.0, 3.0]);
        let b = Storage::vector(vec![1.0, 0.0, -3.0]);
        let sum = ga.add(&a, &b).unwrap();
        assert_eq!(sum.get(0b001), Some(&2.0));
        assert!(!sum.contains_id(0b100));
        let diff = ga.subtract(&a, &a).unwrap();
        assert!(diff.is_empty());
        assert_eq!(ga.scale(&a, &2.0).unwrap().get(0b100), Some(&6.0));
        assert_eq!(ga.negative(&a).unwrap().get(0b010), Some(&-2.0));
    }

    #[test]
    fn test_symbolic_products() {
        let p = PolynomialProcessor::new();
        let ga = OrthonormalProcessor::new(Signature::euclidean(2).unwrap(), p);
        let a = Storage::vector(vec![p.atom("a1"), p.atom("a2")]);
        let b = Storage::vector(vec![p.atom("b1"), p.atom("b2")]);
        let wedge = ga.op(&a, &b).unwrap();
        assert_eq!(wedge.get(0b11).unwrap().to_string(), "a1*b2 - a2*b1");
        assert_eq!(ga.sp(&a, &b).unwrap().to_string(), "a1*b1 + a2*b2");
    }

    #[test]
    fn test_change_of_basis_identity_frame() {
        let ortho = e3();
        let frame = vec![blade(0b001), blade(0b010), blade(0b100)];
        let cob = ChangeOfBasisProcessor::from_frame(e3(), frame).unwrap();
        let a = Storage::sparse([(0, 1.0), (0b001, 2.0), (0b110, -1.0)]);
        let b = Storage::sparse([(0b011, 0.5), (0b100, 3.0)]);
        for kind in ProductKind::ALL {
            let x = ortho.product(kind, &a, &b).unwrap().to_sparse_map();
            let y = cob.product(kind, &a, &b).unwrap().to_sparse_map();
            assert_eq!(x, y, "{kind}");
        }
    }

    #[test]
    fn test_change_of_basis_skewed_frame() {
        // f1 = e1, f2 = e1 + e2
        let frame = vec![
            Storage::vector(vec![1.0, 0.0]),
            Storage::vector(vec![1.0, 1.0]),
        ];
        let ga =
            OrthonormalProcessor::new(Signature::euclidean(2).unwrap(), FloatProcessor::default());
        let cob = ChangeOfBasisProcessor::from_frame(ga, frame).unwrap();
        let metric = cob.frame_metric().unwrap();
        assert_eq!(metric, vec![vec![1.0, 1.0], vec![1.0, 2.0]]);

        let f1 = blade(0b01);
        let f2 = blade(0b10);
        assert_eq!(cob.sp(&f2, &f2).unwrap(), 2.0);
        // f1 ^ f2 = e1 ^ e2, which is f1 ^ f2 in frame coordinates
        assert_eq!(cob.op(&f1, &f2).unwrap().to_sparse_map(), blade(0b11).to_sparse_map());
        // f1 f2 = 1 + e12
        let gp = cob.gp(&f1, &f2).unwrap();
        assert_eq!(gp.get(0), Some(&1.0));
        assert_eq!(gp.get(0b11), Some(&1.0));
    }

    #[test]
    fn test_change_of_basis_rejects_singular_frame() {
        let frame = vec![
            Storage::vector(vec![1.0, 1.0]),
            Storage::vector(vec![2.0, 2.0]),
        ];
        let ga =
            OrthonormalProcessor::new(Signature::euclidean(2).unwrap(), FloatProcessor::default());
        assert!(matches!(
            ChangeOfBasisProcessor::from_frame(ga, frame),
            Err(GaError::Singular(_))
        ));
    }
}

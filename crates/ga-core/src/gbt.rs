//! Guided binary tree (GBT) traversal.
//!
//! The basis blades of an `n`-dimensional algebra are the leaves of a depth-`n`
//! binary tree: the node at depth `d` decides bit `d - 1` of the ID, so the
//! root decides the highest basis vector and every subtree covers the
//! contiguous ID range `id ..= id | (2^d - 1)`. A traversal walks this tree
//! with an explicit frame stack and prunes every subtree that cannot
//! contribute, so the cost follows the visited nodes instead of `2^n`.
//!
//! [`traverse`] runs the state machine; a [`GbtWalker`] supplies the pruning
//! predicate, the per-child auxiliary state and the leaf action.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::basis::{grade, low_mask};
use crate::composer::Composer;
use crate::product::{ProductKind, blades_commute, reorder_sign};
use crate::scalar::ScalarProcessor;
use crate::signature::{BasisSquare, Signature};
use crate::storage::Storage;

#[derive(Clone, Debug, PartialEq)]
pub struct GbtFrame<A> {
    /// Remaining tree depth; 0 at a leaf.
    pub depth: u32,
    /// Bits decided so far.
    pub id: u64,
    pub aux: A,
}

impl<A> GbtFrame<A> {
    pub fn is_leaf(&self) -> bool {
        self.depth == 0
    }

    /// Bit decided by this node's children.
    pub fn child_bit(&self) -> u64 {
        debug_assert!(self.depth > 0);
        1u64 << (self.depth - 1)
    }

    /// ID of the child on the given branch.
    pub fn child_id(&self, branch_set: bool) -> u64 {
        if branch_set {
            self.id | self.child_bit()
        } else {
            self.id
        }
    }

    /// All leaf IDs below this node.
    pub fn subtree(&self) -> RangeInclusive<u64> {
        self.id..=(self.id | low_mask(self.depth))
    }
}

/// IDs below the child of `frame` whose branch bit is `branch_set`.
fn child_subtree<A>(frame: &GbtFrame<A>, branch_set: bool, base: u64) -> RangeInclusive<u64> {
    let id = if branch_set { base | frame.child_bit() } else { base };
    id..=(id | low_mask(frame.depth - 1))
}

/// Frame stack sized once up front; never grows during a traversal.
pub struct GbtStack<A> {
    frames: Vec<GbtFrame<A>>,
}

impl<A> GbtStack<A> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Clears the stack and seeds it with the root at full depth.
    pub fn push_root(&mut self, dimension: u32, aux: A) {
        self.frames.clear();
        self.frames.push(GbtFrame {
            depth: dimension,
            id: 0,
            aux,
        });
    }

    pub fn push_child(&mut self, parent_depth: u32, id: u64, aux: A) {
        debug_assert!(self.frames.len() < self.frames.capacity());
        self.frames.push(GbtFrame {
            depth: parent_depth - 1,
            id,
            aux,
        });
    }

    pub fn pop_node(&mut self) -> Option<GbtFrame<A>> {
        self.frames.pop()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.frames.capacity()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GbtStats {
    pub visited: usize,
    pub leaves: usize,
    pub pruned: usize,
}

/// Traversal policy for [`traverse`].
pub trait GbtWalker {
    type Aux;

    /// Children per node: 2 for one tree, 4 for a joint walk over two trees.
    /// Branch bit 0 sets the frame ID's bit; bit 1 is walker-defined.
    const BRANCHES: u8;

    /// Auxiliary state of the child behind `branch`, or `None` when that
    /// subtree cannot contain a nonzero contribution.
    fn descend(&mut self, frame: &GbtFrame<Self::Aux>, branch: u8) -> Option<Self::Aux>;

    fn leaf(&mut self, frame: GbtFrame<Self::Aux>);
}

/// Stack capacity for a walk over a depth-`dimension` tree.
pub fn stack_capacity(dimension: u32, branches: u8) -> usize {
    (branches as usize - 1) * dimension as usize + 1
}

/// Runs `walker` over the tree of an `dimension`-dimensional algebra.
pub fn traverse<W: GbtWalker>(dimension: u32, root: W::Aux, walker: &mut W) -> GbtStats {
    let mut stack = GbtStack::with_capacity(stack_capacity(dimension, W::BRANCHES));
    let mut stats = GbtStats::default();
    stack.push_root(dimension, root);

    while let Some(frame) = stack.pop_node() {
        stats.visited += 1;
        if frame.is_leaf() {
            stats.leaves += 1;
            walker.leaf(frame);
            continue;
        }
        // reversed so branch 0 is popped first
        for branch in (0..W::BRANCHES).rev() {
            match walker.descend(&frame, branch) {
                Some(aux) => {
                    stack.push_child(frame.depth, frame.child_id(branch & 1 != 0), aux)
                }
                None => stats.pruned += 1,
            }
        }
    }

    tracing::trace!(
        dimension,
        visited = stats.visited,
        leaves = stats.leaves,
        pruned = stats.pruned,
        "gbt traversal complete"
    );
    stats
}

fn has_terms<T>(index: &BTreeMap<u64, &T>, range: RangeInclusive<u64>) -> bool {
    index.range(range).next().is_some()
}

/// Bitmask over grades `0..=64`.
pub fn grade_mask(grades: &[u32]) -> u128 {
    grades
        .iter()
        .filter(|g| **g <= 64)
        .fold(0u128, |mask, g| mask | (1u128 << g))
}

fn mask_hits_range(mask: u128, lo: u32, hi: u32) -> bool {
    let width = hi - lo + 1;
    let range = if width >= 128 {
        u128::MAX
    } else {
        ((1u128 << width) - 1) << lo
    };
    mask & range != 0
}

/// Enumerates the terms of one storage whose grade is in a grade mask.
///
/// Prunes subtrees without stored IDs and subtrees whose reachable grades
/// (`grade(id) ..= grade(id) + depth`) miss the mask.
pub struct GbtTermTraversal<'a, T> {
    index: BTreeMap<u64, &'a T>,
    grade_mask: u128,
    found: Vec<(u64, &'a T)>,
}

impl<'a, T> GbtTermTraversal<'a, T> {
    pub fn new(storage: &'a Storage<T>, grades: &[u32]) -> Self {
        Self {
            index: storage.terms().collect(),
            grade_mask: grade_mask(grades),
            found: Vec::new(),
        }
    }

    /// Matching terms in ascending ID order.
    pub fn run(mut self, dimension: u32) -> (Vec<(u64, &'a T)>, GbtStats) {
        let stats = traverse(dimension, (), &mut self);
        (self.found, stats)
    }
}

impl<'a, T> GbtWalker for GbtTermTraversal<'a, T> {
    type Aux = ();
    const BRANCHES: u8 = 2;

    fn descend(&mut self, frame: &GbtFrame<()>, branch: u8) -> Option<()> {
        let range = child_subtree(frame, branch & 1 != 0, frame.id);
        let lo = grade(*range.start());
        if !mask_hits_range(self.grade_mask, lo, lo + frame.depth - 1) {
            return None;
        }
        has_terms(&self.index, range).then_some(())
    }

    fn leaf(&mut self, frame: GbtFrame<()>) {
        if self.grade_mask & (1u128 << grade(frame.id)) == 0 {
            return;
        }
        if let Some(value) = self.index.get(&frame.id) {
            self.found.push((frame.id, *value));
        }
    }
}

/// Per-node state of a joint product traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProductState {
    /// Bits of the second operand decided so far.
    pub id2: u64,
    /// Parity of reordering swaps accumulated so far.
    pub odd: bool,
    /// Product of shared-axis squares so far (±1).
    pub metric: i32,
    /// The pair can still satisfy a left / right contraction.
    pub left: bool,
    pub right: bool,
}

impl ProductState {
    fn root() -> Self {
        Self {
            id2: 0,
            odd: false,
            metric: 1,
            left: true,
            right: true,
        }
    }

    pub fn sign(&self) -> i32 {
        if self.odd { -self.metric } else { self.metric }
    }
}

/// Joint traversal over two storages emitting every blade pair with a
/// nonzero product sign.
///
/// Each node has four children, one per `(bit of id1, bit of id2)`. The
/// reorder parity and metric sign are built incrementally: descending from
/// the high bit, a bit added to the second operand swaps past every bit the
/// first operand already holds.
pub struct GbtProductTraversal<'a, T> {
    kind: ProductKind,
    signature: &'a Signature,
    first: BTreeMap<u64, &'a T>,
    second: BTreeMap<u64, &'a T>,
}

impl<'a, T> GbtProductTraversal<'a, T> {
    pub fn new(
        kind: ProductKind,
        signature: &'a Signature,
        first: &'a Storage<T>,
        second: &'a Storage<T>,
    ) -> Self {
        Self {
            kind,
            signature,
            first: first.terms().collect(),
            second: second.terms().collect(),
        }
    }

    /// Calls `sink(id1, value1, id2, value2, sign)` for every contributing pair.
    pub fn run<F>(self, sink: F) -> GbtStats
    where
        F: FnMut(u64, &'a T, u64, &'a T, i32),
    {
        let dimension = self.signature.dimension();
        let mut walker = ProductWalker {
            traversal: self,
            sink,
        };
        traverse(dimension, ProductState::root(), &mut walker)
    }
}

struct ProductWalker<'a, T, F> {
    traversal: GbtProductTraversal<'a, T>,
    sink: F,
}

impl<'a, T, F> GbtWalker for ProductWalker<'a, T, F>
where
    F: FnMut(u64, &'a T, u64, &'a T, i32),
{
    type Aux = ProductState;
    const BRANCHES: u8 = 4;

    fn descend(&mut self, frame: &GbtFrame<ProductState>, branch: u8) -> Option<ProductState> {
        let t = &self.traversal;
        let b1 = branch & 1 != 0;
        let b2 = branch & 2 != 0;
        let state = frame.aux;

        match t.kind {
            ProductKind::Op if b1 && b2 => return None,
            ProductKind::Sp if b1 != b2 => return None,
            ProductKind::Lcp if b1 && !b2 => return None,
            ProductKind::Rcp if b2 && !b1 => return None,
            _ => {}
        }
        let left = state.left && !(b1 && !b2);
        let right = state.right && !(b2 && !b1);
        if matches!(t.kind, ProductKind::Fdp | ProductKind::Hip) && !left && !right {
            return None;
        }

        let mut metric = state.metric;
        if b1 && b2 {
            match t.signature.square(frame.depth - 1) {
                BasisSquare::Zero => return None,
                BasisSquare::Negative => metric = -metric,
                BasisSquare::Positive => {}
            }
        }

        if !has_terms(&t.first, child_subtree(frame, b1, frame.id))
            || !has_terms(&t.second, child_subtree(frame, b2, state.id2))
        {
            return None;
        }

        let odd = state.odd ^ (b2 && frame.id.count_ones() & 1 == 1);
        Some(ProductState {
            id2: if b2 { state.id2 | frame.child_bit() } else { state.id2 },
            odd,
            metric,
            left,
            right,
        })
    }

    fn leaf(&mut self, frame: GbtFrame<ProductState>) {
        let t = &self.traversal;
        let id1 = frame.id;
        let id2 = frame.aux.id2;
        let keep = match t.kind {
            ProductKind::Hip => id1 != 0 && id2 != 0,
            ProductKind::Cp => !blades_commute(id1, id2),
            ProductKind::Acp => blades_commute(id1, id2),
            _ => true,
        };
        if !keep {
            return;
        }
        if let (Some(v1), Some(v2)) = (t.first.get(&id1), t.second.get(&id2)) {
            (self.sink)(id1, *v1, id2, *v2, frame.aux.sign());
        }
    }
}

/// Outer product of two `id → scalar` maps. Metric free.
pub(crate) fn wedge_terms<P: ScalarProcessor>(
    processor: &P,
    a: &BTreeMap<u64, P::Scalar>,
    b: &BTreeMap<u64, P::Scalar>,
) -> BTreeMap<u64, P::Scalar> {
    let mut composer = Composer::new(processor);
    for (id1, v1) in a {
        for (id2, v2) in b {
            if id1 & id2 == 0 {
                composer.add_signed_term(
                    id1 ^ id2,
                    reorder_sign(*id1, *id2),
                    &processor.times(v1, v2),
                );
            }
        }
    }
    composer.into_sparse_map()
}

/// Applies an outermorphism, given as per-basis-vector images, to one storage.
///
/// The aux state is the running outer product of the images chosen so far.
/// Descending from the high bit, the bit-1 child prepends the image of that
/// basis vector, so every leaf holds the image of its blade in canonical
/// order.
pub struct GbtOutermorphism<'a, 'p, P: ScalarProcessor> {
    processor: &'p P,
    images: &'a [BTreeMap<u64, P::Scalar>],
    input: BTreeMap<u64, &'a P::Scalar>,
    output: Composer<'p, P>,
}

impl<'a, 'p, P: ScalarProcessor> GbtOutermorphism<'a, 'p, P> {
    pub fn new(
        processor: &'p P,
        images: &'a [BTreeMap<u64, P::Scalar>],
        input: &'a Storage<P::Scalar>,
    ) -> Self {
        Self {
            processor,
            images,
            input: input.terms().collect(),
            output: Composer::new(processor),
        }
    }

    /// Accumulated image, not yet finalized.
    pub fn run(mut self) -> (Composer<'p, P>, GbtStats) {
        let dimension = self.images.len() as u32;
        let root = BTreeMap::from([(0u64, self.processor.one())]);
        let stats = traverse(dimension, root, &mut self);
        (self.output, stats)
    }
}

impl<'a, 'p, P: ScalarProcessor> GbtWalker for GbtOutermorphism<'a, 'p, P> {
    type Aux = BTreeMap<u64, P::Scalar>;
    const BRANCHES: u8 = 2;

    fn descend(&mut self, frame: &GbtFrame<Self::Aux>, branch: u8) -> Option<Self::Aux> {
        let set = branch & 1 != 0;
        if !has_terms(&self.input, child_subtree(frame, set, frame.id)) {
            return None;
        }
        if !set {
            return Some(frame.aux.clone());
        }
        let image = &self.images[(frame.depth - 1) as usize];
        if image.is_empty() {
            return None;
        }
        let running = wedge_terms(self.processor, image, &frame.aux);
        (!running.is_empty()).then_some(running)
    }

    fn leaf(&mut self, frame: GbtFrame<Self::Aux>) {
        if let Some(coefficient) = self.input.get(&frame.id) {
            self.output.add_scaled_map(&frame.aux, coefficient);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::product_sign;
    use crate::scalar::FloatProcessor;

    #[test]
    fn test_frame_subtree() {
        let frame = GbtFrame {
            depth: 2,
            id: 0b1000,
            aux: (),
        };
        assert_eq!(frame.subtree(), 0b1000..=0b1011);
        assert_eq!(frame.child_bit(), 0b10);
        assert_eq!(frame.child_id(true), 0b1010);
        assert!(!frame.is_leaf());
    }

    #[test]
    fn test_stack_capacity_bound() {
        assert_eq!(stack_capacity(5, 2), 6);
        assert_eq!(stack_capacity(5, 4), 16);
        let mut stack: GbtStack<()> = GbtStack::with_capacity(stack_capacity(3, 2));
        stack.push_root(3, ());
        assert_eq!(stack.len(), 1);
        assert!(stack.pop_node().is_some());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_term_traversal_filters_grades() {
        let s = Storage::sparse([(0, 1.0), (0b001, 2.0), (0b011, 3.0), (0b111, 4.0)]);
        let (found, _) = GbtTermTraversal::new(&s, &[1, 3]).run(3);
        let ids: Vec<u64> = found.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0b001, 0b111]);
    }

    #[test]
    fn test_term_traversal_prunes_empty_subtrees() {
        let s = Storage::sparse([(1u64 << 39, 1.0)]);
        let (found, stats) = GbtTermTraversal::new(&s, &[1]).run(40);
        assert_eq!(found.len(), 1);
        // a single root-to-leaf path: 41 nodes
        assert_eq!(stats.visited, 41);
        assert_eq!(stats.leaves, 1);
    }

    #[test]
    fn test_term_traversal_full_dimension() {
        let s = Storage::sparse([(u64::MAX, 1.0), (1, 2.0)]);
        let (found, _) = GbtTermTraversal::new(&s, &[64]).run(64);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, u64::MAX);
    }

    #[test]
    fn test_product_traversal_signs_match_engine() {
        let sig = Signature::new(2, 1, 1).unwrap();
        let all = Storage::sparse((0..16u64).map(|id| (id, 1.0)));
        for kind in ProductKind::ALL {
            let mut seen = BTreeMap::new();
            GbtProductTraversal::new(kind, &sig, &all, &all).run(|id1, _, id2, _, sign| {
                seen.insert((id1, id2), sign);
            });
            for id1 in 0..16u64 {
                for id2 in 0..16u64 {
                    let expected = product_sign(kind, &sig, id1, id2);
                    let got = seen.get(&(id1, id2)).copied().unwrap_or(0);
                    assert_eq!(got, expected, "{kind} {id1:#b} {id2:#b}");
                }
            }
        }
    }

    #[test]
    fn test_product_traversal_prunes_degenerate_axis() {
        let sig = Signature::new(0, 0, 3).unwrap();
        let v = Storage::sparse([(0b001, 1.0), (0b010, 1.0), (0b100, 1.0)]);
        let mut pairs = 0;
        GbtProductTraversal::new(ProductKind::Sp, &sig, &v, &v).run(|_, _, _, _, _| pairs += 1);
        assert_eq!(pairs, 0);
    }

    #[test]
    fn test_outermorphism_traversal_rotates_bivector() {
        let p = FloatProcessor::default();
        // e1 -> e2, e2 -> -e1, e3 -> e3
        let images = vec![
            BTreeMap::from([(0b010, 1.0)]),
            BTreeMap::from([(0b001, -1.0)]),
            BTreeMap::from([(0b100, 1.0)]),
        ];
        let input = Storage::sparse([(0b101, 2.0), (0, 3.0)]);
        let (composer, _) = GbtOutermorphism::new(&p, &images, &input).run();
        let out = composer.into_sparse_map();
        // e1^e3 -> e2^e3
        assert_eq!(out.get(&0b110), Some(&2.0));
        assert_eq!(out.get(&0), Some(&3.0));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_outermorphism_traversal_prunes_zero_image() {
        let p = FloatProcessor::default();
        let images = vec![BTreeMap::new(), BTreeMap::from([(0b10, 1.0)])];
        let input = Storage::sparse([(0b11, 1.0), (0b10, 4.0)]);
        let (composer, stats) = GbtOutermorphism::new(&p, &images, &input).run();
        let out = composer.into_sparse_map();
        assert_eq!(out, BTreeMap::from([(0b10, 4.0)]));
        assert!(stats.pruned > 0);
    }
}

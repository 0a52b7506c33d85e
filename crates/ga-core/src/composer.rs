use std::collections::BTreeMap;

use crate::basis::{binomial, grade, id_to_index, required_dimension};
use crate::constants::GRADED_DENSITY;
use crate::error::{GaError, Result};
use crate::scalar::ScalarProcessor;
use crate::storage::Storage;

/// Mutable accumulation buffer that finalizes into an immutable [`Storage`].
///
/// Owns its `id → scalar` buffer until consumed. Every finalizer drops
/// terms the processor reports as zero before choosing a representation.
pub struct Composer<'a, P: ScalarProcessor> {
    processor: &'a P,
    terms: BTreeMap<u64, P::Scalar>,
}

impl<'a, P: ScalarProcessor> Composer<'a, P> {
    pub fn new(processor: &'a P) -> Self {
        Self {
            processor,
            terms: BTreeMap::new(),
        }
    }

    /// Buffer seeded with a copy of `storage`'s terms.
    pub fn from_storage(processor: &'a P, storage: &Storage<P::Scalar>) -> Self {
        Self {
            processor,
            terms: storage.to_sparse_map(),
        }
    }

    pub fn from_terms(processor: &'a P, terms: BTreeMap<u64, P::Scalar>) -> Self {
        Self { processor, terms }
    }

    pub fn processor(&self) -> &'a P {
        self.processor
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn get(&self, id: u64) -> Option<&P::Scalar> {
        self.terms.get(&id)
    }

    pub fn set_term(&mut self, id: u64, value: P::Scalar) {
        self.terms.insert(id, value);
    }

    pub fn add_term(&mut self, id: u64, value: P::Scalar) {
        let p = self.processor;
        self.terms
            .entry(id)
            .and_modify(|current| *current = p.add(current, &value))
            .or_insert(value);
    }

    pub fn subtract_term(&mut self, id: u64, value: &P::Scalar) {
        let p = self.processor;
        self.terms
            .entry(id)
            .and_modify(|current| *current = p.subtract(current, value))
            .or_insert_with(|| p.negative(value));
    }

    /// Adds `sign * value` for a product sign; zero signs are skipped.
    pub fn add_signed_term(&mut self, id: u64, sign: i32, value: &P::Scalar) {
        match sign {
            0 => {}
            1 => self.add_term(id, value.clone()),
            -1 => self.subtract_term(id, value),
            other => {
                let scaled = self.processor.times_sign(value, other);
                self.add_term(id, scaled);
            }
        }
    }

    pub fn add_terms(&mut self, storage: &Storage<P::Scalar>) {
        for (id, value) in storage.terms() {
            self.add_term(id, value.clone());
        }
    }

    pub fn subtract_terms(&mut self, storage: &Storage<P::Scalar>) {
        for (id, value) in storage.terms() {
            self.subtract_term(id, value);
        }
    }

    /// Adds every term of `storage` multiplied by `factor`.
    pub fn add_scaled_terms(&mut self, storage: &Storage<P::Scalar>, factor: &P::Scalar) {
        for (id, value) in storage.terms() {
            let scaled = self.processor.times(value, factor);
            self.add_term(id, scaled);
        }
    }

    /// Adds `factor * terms` for an `id → scalar` map.
    pub fn add_scaled_map(&mut self, terms: &BTreeMap<u64, P::Scalar>, factor: &P::Scalar) {
        for (id, value) in terms {
            let scaled = self.processor.times(value, factor);
            self.add_term(*id, scaled);
        }
    }

    /// Replaces each coefficient with `f(id, coefficient)`.
    pub fn map_scalars(&mut self, f: impl Fn(u64, &P::Scalar) -> P::Scalar) {
        for (id, value) in self.terms.iter_mut() {
            *value = f(*id, value);
        }
    }

    pub fn remove_zero_terms(&mut self) {
        let p = self.processor;
        self.terms.retain(|_, value| !p.is_zero(value));
    }

    /// Scalar (grade-0) coefficient, zero when absent.
    pub fn into_scalar(mut self) -> P::Scalar {
        self.terms
            .remove(&0)
            .unwrap_or_else(|| self.processor.zero())
    }

    /// Terms as an owned `id → scalar` map, zeros removed.
    pub fn into_sparse_map(mut self) -> BTreeMap<u64, P::Scalar> {
        self.remove_zero_terms();
        self.terms
    }

    /// Most specific representation for the accumulated terms: scalar,
    /// single grade, dense multi-grade, or sparse.
    pub fn into_storage(mut self) -> Storage<P::Scalar> {
        self.remove_zero_terms();
        if self.terms.is_empty() {
            return Storage::zero();
        }
        if self.terms.len() == 1
            && let Some(value) = self.terms.remove(&0)
        {
            return Storage::scalar(value);
        }
        let counts = self.grade_counts();
        if counts.len() == 1 {
            let g = *counts.keys().next().unwrap_or(&0);
            return kvector_from(g, self.terms);
        }
        let n = self
            .terms
            .keys()
            .next_back()
            .map_or(0, |id| required_dimension(*id));
        let dense = counts
            .iter()
            .all(|(g, count)| *count as f64 >= GRADED_DENSITY * binomial(n, *g) as f64);
        if counts.len() >= 3 && dense {
            return graded_from(self.terms);
        }
        Storage::sparse(self.terms)
    }

    pub fn into_sparse_storage(mut self) -> Storage<P::Scalar> {
        self.remove_zero_terms();
        Storage::sparse(self.terms)
    }

    /// Single-grade storage; fails if a term of another grade survives.
    pub fn into_kvector_storage(mut self, grade_k: u32) -> Result<Storage<P::Scalar>> {
        self.remove_zero_terms();
        if let Some(id) = self.terms.keys().find(|id| grade(**id) != grade_k) {
            return Err(GaError::invalid(format!(
                "term of grade {} in a grade-{grade_k} k-vector",
                grade(*id)
            )));
        }
        Ok(kvector_from(grade_k, self.terms))
    }

    pub fn into_graded_storage(mut self) -> Storage<P::Scalar> {
        self.remove_zero_terms();
        graded_from(self.terms)
    }

    fn grade_counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for id in self.terms.keys() {
            *counts.entry(grade(*id)).or_insert(0) += 1;
        }
        counts
    }
}

fn kvector_from<T>(grade_k: u32, terms: BTreeMap<u64, T>) -> Storage<T> {
    Storage::kvector(
        grade_k,
        terms.into_iter().map(|(id, value)| (id_to_index(id), value)),
    )
}

fn graded_from<T>(terms: BTreeMap<u64, T>) -> Storage<T> {
    Storage::graded(
        terms
            .into_iter()
            .map(|(id, value)| (grade(id), id_to_index(id), value)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::FloatProcessor;
    use crate::storage::StorageKind;

    #[test]
    fn test_cancellation_removes_term() {
        let p = FloatProcessor::default();
        let mut c = Composer::new(&p);
        c.add_term(0b011, 2.0);
        c.subtract_term(0b011, &2.0);
        c.add_term(0b001, 1.0);
        let s = c.into_storage();
        assert_eq!(s.term_count(), 1);
        assert_eq!(s.get(0b001), Some(&1.0));
    }

    #[test]
    fn test_remove_zero_terms_leaves_no_zero() {
        let p = FloatProcessor::new(1e-9).unwrap();
        let mut c = Composer::new(&p);
        c.set_term(1, 1e-12);
        c.set_term(2, 0.5);
        c.set_term(4, -1e-10);
        c.remove_zero_terms();
        assert_eq!(c.term_count(), 1);
        let map = c.into_sparse_map();
        assert!(map.values().all(|v| !p.is_zero(v)));
    }

    #[test]
    fn test_add_scaled_terms() {
        let p = FloatProcessor::default();
        let v = Storage::vector(vec![1.0, 2.0]);
        let mut c = Composer::new(&p);
        c.add_scaled_terms(&v, &3.0);
        c.add_term(0b01, 1.0);
        let s = c.into_sparse_storage();
        assert_eq!(s.get(0b01), Some(&4.0));
        assert_eq!(s.get(0b10), Some(&6.0));
    }

    #[test]
    fn test_add_signed_term() {
        let p = FloatProcessor::default();
        let mut c = Composer::new(&p);
        c.add_signed_term(3, -1, &2.0);
        c.add_signed_term(3, 0, &5.0);
        c.add_signed_term(3, 1, &0.5);
        assert_eq!(c.get(3), Some(&-1.5));
    }

    #[test]
    fn test_compact_representation_choice() {
        let p = FloatProcessor::default();

        let c = Composer::new(&p);
        assert!(c.into_storage().is_empty());

        let mut c = Composer::new(&p);
        c.add_term(0, 2.0);
        assert_eq!(c.into_storage().kind(), StorageKind::Scalar);

        let mut c = Composer::new(&p);
        c.add_term(0b011, 1.0);
        c.add_term(0b110, 1.0);
        assert_eq!(c.into_storage().kind(), StorageKind::KVector);

        // all 8 blades of a 3D algebra: dense in every grade
        let mut c = Composer::new(&p);
        for id in 0..8 {
            c.add_term(id, 1.0);
        }
        assert_eq!(c.into_storage().kind(), StorageKind::Graded);

        let mut c = Composer::new(&p);
        c.add_term(0, 1.0);
        c.add_term(1u64 << 20, 1.0);
        assert_eq!(c.into_storage().kind(), StorageKind::Sparse);
    }

    #[test]
    fn test_kvector_finalizer_rejects_mixed_grades() {
        let p = FloatProcessor::default();
        let mut c = Composer::new(&p);
        c.add_term(0b001, 1.0);
        c.add_term(0b011, 1.0);
        assert!(c.into_kvector_storage(1).is_err());

        let mut c = Composer::new(&p);
        c.add_term(0b001, 1.0);
        c.add_term(0b011, 0.0);
        let s = c.into_kvector_storage(1).unwrap();
        assert_eq!(s.single_grade(), Some(1));
    }

    #[test]
    fn test_map_scalars_and_into_scalar() {
        let p = FloatProcessor::default();
        let mut c = Composer::from_storage(&p, &Storage::sparse([(0, 2.0), (1, 3.0)]));
        c.map_scalars(|id, v| if id == 0 { v * 10.0 } else { *v });
        assert_eq!(c.into_scalar(), 20.0);
        assert_eq!(Composer::new(&p).into_scalar(), 0.0);
    }
}

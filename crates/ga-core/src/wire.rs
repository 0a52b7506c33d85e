//! JSON wire format for `f64` multivectors.
//!
//! ```json
//! {"version": "1", "signature": [1, 1, -1], "terms": [{"id": 3, "blade": "e1^e2", "value": 1.0}]}
//! ```
//! The signature is the list of basis vector squares. `blade` is written on
//! export and cross-checked against `id` on import when present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::basis::blade_name;
use crate::composer::Composer;
use crate::error::{GaError, Result};
use crate::scalar::FloatProcessor;
use crate::signature::Signature;
use crate::storage::Storage;
use crate::text::parse_blade;

pub const CURRENT_VERSION: &str = "1";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireMultivector {
    pub version: String,
    pub signature: Signature,
    #[serde(default)]
    pub terms: Vec<WireTerm>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireTerm {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blade: Option<String>,
    pub value: f64,
}

impl WireMultivector {
    pub fn from_storage(signature: &Signature, storage: &Storage<f64>) -> Result<Self> {
        storage.validate(signature.dimension())?;
        let terms = storage
            .terms()
            .map(|(id, value)| WireTerm {
                id,
                blade: Some(blade_name(id)),
                value: *value,
            })
            .collect();
        Ok(Self {
            version: CURRENT_VERSION.to_string(),
            signature: *signature,
            terms,
        })
    }

    /// Validates the wire data and rebuilds the storage.
    pub fn into_storage(self) -> Result<(Signature, Storage<f64>)> {
        if self.version != CURRENT_VERSION {
            return Err(GaError::invalid(format!(
                "unsupported wire version '{}', expected '{CURRENT_VERSION}'",
                self.version
            )));
        }
        let mut terms = BTreeMap::new();
        for term in self.terms {
            self.signature.validate_id(term.id)?;
            if let Some(name) = &term.blade
                && parse_blade(name)? != term.id
            {
                return Err(GaError::invalid(format!(
                    "blade '{name}' does not match id {}",
                    term.id
                )));
            }
            if terms.insert(term.id, term.value).is_some() {
                return Err(GaError::invalid(format!("duplicate term id {}", term.id)));
            }
        }
        // Only exact zeros are dropped; tiny coefficients survive the round trip.
        let processor = FloatProcessor::new(0.0)?;
        let storage = Composer::from_terms(&processor, terms).into_storage();
        Ok((self.signature, storage))
    }
}

pub fn export_json(signature: &Signature, storage: &Storage<f64>) -> Result<String> {
    let wire = WireMultivector::from_storage(signature, storage)?;
    Ok(serde_json::to_string_pretty(&wire)?)
}

pub fn import_json(json: &str) -> Result<(Signature, Storage<f64>)> {
    let wire: WireMultivector = serde_json::from_str(json)?;
    wire.into_storage()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_import() {
        let sig = Signature::new(2, 1, 0).unwrap();
        let mv = Storage::sparse([(0, 1.5), (0b011, -2.0), (0b100, 0.25)]);
        let json = export_json(&sig, &mv).unwrap();
        assert!(json.contains("\"e1^e2\""));
        assert!(json.contains("\"version\": \"1\""));
        let (sig2, mv2) = import_json(&json).unwrap();
        assert_eq!(sig2, sig);
        assert_eq!(mv2.to_sparse_map(), mv.to_sparse_map());
    }

    #[test]
    fn test_round_trip_keeps_tiny_coefficients() {
        let sig = Signature::euclidean(2).unwrap();
        let mv = Storage::sparse([(0b01, 1e-13), (0b10, 1.0)]);
        let (_, mv2) = import_json(&export_json(&sig, &mv).unwrap()).unwrap();
        assert_eq!(mv2.to_sparse_map(), mv.to_sparse_map());
    }

    #[test]
    fn test_signature_is_list_of_squares() {
        let json =
            r#"{"version": "1", "signature": [1, 0, -1], "terms": [{"id": 1, "value": 2.0}]}"#;
        let (sig, mv) = import_json(json).unwrap();
        assert_eq!(sig.dimension(), 3);
        assert!(sig.is_degenerate());
        assert_eq!(mv.get(1), Some(&2.0));
    }

    #[test]
    fn test_import_rejects_bad_data() {
        let wrong_version = r#"{"version": "0", "signature": [1], "terms": []}"#;
        assert!(import_json(wrong_version).is_err());

        let out_of_range =
            r#"{"version": "1", "signature": [1], "terms": [{"id": 2, "value": 1.0}]}"#;
        assert!(import_json(out_of_range).is_err());

        let mismatch = r#"{"version": "1", "signature": [1, 1],
            "terms": [{"id": 1, "blade": "e2", "value": 1.0}]}"#;
        assert!(import_json(mismatch).is_err());

        let duplicate = r#"{"version": "1", "signature": [1, 1],
            "terms": [{"id": 1, "value": 1.0}, {"id": 1, "value": 2.0}]}"#;
        assert!(import_json(duplicate).is_err());

        let bad_square = r#"{"version": "1", "signature": [2], "terms": []}"#;
        assert!(matches!(import_json(bad_square), Err(GaError::Serialization(_))));
    }
}

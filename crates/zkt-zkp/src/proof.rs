//! # Proofs, Calldata and Public Signals
//!
//! A [`Proof`] is the raw `(piA, piB, piC)` triple as a Groth16 prover emits
//! it. [`ProofCalldata`] is the form submitted to the ledger: identical
//! except that both inner pairs of `piB` are swapped. The swap is part of
//! the verifier's wire format (G2 coordinates are ordered `(c1, c0)` there)
//! and must be applied exactly once on the way in and undone on the way out.

use serde::{Deserialize, Serialize};
use zkt_core::{ContentDigest, FieldElement, Sha256Accumulator};

use crate::error::CodecError;
use crate::statement::StatementKind;

/// Raw Groth16-shaped proof.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proof {
    pub pi_a: [FieldElement; 2],
    pub pi_b: [[FieldElement; 2]; 2],
    pub pi_c: [FieldElement; 2],
}

impl Proof {
    /// Convert to ledger calldata, swapping each inner pair of `piB`.
    pub fn to_calldata(&self) -> ProofCalldata {
        let [b0, b1] = &self.pi_b;
        ProofCalldata {
            a: self.pi_a.clone(),
            b: [
                [b0[1].clone(), b0[0].clone()],
                [b1[1].clone(), b1[0].clone()],
            ],
            c: self.pi_c.clone(),
        }
    }

    /// Parse the JSON proof object written by `snarkjs groth16 fullprove`.
    ///
    /// snarkjs emits projective coordinates (`pi_a` and `pi_c` carry a
    /// trailing `"1"`, `pi_b` a trailing `["1", "0"]`); only the affine
    /// part is kept.
    pub fn from_snarkjs_json(json: &str) -> Result<Self, CodecError> {
        let raw: SnarkjsProof =
            serde_json::from_str(json).map_err(|e| CodecError::Artifact(e.to_string()))?;
        raw.try_into()
    }

    /// Render in the snarkjs JSON layout, for `snarkjs groth16 verify`.
    pub fn to_snarkjs_json(&self) -> Result<String, CodecError> {
        let dec = |fe: &FieldElement| fe.to_decimal();
        let raw = SnarkjsProof {
            pi_a: vec![dec(&self.pi_a[0]), dec(&self.pi_a[1]), "1".into()],
            pi_b: vec![
                vec![dec(&self.pi_b[0][0]), dec(&self.pi_b[0][1])],
                vec![dec(&self.pi_b[1][0]), dec(&self.pi_b[1][1])],
                vec!["1".into(), "0".into()],
            ],
            pi_c: vec![dec(&self.pi_c[0]), dec(&self.pi_c[1]), "1".into()],
            protocol: Some("groth16".into()),
            curve: Some("bn128".into()),
        };
        serde_json::to_string(&raw).map_err(|e| CodecError::Artifact(e.to_string()))
    }
}

/// Proof as submitted to the ledger entry points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofCalldata {
    pub a: [FieldElement; 2],
    pub b: [[FieldElement; 2]; 2],
    pub c: [FieldElement; 2],
}

impl ProofCalldata {
    /// Undo the `piB` swap applied by [`Proof::to_calldata`].
    pub fn to_proof(&self) -> Proof {
        let [b0, b1] = &self.b;
        Proof {
            pi_a: self.a.clone(),
            pi_b: [
                [b0[1].clone(), b0[0].clone()],
                [b1[1].clone(), b1[0].clone()],
            ],
            pi_c: self.c.clone(),
        }
    }
}

/// Ordered public signals of one statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicSignals(Vec<FieldElement>);

impl PublicSignals {
    pub fn new(signals: Vec<FieldElement>) -> Self {
        Self(signals)
    }

    pub fn as_slice(&self) -> &[FieldElement] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FieldElement> {
        self.0.get(index)
    }

    /// Parse the `public.json` array written by snarkjs.
    pub fn from_snarkjs_json(json: &str) -> Result<Self, CodecError> {
        let raw: Vec<String> =
            serde_json::from_str(json).map_err(|e| CodecError::Artifact(e.to_string()))?;
        let signals = raw
            .iter()
            .map(|s| FieldElement::from_decimal(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(signals))
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        serde_json::to_string(&self.0).map_err(|e| CodecError::Artifact(e.to_string()))
    }
}

/// Output of a successful `prove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenStatement {
    pub statement: StatementKind,
    pub proof: Proof,
    pub signals: PublicSignals,
}

impl ProvenStatement {
    pub fn calldata(&self) -> ProofCalldata {
        self.proof.to_calldata()
    }
}

/// Fingerprint of a `(statement, proof, signals)` submission.
///
/// Two submissions share a fingerprint exactly when they would authorize the
/// same state transition with the same proof object.
pub fn submission_digest(
    statement: StatementKind,
    proof: &Proof,
    signals: &PublicSignals,
) -> ContentDigest {
    let mut acc = Sha256Accumulator::with_domain("zkt.submission.v1");
    acc.field(statement.circuit_id().as_bytes());
    for fe in proof
        .pi_a
        .iter()
        .chain(proof.pi_b.iter().flatten())
        .chain(proof.pi_c.iter())
    {
        acc.field(&fe.to_bytes32());
    }
    acc.field(&(signals.len() as u64).to_be_bytes());
    for fe in signals.as_slice() {
        acc.field(&fe.to_bytes32());
    }
    acc.finalize()
}

// ---------------------------------------------------------------------------
// snarkjs JSON layout
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SnarkjsProof {
    pi_a: Vec<String>,
    pi_b: Vec<Vec<String>>,
    pi_c: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    curve: Option<String>,
}

fn affine_pair(coords: &[String], name: &str) -> Result<[FieldElement; 2], CodecError> {
    if coords.len() < 2 {
        return Err(CodecError::Artifact(format!(
            "{name} needs at least 2 coordinates, got {}",
            coords.len()
        )));
    }
    Ok([
        FieldElement::from_decimal(&coords[0])?,
        FieldElement::from_decimal(&coords[1])?,
    ])
}

impl TryFrom<SnarkjsProof> for Proof {
    type Error = CodecError;

    fn try_from(raw: SnarkjsProof) -> Result<Self, Self::Error> {
        if let Some(protocol) = raw.protocol.as_deref() {
            if protocol != "groth16" {
                return Err(CodecError::Artifact(format!(
                    "unsupported protocol {protocol}"
                )));
            }
        }
        if raw.pi_b.len() < 2 {
            return Err(CodecError::Artifact(format!(
                "pi_b needs at least 2 rows, got {}",
                raw.pi_b.len()
            )));
        }
        Ok(Proof {
            pi_a: affine_pair(&raw.pi_a, "pi_a")?,
            pi_b: [
                affine_pair(&raw.pi_b[0], "pi_b[0]")?,
                affine_pair(&raw.pi_b[1], "pi_b[1]")?,
            ],
            pi_c: affine_pair(&raw.pi_c, "pi_c")?,
        })
    }
}

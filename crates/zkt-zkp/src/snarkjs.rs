//! # snarkjs Adapter
//!
//! Drives the external Groth16 toolchain through its CLI:
//!
//! ```text
//! snarkjs groth16 fullprove input.json <circuit>.wasm <circuit>.zkey proof.json public.json
//! snarkjs groth16 verify verification_key.json public.json proof.json
//! ```
//!
//! Circuits must declare their public signals in the layout documented in
//! [`crate::statement`].
//!
//! ## Security Invariant
//!
//! `input.json` contains the witness, including a transfer sender's private
//! key. It is written into a private temporary directory that is removed
//! when proving returns, whether or not proving succeeded. Raising the
//! [`CancelFlag`] kills `fullprove` and returns at once, so an abandoned
//! proof removes the directory too.

use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

use tempfile::TempDir;

use crate::cancel::CancelFlag;
use crate::error::{ProofError, VerifyError};
use crate::proof::{Proof, ProvenStatement, PublicSignals};
use crate::statement::{StatementInputs, StatementKind};
use crate::traits::{ProofSystem, StatementKeys};

/// Compiled circuit and proving key for one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitArtifacts {
    pub statement: StatementKind,
    pub wasm: PathBuf,
    pub zkey: PathBuf,
}

/// Path to a `verification_key.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKeyFile {
    pub statement: StatementKind,
    pub path: PathBuf,
}

/// Conventional artifact layout under `dir`:
/// `<circuit>.wasm`, `<circuit>_final.zkey`, `<circuit>_verification_key.json`.
pub fn artifacts_in(
    dir: &Path,
) -> (
    StatementKeys<CircuitArtifacts>,
    StatementKeys<VerificationKeyFile>,
) {
    let artifacts = |statement: StatementKind| {
        let id = statement.circuit_id();
        (
            CircuitArtifacts {
                statement,
                wasm: dir.join(format!("{id}.wasm")),
                zkey: dir.join(format!("{id}_final.zkey")),
            },
            VerificationKeyFile {
                statement,
                path: dir.join(format!("{id}_verification_key.json")),
            },
        )
    };
    let (rp, rv) = artifacts(StatementKind::Registration);
    let (mp, mv) = artifacts(StatementKind::Mint);
    let (tp, tv) = artifacts(StatementKind::Transfer);
    (
        StatementKeys {
            registration: rp,
            mint: mp,
            transfer: tp,
        },
        StatementKeys {
            registration: rv,
            mint: mv,
            transfer: tv,
        },
    )
}

/// How often a running `fullprove` is checked for exit or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Groth16 via the `snarkjs` command line.
#[derive(Debug, Clone)]
pub struct SnarkjsProofSystem {
    binary: PathBuf,
    work_root: Option<PathBuf>,
}

impl Default for SnarkjsProofSystem {
    fn default() -> Self {
        Self::new("snarkjs")
    }
}

impl SnarkjsProofSystem {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            work_root: None,
        }
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(root.into());
        self
    }

    fn scratch_dir(&self) -> std::io::Result<TempDir> {
        match &self.work_root {
            Some(root) => tempfile::tempdir_in(root),
            None => tempfile::tempdir(),
        }
    }

    fn run(&self, args: &[&OsStr]) -> Result<std::process::Output, String> {
        Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| format!("failed to run {}: {e}", self.binary.display()))
    }

    /// Run to completion unless `cancel` is raised first, in which case the
    /// child is killed and reaped. Output goes to `stderr_path`, a file, so
    /// a chatty child never blocks on a full pipe.
    fn run_cancellable(
        &self,
        args: &[&OsStr],
        stderr_path: &Path,
        cancel: &CancelFlag,
    ) -> Result<ExitStatus, ProofError> {
        let stderr = File::create(stderr_path)
            .map_err(|e| ProofError::Backend(format!("creating {}: {e}", stderr_path.display())))?;
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(stderr)
            .spawn()
            .map_err(|e| {
                ProofError::Backend(format!("failed to run {}: {e}", self.binary.display()))
            })?;

        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {}
                Err(e) => {
                    child.kill().ok();
                    child.wait().ok();
                    return Err(ProofError::Backend(format!("waiting for fullprove: {e}")));
                }
            }
            if cancel.is_cancelled() {
                child.kill().ok();
                child.wait().ok();
                tracing::debug!(pid = child.id(), "fullprove killed on cancellation");
                return Err(ProofError::Cancelled);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

fn tail(bytes: &[u8]) -> String {
    let s = String::from_utf8_lossy(bytes);
    let trimmed = s.trim();
    let start = trimmed.len().saturating_sub(400);
    // Stay on a char boundary.
    let start = (start..=trimmed.len())
        .find(|i| trimmed.is_char_boundary(*i))
        .unwrap_or(trimmed.len());
    trimmed[start..].to_string()
}

impl ProofSystem for SnarkjsProofSystem {
    type ProvingKey = CircuitArtifacts;
    type VerifyingKey = VerificationKeyFile;

    fn prove(
        &self,
        pk: &Self::ProvingKey,
        inputs: StatementInputs,
    ) -> Result<ProvenStatement, ProofError> {
        self.prove_cancellable(pk, inputs, &CancelFlag::new())
    }

    fn prove_cancellable(
        &self,
        pk: &Self::ProvingKey,
        inputs: StatementInputs,
        cancel: &CancelFlag,
    ) -> Result<ProvenStatement, ProofError> {
        let statement = inputs.kind();
        if pk.statement != statement {
            return Err(ProofError::KeyMismatch(format!(
                "{} artifacts used for {statement}",
                pk.statement
            )));
        }
        inputs.check_constraints()?;
        if cancel.is_cancelled() {
            return Err(ProofError::Cancelled);
        }

        let dir = self
            .scratch_dir()
            .map_err(|e| ProofError::Backend(e.to_string()))?;
        let input_path = dir.path().join("input.json");
        let proof_path = dir.path().join("proof.json");
        let public_path = dir.path().join("public.json");
        let stderr_path = dir.path().join("fullprove.stderr");

        {
            let json = inputs.circuit_inputs().to_json()?;
            drop(inputs);
            std::fs::write(&input_path, json.as_bytes())
                .map_err(|e| ProofError::Backend(format!("writing input.json: {e}")))?;
        }

        let status = self.run_cancellable(
            &[
                OsStr::new("groth16"),
                OsStr::new("fullprove"),
                input_path.as_os_str(),
                pk.wasm.as_os_str(),
                pk.zkey.as_os_str(),
                proof_path.as_os_str(),
                public_path.as_os_str(),
            ],
            &stderr_path,
            cancel,
        )?;
        if !status.success() {
            let stderr = std::fs::read(&stderr_path).unwrap_or_default();
            return Err(ProofError::Backend(format!(
                "fullprove exited with {status}: {}",
                tail(&stderr)
            )));
        }

        let read = |p: &Path| {
            std::fs::read_to_string(p)
                .map_err(|e| ProofError::Backend(format!("reading {}: {e}", p.display())))
        };
        let proof = Proof::from_snarkjs_json(&read(&proof_path)?)?;
        let signals = PublicSignals::from_snarkjs_json(&read(&public_path)?)?;
        Ok(ProvenStatement {
            statement,
            proof,
            signals,
        })
    }

    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        signals: &PublicSignals,
        proof: &Proof,
    ) -> Result<bool, VerifyError> {
        let dir = self
            .scratch_dir()
            .map_err(|e| VerifyError::Backend(e.to_string()))?;
        let proof_path = dir.path().join("proof.json");
        let public_path = dir.path().join("public.json");

        let proof_json = proof
            .to_snarkjs_json()
            .map_err(|e| VerifyError::MalformedProof(e.to_string()))?;
        let public_json = signals
            .to_json()
            .map_err(|e| VerifyError::MalformedProof(e.to_string()))?;
        std::fs::write(&proof_path, proof_json)
            .and_then(|_| std::fs::write(&public_path, public_json))
            .map_err(|e| VerifyError::Backend(e.to_string()))?;

        let output = self
            .run(&[
                OsStr::new("groth16"),
                OsStr::new("verify"),
                vk.path.as_os_str(),
                public_path.as_os_str(),
                proof_path.as_os_str(),
            ])
            .map_err(VerifyError::Backend)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if output.status.success() && stdout.contains("OK") {
            return Ok(true);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stdout.contains("Invalid proof") || stderr.contains("Invalid proof") {
            return Ok(false);
        }
        Err(VerifyError::Backend(format!(
            "verify exited with {}: {}",
            output.status,
            tail(&output.stderr)
        )))
    }
}

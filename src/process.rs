//! Batch orchestration: discover, deduplicate, convert, record.
//!
//! One run walks the input tree once, in sorted order, and takes every file
//! through the same state machine:
//!
//! ```text
//! Discovered ─▶ Hashed ─┬─▶ SkippedDuplicate   (fingerprint already in ledger)
//!                       ├─▶ NoAuthor           (file sits directly in the input root)
//!                       ├─▶ SkippedCollision   (output name already taken)
//!                       └─▶ Converted ─▶ LedgerUpdated
//!            any step ──▶ Failed
//! ```
//!
//! ## Idempotency
//!
//! The ledger is loaded once, consulted by fingerprint, and updated in memory
//! as each conversion succeeds. Updating in memory makes a second identical
//! file later in the same run a duplicate too. The ledger is written back
//! exactly once at the end; a failed save is logged and the run still
//! succeeds (the next run will just redo the work).
//!
//! ## Failure isolation
//!
//! Per-file problems are counted and the batch moves on. Only a missing input
//! directory or an uncreatable output directory stops a run. Output files are
//! encoded fully in memory and written with `create_new`, so a failure never
//! leaves a partial JPEG and never overwrites an existing one.
//!
//! ## Dry run
//!
//! [`plan`] runs the same decisions without decoding or writing anything; the
//! `check` command prints its result.

use crate::attribution::resolve_author;
use crate::config::IngestConfig;
use crate::hash::{self, Fingerprint};
use crate::imaging::{BackendError, ImageBackend, RustBackend, normalize};
use crate::ledger::Ledger;
use crate::metadata::{self, EmbeddedMetadata};
use crate::naming;
use crate::scan::{self, ScanError, SourceImage};
use chrono::{Datelike, Local, NaiveDateTime};
use log::{debug, error, info, warn};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that stop a run before any file is processed.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Cannot create output directory {0}: {1}")]
    OutputDir(PathBuf, #[source] io::Error),
}

/// Per-file failures. Counted as errors; the batch continues.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("hashing failed: {0}")]
    Hash(#[source] io::Error),
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    #[error("{0}")]
    Decode(#[source] BackendError),
    #[error("{0}")]
    Encode(#[source] BackendError),
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
}

/// What should happen to one hashed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Duplicate,
    NoAuthor,
    Collision(PathBuf),
    Convert { author: String, output: PathBuf },
}

/// Final state of one file after a run.
#[derive(Debug)]
pub enum Outcome {
    Converted {
        output: PathBuf,
        /// Which metadata stage succeeded (see [`EmbeddedMetadata::label`]).
        metadata: &'static str,
    },
    SkippedDuplicate,
    NoAuthor,
    SkippedCollision(PathBuf),
    Failed(FileError),
}

#[derive(Debug)]
pub struct FileReport {
    pub source: SourceImage,
    pub outcome: Outcome,
}

/// Everything a run did, in processing order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
    /// False if the ledger could not be written back.
    pub ledger_saved: bool,
}

impl RunSummary {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Converted { .. }))
    }

    pub fn skipped_duplicate(&self) -> usize {
        self.count(|o| matches!(o, Outcome::SkippedDuplicate))
    }

    pub fn skipped_collision(&self) -> usize {
        self.count(|o| matches!(o, Outcome::SkippedCollision(_)))
    }

    pub fn no_author(&self) -> usize {
        self.count(|o| matches!(o, Outcome::NoAuthor))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    /// Duplicates plus collisions.
    pub fn skipped(&self) -> usize {
        self.skipped_duplicate() + self.skipped_collision()
    }

    /// Failures plus files without an author.
    pub fn errors(&self) -> usize {
        self.failed() + self.no_author()
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }
}

/// Run the batch with the production codec and the local wall clock.
pub fn ingest(config: &IngestConfig) -> Result<RunSummary, IngestError> {
    ingest_with_backend(&RustBackend::new(), config, &local_now)
}

/// Run the batch with an explicit backend and clock.
///
/// `clock` is read once per converted file; its value becomes the filename
/// timestamp and its year the copyright year.
pub fn ingest_with_backend(
    backend: &impl ImageBackend,
    config: &IngestConfig,
    clock: &dyn Fn() -> NaiveDateTime,
) -> Result<RunSummary, IngestError> {
    let sources = scan::discover(&config.input_dir)?;
    fs::create_dir_all(&config.output_dir)
        .map_err(|e| IngestError::OutputDir(config.output_dir.clone(), e))?;

    let mut ledger = Ledger::load(&config.ledger_path);
    info!(
        "Found {} image(s) in {} ({} already in ledger)",
        sources.len(),
        config.input_dir.display(),
        ledger.len()
    );

    let mut reports = Vec::with_capacity(sources.len());
    for source in sources {
        let outcome = ingest_one(backend, config, &mut ledger, &source, clock);
        log_outcome(&source, &outcome);
        reports.push(FileReport { source, outcome });
    }

    let ledger_saved = match ledger.save(&config.ledger_path) {
        Ok(()) => true,
        Err(e) => {
            error!(
                "Failed to save ledger {}: {}",
                config.ledger_path.display(),
                e
            );
            false
        }
    };

    Ok(RunSummary {
        reports,
        ledger_saved,
    })
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn ingest_one(
    backend: &impl ImageBackend,
    config: &IngestConfig,
    ledger: &mut Ledger,
    source: &SourceImage,
    clock: &dyn Fn() -> NaiveDateTime,
) -> Outcome {
    let fingerprint = match hash::hash_file(&source.path) {
        Ok(f) => f,
        Err(e) => return Outcome::Failed(FileError::Hash(e)),
    };
    let timestamp = clock();

    match decide(ledger, config, source, &fingerprint, &timestamp) {
        Decision::Duplicate => Outcome::SkippedDuplicate,
        Decision::NoAuthor => Outcome::NoAuthor,
        Decision::Collision(output) => Outcome::SkippedCollision(output),
        Decision::Convert { author, output } => {
            match convert(backend, config, source, &author, &output, timestamp.year()) {
                Ok(meta) => {
                    ledger.insert(source.relative.clone(), &fingerprint);
                    Outcome::Converted {
                        output,
                        metadata: meta.label(),
                    }
                }
                Err(e) => Outcome::Failed(e),
            }
        }
    }
}

/// Decide what to do with one hashed file. Pure apart from the collision
/// existence check.
pub fn decide(
    ledger: &Ledger,
    config: &IngestConfig,
    source: &SourceImage,
    fingerprint: &Fingerprint,
    timestamp: &NaiveDateTime,
) -> Decision {
    if ledger.contains(fingerprint) {
        return Decision::Duplicate;
    }
    let Some(author) = resolve_author(&source.path, &config.input_dir) else {
        return Decision::NoAuthor;
    };
    let name = naming::synthesize(&author, &source.stem(), fingerprint, timestamp);
    let output = config.output_dir.join(name);
    if output.exists() {
        return Decision::Collision(output);
    }
    Decision::Convert { author, output }
}

fn convert(
    backend: &impl ImageBackend,
    config: &IngestConfig,
    source: &SourceImage,
    author: &str,
    output: &Path,
    year: i32,
) -> Result<EmbeddedMetadata, FileError> {
    let bytes = fs::read(&source.path).map_err(FileError::Read)?;
    let decoded = backend
        .decode(&source.path, &bytes)
        .map_err(FileError::Decode)?;
    let meta = metadata::embed(decoded.exif.as_deref(), author, year);
    let rgb = normalize(decoded.image, config.jpeg.background);

    if matches!(meta, EmbeddedMetadata::Omitted) {
        warn!("Writing {} without EXIF metadata", source.relative);
    }

    let jpeg = backend
        .encode_jpeg(&rgb, config.jpeg.quality(), meta.bytes())
        .map_err(FileError::Encode)?;
    write_new(output, &jpeg).map_err(FileError::Write)?;
    Ok(meta)
}

/// Write `bytes` to a file that must not exist yet. A failed write removes
/// the partial file.
fn write_new(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(e);
    }
    Ok(())
}

fn log_outcome(source: &SourceImage, outcome: &Outcome) {
    match outcome {
        Outcome::Converted { output, metadata } => info!(
            "Converted {} -> {} (metadata: {})",
            source.relative,
            output.display(),
            metadata
        ),
        Outcome::SkippedDuplicate => debug!("Skipping already processed {}", source.relative),
        Outcome::NoAuthor => warn!(
            "No author folder for {}; place it inside an author subfolder",
            source.relative
        ),
        Outcome::SkippedCollision(output) => warn!(
            "Output {} already exists, skipping {}",
            output.display(),
            source.relative
        ),
        Outcome::Failed(e) => error!("Error processing {}: {}", source.relative, e),
    }
}

// ============================================================================
// Dry run
// ============================================================================

/// One file's predicted fate.
#[derive(Debug)]
pub struct PlanEntry {
    pub source: SourceImage,
    pub decision: Result<Decision, FileError>,
}

/// Predict a run without decoding or writing anything.
///
/// Conversions are assumed to succeed, so same-run duplicates are reported
/// the way a real run would report them.
pub fn plan(config: &IngestConfig) -> Result<Vec<PlanEntry>, IngestError> {
    plan_at(config, &local_now())
}

pub fn plan_at(
    config: &IngestConfig,
    timestamp: &NaiveDateTime,
) -> Result<Vec<PlanEntry>, IngestError> {
    let sources = scan::discover(&config.input_dir)?;
    let mut ledger = Ledger::load(&config.ledger_path);

    let entries = sources
        .into_iter()
        .map(|source| {
            let decision = hash::hash_file(&source.path)
                .map_err(FileError::Hash)
                .map(|fingerprint| {
                    let decision = decide(&ledger, config, &source, &fingerprint, timestamp);
                    if matches!(decision, Decision::Convert { .. }) {
                        ledger.insert(source.relative.clone(), &fingerprint);
                    }
                    decision
                });
            PlanEntry { source, decision }
        })
        .collect();
    Ok(entries)
}

//! Performance harness: rebuild timing plus random proof round trips

use crate::{CliError, Result, Session};
use chrono::{DateTime, Utc};
use rand::Rng;
use revtree_core::verify_proof;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

/// CSV header of the results file
pub const CSV_HEADER: &str = "Test,GenTime(ms),VerifyTime(ms),Passed";

/// Timing of one proof round trip
#[derive(Clone, Debug, PartialEq)]
pub struct PerfSample {
    /// 1-based test number
    pub test: usize,
    /// Record index that was proven
    pub index: usize,
    /// Whether a proof could be generated at all
    pub generated: bool,
    /// Proof generation time
    pub gen_ms: f64,
    /// Proof verification time
    pub verify_ms: f64,
    /// Whether the proof was generated and verified
    pub passed: bool,
}

/// Summary of a harness run
#[derive(Clone, Debug)]
pub struct PerfReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Number of records in the tree
    pub records: usize,
    /// Tree rebuild time
    pub build_ms: f64,
    /// Per-proof timings
    pub samples: Vec<PerfSample>,
    /// Proofs that could not be generated
    pub failed: usize,
}

impl PerfReport {
    /// Mean generation time over all tests
    pub fn avg_gen_ms(&self) -> f64 {
        self.average(|s| s.gen_ms)
    }

    /// Mean verification time over all tests
    pub fn avg_verify_ms(&self) -> f64 {
        self.average(|s| s.verify_ms)
    }

    fn average(&self, f: impl Fn(&PerfSample) -> f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(f).sum::<f64>() / self.samples.len() as f64
    }

    /// Write the per-test CSV
    pub fn write_csv<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{}", CSV_HEADER)?;
        for s in &self.samples {
            if s.generated {
                writeln!(
                    out,
                    "{},{},{},{}",
                    s.test,
                    s.gen_ms,
                    s.verify_ms,
                    if s.passed { "YES" } else { "NO" }
                )?;
            } else {
                writeln!(out, "{},0,0,NO", s.test)?;
            }
        }
        Ok(())
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Rebuild the tree, then time `tests` proofs for randomly chosen records
#[instrument(skip(session))]
pub fn run_performance_tests(session: &mut Session, tests: usize) -> Result<PerfReport> {
    if session.records().is_empty() {
        return Err(CliError::NoDataset);
    }
    let started_at = Utc::now();

    let start = Instant::now();
    let tree = session.build_tree()?;
    let build_ms = elapsed_ms(start);
    info!(records = tree.leaf_count(), build_ms, "rebuilt tree for performance run");

    let root = *tree.root_digest().ok_or(CliError::TreeNotBuilt)?;
    let hasher = session.hasher();
    let records = session.records();
    let mut rng = rand::thread_rng();
    let mut samples = Vec::with_capacity(tests);
    let mut failed = 0;

    for test in 1..=tests {
        let index = rng.gen_range(0..records.len());
        let leaf = records[index].leaf_digest(&hasher);

        let start = Instant::now();
        let proof = match tree.generate_proof(&leaf) {
            Ok(proof) => proof,
            Err(_) => {
                failed += 1;
                samples.push(PerfSample {
                    test,
                    index,
                    generated: false,
                    gen_ms: 0.0,
                    verify_ms: 0.0,
                    passed: false,
                });
                continue;
            }
        };
        let gen_ms = elapsed_ms(start);

        let start = Instant::now();
        let passed = verify_proof(&hasher, &leaf, &proof, &root);
        let verify_ms = elapsed_ms(start);

        samples.push(PerfSample {
            test,
            index,
            generated: true,
            gen_ms,
            verify_ms,
            passed,
        });
    }

    Ok(PerfReport {
        started_at,
        records: tree.leaf_count(),
        build_ms,
        samples,
        failed,
    })
}

/// Run the harness and write the CSV to `csv_file`
pub fn run_to_csv(session: &mut Session, tests: usize, csv_file: &Path) -> Result<PerfReport> {
    let report = run_performance_tests(session, tests)?;
    let mut out = BufWriter::new(File::create(csv_file)?);
    report.write_csv(&mut out)?;
    out.flush()?;
    info!("results saved to {}", csv_file.display());
    Ok(report)
}

//! Interactive numbered menu
//!
//! Reads one answer per line from `input` and writes prompts and results to
//! `output`. End of input behaves like choosing `0`.

use crate::{
    perf, root_store::RootComparison, session::TamperStatus, CliError, Result, Session,
};
use revtree_core::Side;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::debug;

const BANNER: &str = "\n==============================\n      MERKLE TREE SYSTEM      \n==============================";

const OPTIONS: &[&str] = &[
    "1. Load Dataset",
    "2. Build Merkle Tree",
    "3. Save Merkle Root",
    "4. Compare Merkle Roots",
    "5. Generate Merkle Proof",
    "6. Modify a Review",
    "7. Simulate Tampering",
    "8. Visualize Merkle Tree",
    "9. Run Performance Tests",
    "0. Exit",
];

/// The menu loop bound to a session and a pair of streams
pub struct Menu<'a, R, W> {
    session: &'a mut Session,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    /// Create a menu over the given streams
    pub fn new(session: &'a mut Session, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
        }
    }

    /// Run until the user exits or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.display()?;
            let Some(line) = self.read_line()? else {
                writeln!(self.output, "Exiting...")?;
                return Ok(());
            };

            let choice = match line.trim().parse::<u8>() {
                Ok(choice) => choice,
                Err(_) => {
                    writeln!(self.output, "Invalid input. Try again.")?;
                    continue;
                }
            };
            debug!(choice, "menu selection");

            let outcome = match choice {
                1 => self.load_dataset(),
                2 => self.build_tree(),
                3 => self.save_root(),
                4 => self.compare_root(),
                5 => self.generate_proof(),
                6 => self.modify_review(),
                7 => self.simulate_tampering(),
                8 => self.visualize_tree(),
                9 => self.run_performance_tests(),
                0 => {
                    writeln!(self.output, "Exiting...")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "Invalid option! Try again.")?;
                    Ok(())
                }
            };

            // Operation failures are reported and the loop goes on
            if let Err(e) = outcome {
                writeln!(self.output, "Error: {}", e)?;
            }
        }
    }

    fn display(&mut self) -> Result<()> {
        writeln!(self.output, "{}", BANNER)?;
        for option in OPTIONS {
            writeln!(self.output, "{}", option)?;
        }
        self.prompt("Choose an option: ")
    }

    fn prompt(&mut self, text: &str) -> Result<()> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }

    // Undecodable bytes become U+FFFD, so a garbled answer is rejected by
    // the caller's parsing instead of ending the session
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn ask(&mut self, text: &str) -> Result<Option<String>> {
        self.prompt(text)?;
        self.read_line()
    }

    fn load_dataset(&mut self) -> Result<()> {
        let Some(filename) = self.ask("Enter dataset filename (e.g., reviews_1M_clean.json): ")?
        else {
            return Ok(());
        };
        let filename = filename.trim();
        if filename.is_empty() {
            writeln!(self.output, "Invalid filename input.")?;
            return Ok(());
        }
        let dataset = self.session.load_dataset(Path::new(filename))?;
        writeln!(
            self.output,
            "Loaded {} reviews from {}",
            dataset.len(),
            filename
        )?;
        Ok(())
    }

    fn build_tree(&mut self) -> Result<()> {
        let tree = self.session.build_tree()?;
        writeln!(self.output, "Merkle Tree built successfully.")?;
        if let Some(root) = tree.root_hex() {
            writeln!(self.output, "Root hash: {}", root)?;
        }
        Ok(())
    }

    fn save_root(&mut self) -> Result<()> {
        self.session.save_root()?;
        writeln!(
            self.output,
            "Merkle Root saved to {}",
            self.session.config().root_file.display()
        )?;
        Ok(())
    }

    fn compare_root(&mut self) -> Result<()> {
        match self.session.compare_root()? {
            RootComparison::Match => writeln!(self.output, "Integrity Verified: Roots match.")?,
            RootComparison::Mismatch => {
                writeln!(self.output, "Data Integrity Violated: Roots do not match!")?
            }
        }
        Ok(())
    }

    fn generate_proof(&mut self) -> Result<()> {
        self.session.tree()?;
        let Some(selector) = self.ask("Enter Review ID to generate proof (or numeric index): ")?
        else {
            return Ok(());
        };
        let report = self.session.generate_proof(&selector)?;

        writeln!(self.output, "Leaf hash used for proof: {}", report.leaf)?;
        writeln!(
            self.output,
            "Verification result: {}",
            if report.verified {
                "NO TAMPERING DETECTED"
            } else {
                "TAMPERING DETECTED"
            }
        )?;
        for (i, step) in report.proof.iter().enumerate() {
            writeln!(
                self.output,
                "Step {} | SiblingHash = {} | isLeft = {}",
                i,
                step.sibling,
                step.side == Side::Left
            )?;
        }
        match report.dot_file {
            Some(path) => writeln!(self.output, "DOT file generated: {}", path.display())?,
            None => writeln!(self.output, "Cannot visualize proof.")?,
        }
        Ok(())
    }

    fn modify_review(&mut self) -> Result<()> {
        let len = self.session.records().len();
        if len == 0 {
            return Err(CliError::NoDataset);
        }
        let Some(answer) = self.ask(&format!(
            "Enter review index to modify (0 - {}): ",
            len - 1
        ))?
        else {
            return Ok(());
        };
        let index = match answer.trim().parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                writeln!(self.output, "Invalid index input.")?;
                return Ok(());
            }
        };
        let Some(record) = self.session.records().get(index) else {
            return Err(CliError::IndexOutOfRange { index, len });
        };
        let original = record.text.clone();
        writeln!(self.output, "Original review: {}", original)?;

        let Some(text) = self.ask("Enter new review text: ")? else {
            return Ok(());
        };
        self.session.modify_review(index, text)?;
        writeln!(self.output, "Review updated. Merkle tree rebuilt.")?;
        Ok(())
    }

    fn simulate_tampering(&mut self) -> Result<()> {
        let status = self.session.simulate_tampering()?;
        writeln!(
            self.output,
            "{}",
            match status {
                TamperStatus::Intact => "NO TAMPERING DETECTED",
                TamperStatus::Tampered => "TAMPERING DETECTED",
            }
        )?;
        Ok(())
    }

    fn visualize_tree(&mut self) -> Result<()> {
        self.session.tree()?;
        let Some(answer) = self.ask(
            "Enter how many levels to visualize (root = level 0). Enter 0 to only show root: ",
        )?
        else {
            return Ok(());
        };
        let levels = match answer.trim().parse::<i64>() {
            Ok(levels) => levels.max(0) as usize,
            Err(_) => {
                writeln!(self.output, "Invalid input.")?;
                return Ok(());
            }
        };
        let path = self.session.visualize_tree(levels)?;
        writeln!(self.output, "DOT file generated: {}", path.display())?;
        Ok(())
    }

    fn run_performance_tests(&mut self) -> Result<()> {
        let tests = self.session.config().perf_tests;
        let csv_file = self.session.config().perf_csv_file.clone();
        writeln!(
            self.output,
            "Running performance tests on Merkle tree with {} reviews...",
            self.session.records().len()
        )?;
        let report = perf::run_to_csv(self.session, tests, &csv_file)?;
        write_perf_report(&mut self.output, &report, &csv_file)?;
        Ok(())
    }
}

/// Print a harness report as a table plus summary
pub fn write_perf_report<W: Write>(
    out: &mut W,
    report: &perf::PerfReport,
    csv_file: &Path,
) -> std::io::Result<()> {
    writeln!(
        out,
        "Run started {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "Merkle tree built in {:.2} ms\n", report.build_ms)?;
    writeln!(out, "Performance Results:")?;
    writeln!(out, "-----------------------------")?;
    writeln!(out, "Test | Proof Gen (ms) | Verify (ms) | Passed")?;
    for s in &report.samples {
        writeln!(
            out,
            "{:>4} | {:>12.2} | {:>11.2} | {}",
            s.test,
            s.gen_ms,
            s.verify_ms,
            if s.passed { "YES" } else { "NO" }
        )?;
    }
    writeln!(out, "\nSummary:")?;
    writeln!(out, "-----------------------------")?;
    writeln!(out, "Number of tests: {}", report.samples.len())?;
    writeln!(out, "Failed proofs (should be 0): {}", report.failed)?;
    writeln!(out, "Average proof generation time: {:.4} ms", report.avg_gen_ms())?;
    writeln!(out, "Average proof verification time: {:.4} ms", report.avg_verify_ms())?;
    writeln!(out, "Results saved to {}", csv_file.display())
}

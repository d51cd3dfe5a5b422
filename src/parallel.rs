//! Parallel term-bank writing.
//!
//! Banks are independent once the term list is final, so they are handed out
//! to a bounded set of writer threads pulling jobs from a shared channel. A
//! bank that fails to write is logged and reported; the other banks still get
//! written.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{ConvertError, Result};
use crate::package::Bank;
use crate::yomitan::TermEntry;

/// Configuration for the bank writer pool
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Upper bound on concurrent writer threads
    pub max_writers: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { max_writers: 8 }
    }
}

impl ParallelConfig {
    /// Writers actually started for `banks` jobs.
    pub fn writers_for(&self, banks: usize) -> usize {
        self.max_writers.max(1).min(banks)
    }
}

/// Outcome of writing all term banks.
#[derive(Debug, Default)]
pub struct BankReport {
    /// Written files, ordered by bank number.
    pub written: Vec<(usize, PathBuf)>,
    /// Banks that could not be written, ordered by bank number.
    pub failed: Vec<(usize, ConvertError)>,
}

impl BankReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub fn term_bank_path(dir: &Path, number: usize) -> PathBuf {
    dir.join(format!("term_bank_{}.json", number))
}

/// Write every bank to `dir` as `term_bank_<n>.json`.
///
/// `on_done` runs on the calling thread once per finished bank, successful
/// or not.
pub fn write_term_banks(
    dir: &Path,
    banks: Vec<Bank<'_>>,
    config: &ParallelConfig,
    mut on_done: impl FnMut(usize),
) -> BankReport {
    let total = banks.len();
    let mut report = BankReport::default();
    if total == 0 {
        return report;
    }

    let num_writers = config.writers_for(total);
    info!(
        "writing {} term banks with {} writer threads",
        total, num_writers
    );

    let start_time = Instant::now();
    let (job_tx, job_rx): (Sender<Bank<'_>>, Receiver<Bank<'_>>) = channel();
    for bank in banks {
        // Receiver is alive until the scope below ends.
        let _ = job_tx.send(bank);
    }
    drop(job_tx);

    let (result_tx, result_rx) = channel::<(usize, Result<PathBuf>)>();
    let job_rx = Arc::new(Mutex::new(job_rx));
    let completed = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..num_writers {
            let rx = Arc::clone(&job_rx);
            let tx = result_tx.clone();
            let completed = &completed;
            scope.spawn(move || bank_worker(dir, rx, tx, completed, total));
        }

        // Drop extra sender so the result channel closes when workers finish
        drop(result_tx);

        for (number, result) in result_rx {
            match result {
                Ok(path) => report.written.push((number, path)),
                Err(err) => {
                    warn!("term bank {} failed: {}", number, err);
                    report.failed.push((number, err));
                }
            }
            on_done(number);
        }
    });

    report.written.sort_by_key(|(number, _)| *number);
    report.failed.sort_by_key(|(number, _)| *number);

    info!(
        "completed writing {} of {} term banks in {:.2}s",
        report.written.len(),
        total,
        start_time.elapsed().as_secs_f64()
    );
    report
}

fn bank_worker(
    dir: &Path,
    rx: Arc<Mutex<Receiver<Bank<'_>>>>,
    tx: Sender<(usize, Result<PathBuf>)>,
    completed: &AtomicUsize,
    total: usize,
) {
    loop {
        // Try to get next bank from shared receiver
        let job = {
            let lock = rx.lock().ok();
            lock.and_then(|guard| guard.recv().ok())
        };

        let Some(bank) = job else {
            break;
        };

        let file_start = Instant::now();
        let result = write_bank(dir, bank.number, bank.terms);
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            "finished term_bank_{}.json ({}/{}) - {:.1}% - {:.2}s",
            bank.number,
            done,
            total,
            done as f64 / total as f64 * 100.0,
            file_start.elapsed().as_secs_f64()
        );

        if tx.send((bank.number, result)).is_err() {
            break;
        }
    }
}

fn write_bank(dir: &Path, number: usize, terms: &[TermEntry]) -> Result<PathBuf> {
    let path = term_bank_path(dir, number);
    let file = File::create(&path).map_err(ConvertError::io("create", &path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, terms).map_err(|source| ConvertError::Json {
        what: format!("term bank {}", number),
        source,
    })?;
    writer.flush().map_err(ConvertError::io("write", &path))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::banks;
    use crate::render::{Element, Style};
    use std::fs;

    fn terms(count: usize) -> Vec<TermEntry> {
        (1..=count)
            .map(|i| {
                TermEntry::new(
                    format!("ord{}", i),
                    "noun".to_string(),
                    Element::div(vec![Element::line(format!("→ word {}", i), Style::NONE)]),
                    i as u64,
                )
            })
            .collect()
    }

    fn read_bank(path: &Path) -> Vec<serde_json::Value> {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn writer_count_is_bounded() {
        let config = ParallelConfig::default();
        assert_eq!(config.writers_for(3), 3);
        assert_eq!(config.writers_for(20), 8);
        assert_eq!(ParallelConfig { max_writers: 0 }.writers_for(5), 1);
    }

    #[test]
    fn writes_every_bank() {
        let dir = tempfile::tempdir().unwrap();
        let terms = terms(25);
        let mut done = Vec::new();

        let report = write_term_banks(
            dir.path(),
            banks(&terms, 10),
            &ParallelConfig { max_writers: 2 },
            |n| done.push(n),
        );

        assert!(report.is_complete());
        let numbers: Vec<usize> = report.written.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        done.sort_unstable();
        assert_eq!(done, vec![1, 2, 3]);

        let sizes: Vec<usize> = report.written.iter().map(|(_, p)| read_bank(p).len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(read_bank(&term_bank_path(dir.path(), 3))[4][0], "ord25");
    }

    #[test]
    fn bank_files_are_compact() {
        let dir = tempfile::tempdir().unwrap();
        let terms = terms(2);
        write_term_banks(dir.path(), banks(&terms, 10), &ParallelConfig::default(), |_| {});
        let raw = fs::read_to_string(term_bank_path(dir.path(), 1)).unwrap();
        assert!(!raw.contains('\n'));
        assert!(raw.starts_with("[[\"ord1\",\"\",\"noun\""));
    }

    #[test]
    fn failures_are_reported_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of bank 2 makes its file creation fail
        fs::create_dir(term_bank_path(dir.path(), 2)).unwrap();
        let terms = terms(30);

        let report = write_term_banks(
            dir.path(),
            banks(&terms, 10),
            &ParallelConfig::default(),
            |_| {},
        );

        assert_eq!(report.written.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, 2);
        assert!(matches!(report.failed[0].1, ConvertError::Io { action: "create", .. }));
    }

    #[test]
    fn no_banks_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = write_term_banks(dir.path(), Vec::new(), &ParallelConfig::default(), |_| {});
        assert!(report.written.is_empty());
        assert!(report.is_complete());
    }
}

//! Dictionary file layout and archive packaging.
//!
//! A dictionary is a flat zip of `index.json`, `tag_bank_1.json` and
//! `term_bank_<n>.json` files. Files are written to a staging directory
//! first and zipped from there.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ConvertError, Result};
use crate::yomitan::{DictionaryIndex, TagRow, TermEntry};

pub const DEFAULT_BANK_SIZE: usize = 10_000;

pub const TAG_BANK_FILE: &str = "tag_bank_1.json";
pub const INDEX_FILE: &str = "index.json";

const COMPRESSION_LEVEL: i64 = 9;

/// A slice of the term list destined for one `term_bank_<n>.json`.
#[derive(Debug, Clone, Copy)]
pub struct Bank<'a> {
    /// 1-based bank number.
    pub number: usize,
    pub terms: &'a [TermEntry],
}

/// Split `terms` into consecutive banks of at most `bank_size` terms.
pub fn banks(terms: &[TermEntry], bank_size: usize) -> Vec<Bank<'_>> {
    terms
        .chunks(bank_size.max(1))
        .enumerate()
        .map(|(i, terms)| Bank {
            number: i + 1,
            terms,
        })
        .collect()
}

pub fn write_tag_bank(dir: &Path, rows: &[TagRow]) -> Result<PathBuf> {
    let path = dir.join(TAG_BANK_FILE);
    write_json(&path, rows, false, "tag bank")?;
    Ok(path)
}

pub fn write_index(dir: &Path, index: &DictionaryIndex) -> Result<PathBuf> {
    let path = dir.join(INDEX_FILE);
    write_json(&path, index, true, "index")?;
    Ok(path)
}

fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
    what: &str,
) -> Result<()> {
    let file = File::create(path).map_err(ConvertError::io("create", path))?;
    let mut writer = BufWriter::new(file);
    let written = if pretty {
        serde_json::to_writer_pretty(&mut writer, value)
    } else {
        serde_json::to_writer(&mut writer, value)
    };
    written.map_err(|source| ConvertError::Json {
        what: what.to_string(),
        source,
    })?;
    writer.flush().map_err(ConvertError::io("write", path))
}

/// Zip every `*.json` file directly inside `dir` into `zip_path`.
///
/// Entries are stored flat under their file names, in name order. Returns
/// the number of files archived.
pub fn create_archive(dir: &Path, zip_path: &Path) -> Result<usize> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(ConvertError::io("read", dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let file = File::create(zip_path).map_err(ConvertError::io("create", zip_path))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    for path in &files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        debug!("adding {} to archive", name);
        zip.start_file(name, options)?;
        let mut source = File::open(path).map_err(ConvertError::io("open", path))?;
        io::copy(&mut source, &mut zip).map_err(ConvertError::io("archive", path))?;
    }

    let mut writer = zip.finish()?;
    writer.flush().map_err(ConvertError::io("write", zip_path))?;

    info!("archived {} files into {}", files.len(), zip_path.display());
    Ok(files.len())
}

/// Directory the dictionary files are written to before zipping.
///
/// A temporary directory is removed on drop. A caller-chosen directory is
/// created if missing, cleared of dictionary files from earlier runs, and
/// left in place.
#[derive(Debug)]
pub enum Staging {
    Temporary(TempDir),
    Kept(PathBuf),
}

impl Staging {
    pub fn new(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(ConvertError::io("create", dir))?;
                let removed = clear_dictionary_files(dir)?;
                if removed > 0 {
                    info!("removed {} stale files from {}", removed, dir.display());
                }
                Ok(Staging::Kept(dir.to_path_buf()))
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("folkets-yomitan-")
                    .tempdir()
                    .map_err(ConvertError::io("create", &std::env::temp_dir()))?;
                Ok(Staging::Temporary(temp))
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Staging::Temporary(temp) => temp.path(),
            Staging::Kept(dir) => dir,
        }
    }
}

fn is_dictionary_file(name: &str) -> bool {
    if name == INDEX_FILE || name == TAG_BANK_FILE {
        return true;
    }
    name.strip_prefix("term_bank_")
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Remove files a previous conversion left in `dir`. Anything else is kept.
fn clear_dictionary_files(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir).map_err(ConvertError::io("read", dir))? {
        let path = entry.map_err(ConvertError::io("read", dir))?.path();
        let stale = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_dictionary_file);
        if stale {
            debug!("removing stale {}", path.display());
            fs::remove_file(&path).map_err(ConvertError::io("remove", &path))?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Element;
    use std::io::Read;

    fn terms(count: usize) -> Vec<TermEntry> {
        (1..=count)
            .map(|i| {
                TermEntry::new(
                    format!("ord{}", i),
                    "noun".to_string(),
                    Element::div(Vec::new()),
                    i as u64,
                )
            })
            .collect()
    }

    // ─────────────────────────────────────────────────────────────
    // Banks
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn banks_respect_size_and_numbering() {
        let terms = terms(25_000);
        let banks = banks(&terms, DEFAULT_BANK_SIZE);

        let shape: Vec<(usize, usize)> = banks.iter().map(|b| (b.number, b.terms.len())).collect();
        assert_eq!(shape, vec![(1, 10_000), (2, 10_000), (3, 5_000)]);

        let rejoined: Vec<u64> = banks
            .iter()
            .flat_map(|b| b.terms.iter().map(TermEntry::sequence))
            .collect();
        assert_eq!(rejoined, (1..=25_000).collect::<Vec<u64>>());
    }

    #[test]
    fn exact_multiple_has_no_empty_bank() {
        let terms = terms(20);
        assert_eq!(banks(&terms, 10).len(), 2);
        assert!(banks(&[], 10).is_empty());
    }

    #[test]
    fn zero_bank_size_is_treated_as_one() {
        let terms = terms(3);
        assert_eq!(banks(&terms, 0).len(), 3);
    }

    // ─────────────────────────────────────────────────────────────
    // Files and archive
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn index_is_pretty_and_tag_bank_is_compact() {
        let dir = tempfile::tempdir().unwrap();
        let index = DictionaryIndex::new("Test", "2024.01.31");
        let rows = vec![TagRow("noun".to_string(), "pos", 0, "Noun".to_string(), 0)];

        let index_path = write_index(dir.path(), &index).unwrap();
        let tag_path = write_tag_bank(dir.path(), &rows).unwrap();

        let index_raw = fs::read_to_string(index_path).unwrap();
        assert!(index_raw.contains("\n  \"title\": \"Test\""));
        let tag_raw = fs::read_to_string(tag_path).unwrap();
        assert_eq!(tag_raw, "[[\"noun\",\"pos\",0,\"Noun\",0]]");
    }

    #[test]
    fn archive_contains_only_json_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.json"), "{}").unwrap();
        fs::write(dir.path().join("term_bank_1.json"), "[]").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip me").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let out = tempfile::tempdir().unwrap();
        let zip_path = out.path().join("dict.zip");
        assert_eq!(create_archive(dir.path(), &zip_path).unwrap(), 2);

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["index.json", "term_bank_1.json"]);

        let mut contents = String::new();
        archive
            .by_name("term_bank_1.json")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "[]");
    }

    #[test]
    fn missing_staging_dir_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = create_archive(&dir.path().join("absent"), &dir.path().join("out.zip"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Io { action: "read", .. }));
    }

    #[test]
    fn temporary_staging_is_removed_on_drop() {
        let staging = Staging::new(None).unwrap();
        let path = staging.path().to_path_buf();
        assert!(path.is_dir());
        drop(staging);
        assert!(!path.exists());
    }

    #[test]
    fn kept_staging_is_created_and_left_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("stage");
        let staging = Staging::new(Some(target.as_path())).unwrap();
        assert_eq!(staging.path(), target);
        drop(staging);
        assert!(target.is_dir());
    }

    #[test]
    fn reused_staging_drops_files_from_earlier_runs() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "index.json",
            "tag_bank_1.json",
            "term_bank_1.json",
            "term_bank_2.json",
            "notes.txt",
            "term_bank_draft.json",
        ] {
            fs::write(dir.path().join(name), "[]").unwrap();
        }

        let staging = Staging::new(Some(dir.path())).unwrap();
        let out = tempfile::tempdir().unwrap();
        let zip_path = out.path().join("dict.zip");
        write_index(staging.path(), &DictionaryIndex::new("Test", "2024.01.31")).unwrap();
        create_archive(staging.path(), &zip_path).unwrap();

        let archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["index.json", "term_bank_draft.json"]);
        assert!(dir.path().join("notes.txt").is_file());
        assert!(!dir.path().join("term_bank_2.json").exists());
    }

    #[test]
    fn dictionary_file_names() {
        assert!(is_dictionary_file("term_bank_12.json"));
        assert!(is_dictionary_file(INDEX_FILE));
        assert!(is_dictionary_file(TAG_BANK_FILE));
        assert!(!is_dictionary_file("term_bank_.json"));
        assert!(!is_dictionary_file("term_bank_1.json.bak"));
        assert!(!is_dictionary_file("tag_bank_2.json"));
    }
}

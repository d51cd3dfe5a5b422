//! Converts the Folkets Lexikon Swedish–English XML export into a Yomitan
//! dictionary archive.
//!
//! The pipeline runs in stages:
//!
//! 1. [`xml`] reads `<word>` records into [`Entry`] values.
//! 2. [`resolve()`] groups them by headword, synthesizes entries for inflected
//!    forms that lack one and links each inflected form to its base form.
//! 3. [`yomitan::Converter`] classifies word classes with a [`PosTable`] and
//!    renders every node into a styled structured-content document.
//! 4. [`package`] splits the terms into banks, writes them in parallel with
//!    the tag bank and index, and zips the result.

pub mod error;
pub mod model;
pub mod package;
pub mod parallel;
pub mod phonetic;
pub mod pos;
pub mod render;
pub mod resolve;
pub mod text;
pub mod xml;
pub mod yomitan;

pub use error::{ConvertError, Result};
pub use model::Entry;
pub use pos::{PosTable, UnmappedClasses};
pub use resolve::{resolve, EntryGraph, NodeId, ResolveStats};
pub use yomitan::{Conversion, Converter, DictionaryIndex, TermEntry};

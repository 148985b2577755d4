//! Test-run artifact handling for qalog
//!
//! This crate decides what kind of artifact a user-supplied path names and,
//! for archives, unpacks them into an injected scratch location so the
//! suite directories inside can be analyzed like plain directories.

pub mod entry;
pub mod extract;
pub mod scratch;

pub use entry::{classify, expand_path, ArchiveSuffixes, Entry, EntryKind};
pub use extract::{
    archive_stem, list_suite_dirs, ExtractionError, ExtractionResult, Extractor,
    DEFAULT_EXTRACT_COMMAND,
};
pub use scratch::{ScratchDir, ScratchSpace};

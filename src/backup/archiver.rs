//! # World archiver.
//!
//! [`Archiver`] writes a directory tree into a single archive file. It is synchronous and
//! is driven from the blocking pool by [`BackupManager`](super::BackupManager).
//! [`ZipArchiver`] is the production implementation:
//!
//! ```text
//! world/level.dat          ──►  world/level.dat
//! world/region/r.0.0.mca   ──►  world/region/r.0.0.mca
//! (directories, symlinks)  ──►  skipped
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::error::BackupError;

/// Writes a directory tree into an archive.
pub trait Archiver: Send + Sync + 'static {
    /// Archives every regular file under `src` into a new file at `dest`, storing entries
    /// under `prefix/`. Returns the number of files written.
    fn archive(&self, src: &Path, prefix: &str, dest: &Path) -> Result<usize, BackupError>;
}

/// Deflate-compressed zip archives.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> BackupError + '_ {
    move |source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Entry name for `rel` under `prefix`, always `/`-separated.
fn entry_name(prefix: &str, rel: &Path) -> String {
    let mut name = String::from(prefix);
    for part in rel.components() {
        if !name.is_empty() {
            name.push('/');
        }
        name.push_str(&part.as_os_str().to_string_lossy());
    }
    name
}

impl Archiver for ZipArchiver {
    fn archive(&self, src: &Path, prefix: &str, dest: &Path) -> Result<usize, BackupError> {
        let file = File::create(dest).map_err(io_err(dest))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(true);

        let mut files = 0;
        for entry in WalkDir::new(src).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(src) else {
                continue;
            };

            zip.start_file(entry_name(prefix, rel), options)?;
            let mut input = File::open(entry.path()).map_err(io_err(entry.path()))?;
            io::copy(&mut input, &mut zip).map_err(io_err(entry.path()))?;
            files += 1;
        }

        let mut out = zip.finish()?;
        out.flush().map_err(io_err(dest))?;
        Ok(files)
    }
}

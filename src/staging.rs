//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Lu.
//! The Lu project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Staging Module
//!
//! Every file output is written under a private staging name and only becomes
//! visible at its final name when it is published:
//!
//! 1. [`LuStagingArea::stage`] asks the allocator for an unused staging path
//!    and creates it exclusively.
//! 2. The sink writes and flushes its bytes.
//! 3. [`LuStagedFile::commit`] syncs the file to disk, then renames it onto
//!    the final path.
//!
//! [`LuStagedFile::discard`] deletes the staged file instead, and a staged
//! file dropped before either call is deleted as well. The final path is
//! never created by anything other than the rename.
//!
//! Staging names come from a [`LuStagingAllocator`]. The default
//! [`LuRandomStaging`] draws nine random digits per candidate; tests can
//! inject a deterministic allocator.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{LuCompression, LuWriterConfig};
use crate::errors::{LuError, Result};

/// Candidates tried before giving up on finding an unused staging name.
pub const MAX_STAGING_ATTEMPTS: usize = 10_000;

/// Conflicts tolerated before the random generator is reseeded.
const RESEED_AFTER_CONFLICTS: usize = 10;

/// Times a freshly allocated name may lose a creation race.
const CREATE_RETRIES: usize = 3;

/// Source of staging paths.
pub trait LuStagingAllocator: Send {
    /// Returns a path inside `dir`, for an output headed to `target`, that
    /// does not exist yet.
    fn allocate(&mut self, dir: &Path, target: &Path) -> Result<PathBuf>;
}

/// Allocator producing `.<file name>.<9 digits>.tmp` names.
#[derive(Debug)]
pub struct LuRandomStaging {
    rng: SmallRng,
}

impl LuRandomStaging {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Deterministic sequence of names, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn candidate(&mut self, dir: &Path, target: &Path) -> PathBuf {
        let file_name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let digits: u32 = self.rng.gen_range(0..1_000_000_000);
        dir.join(format!(".{}.{:09}.tmp", file_name, digits))
    }
}

impl Default for LuRandomStaging {
    fn default() -> Self {
        Self::new()
    }
}

impl LuStagingAllocator for LuRandomStaging {
    fn allocate(&mut self, dir: &Path, target: &Path) -> Result<PathBuf> {
        let mut conflicts = 0;
        for _ in 0..MAX_STAGING_ATTEMPTS {
            let candidate = self.candidate(dir, target);
            if !candidate.exists() {
                return Ok(candidate);
            }
            conflicts += 1;
            if conflicts > RESEED_AFTER_CONFLICTS {
                self.rng = SmallRng::from_entropy();
            }
        }
        Err(LuError::Io(format!(
            "staging name allocation failed for {} (too many conflicts)",
            target.display()
        )))
    }
}

/// Directory that receives staged outputs for `target` when none is set.
pub fn default_staging_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Creates staged files for a writer's outputs.
pub struct LuStagingArea {
    dir: Option<PathBuf>,
    create_directories: bool,
    allocator: Box<dyn LuStagingAllocator>,
}

impl LuStagingArea {
    pub fn new(config: &LuWriterConfig) -> Self {
        Self {
            dir: config.staging_dir.clone(),
            create_directories: config.create_directories,
            allocator: Box::new(LuRandomStaging::new()),
        }
    }

    pub fn set_allocator(&mut self, allocator: Box<dyn LuStagingAllocator>) {
        self.allocator = allocator;
    }

    /// Creates a new, empty staged file for `target`.
    pub fn stage(&mut self, target: &Path) -> Result<(LuStagedFile, File)> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => default_staging_dir(target),
        };
        if self.create_directories {
            fs::create_dir_all(&dir)?;
            if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let mut attempt = 0;
        loop {
            let staged = self.allocator.allocate(&dir, target)?;
            match OpenOptions::new().write(true).create_new(true).open(&staged) {
                Ok(file) => {
                    return Ok((
                        LuStagedFile {
                            staged,
                            target: target.to_path_buf(),
                            pending: true,
                        },
                        file,
                    ))
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists && attempt < CREATE_RETRIES => {
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// A file written under its staging path, awaiting commit or discard.
#[derive(Debug)]
pub struct LuStagedFile {
    staged: PathBuf,
    target: PathBuf,
    pending: bool,
}

impl LuStagedFile {
    pub fn staged_path(&self) -> &Path {
        &self.staged
    }

    pub fn target_path(&self) -> &Path {
        &self.target
    }

    /// Publishes the staged file at its final path.
    ///
    /// The caller flushes its buffers first; this syncs `file` to disk, closes
    /// it and renames the staged path onto the target. On failure the staged
    /// file is removed when `self` drops.
    pub fn commit(mut self, file: File) -> Result<PathBuf> {
        file.sync_all()?;
        drop(file);
        fs::rename(&self.staged, &self.target)?;
        self.pending = false;
        Ok(self.target.clone())
    }

    /// Deletes the staged file without publishing it.
    pub fn discard(mut self) -> Result<()> {
        self.pending = false;
        match fs::remove_file(&self.staged) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for LuStagedFile {
    fn drop(&mut self) {
        if self.pending {
            let _ = fs::remove_file(&self.staged);
        }
    }
}

/// Byte stream of a text output, optionally compressed.
pub enum LuOutputStream {
    Plain(BufWriter<File>),
    #[cfg(feature = "compression")]
    Gzip(flate2::write::GzEncoder<BufWriter<File>>),
    #[cfg(feature = "compression")]
    Zstd(zstd::Encoder<'static, BufWriter<File>>),
}

impl LuOutputStream {
    pub fn new(file: File, compression: LuCompression) -> Result<Self> {
        let buffered = BufWriter::new(file);
        match compression {
            LuCompression::None => Ok(LuOutputStream::Plain(buffered)),
            #[cfg(feature = "compression")]
            LuCompression::Gzip => Ok(LuOutputStream::Gzip(flate2::write::GzEncoder::new(
                buffered,
                flate2::Compression::default(),
            ))),
            #[cfg(feature = "compression")]
            LuCompression::Zstd => Ok(LuOutputStream::Zstd(zstd::Encoder::new(buffered, 0)?)),
            #[cfg(not(feature = "compression"))]
            other => Err(LuError::validation(format!(
                "{:?} compression requires the `compression` feature",
                other
            ))),
        }
    }

    /// Flushes every layer and returns the underlying file.
    pub fn finish(self) -> io::Result<File> {
        let buffered = match self {
            LuOutputStream::Plain(buffered) => buffered,
            #[cfg(feature = "compression")]
            LuOutputStream::Gzip(encoder) => encoder.finish()?,
            #[cfg(feature = "compression")]
            LuOutputStream::Zstd(encoder) => encoder.finish()?,
        };
        buffered.into_inner().map_err(|err| err.into_error())
    }
}

impl Write for LuOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LuOutputStream::Plain(w) => w.write(buf),
            #[cfg(feature = "compression")]
            LuOutputStream::Gzip(w) => w.write(buf),
            #[cfg(feature = "compression")]
            LuOutputStream::Zstd(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LuOutputStream::Plain(w) => w.flush(),
            #[cfg(feature = "compression")]
            LuOutputStream::Gzip(w) => w.flush(),
            #[cfg(feature = "compression")]
            LuOutputStream::Zstd(w) => w.flush(),
        }
    }
}

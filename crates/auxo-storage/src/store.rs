//! Epoch-scoped artifact files
//!
//! Layout: `<root>/<epoch>/compounding/<name>-<suffix>.json`
//!
//! Two naming modes:
//! - versioned: suffix is the lowest unused integer, files are never replaced
//! - per round: suffix is the caller's round id, rewriting a round replaces it

use crate::error::{Result, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Sub-directory of an epoch holding compounding artifacts
pub const COMPOUNDING_DIR: &str = "compounding";

/// Indentation of written JSON
const INDENT: &[u8] = b"    ";

/// Append-only JSON artifact store for one epoch
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    epoch: String,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>, epoch: &str) -> Result<Self> {
        validate_name(epoch)?;
        Ok(Self {
            root: root.into(),
            epoch: epoch.to_string(),
        })
    }

    /// `<root>/<epoch>`, where the epoch's merkle trees live
    pub fn epoch_dir(&self) -> PathBuf {
        self.root.join(&self.epoch)
    }

    /// `<root>/<epoch>/compounding`
    pub fn scope_dir(&self) -> PathBuf {
        self.epoch_dir().join(COMPOUNDING_DIR)
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.scope_dir().join(filename)
    }

    fn ensure_scope(&self) -> Result<PathBuf> {
        let dir = self.scope_dir();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        Ok(dir)
    }

    /// Lowest `<name>-<i>.json` not present in the scope. Creates the scope
    /// directory if needed.
    pub fn next_filename(&self, name: &str) -> Result<String> {
        validate_name(name)?;
        let dir = self.ensure_scope()?;
        Ok(first_free(&dir, name, 0))
    }

    /// Write under the next free suffix and return the file name
    pub fn write_versioned<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<String> {
        validate_name(name)?;
        let bytes = to_pretty_json(value)?;
        let dir = self.ensure_scope()?;

        let mut index = 0;
        loop {
            let filename = first_free(&dir, name, index);
            let path = dir.join(&filename);
            // create_new refuses to clobber a file that appeared after the probe
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    write_or_discard(file, &path, &bytes)?;
                    tracing::info!("Wrote {}", path.display());
                    return Ok(filename);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    index = suffix_of(&filename, name).map_or(index + 1, |i| i + 1);
                }
                Err(e) => return Err(StorageError::io(&path, e)),
            }
        }
    }

    /// Write `<name>-<round>.json`, replacing any earlier write for the round
    pub fn write_round<T: Serialize + ?Sized>(
        &self,
        name: &str,
        round: u32,
        value: &T,
    ) -> Result<String> {
        validate_name(name)?;
        let bytes = to_pretty_json(value)?;
        let dir = self.ensure_scope()?;

        let filename = format!("{}-{}.json", name, round);
        let path = dir.join(&filename);
        if path.exists() {
            tracing::info!("Replacing {} for round {}", path.display(), round);
        }
        fs::write(&path, bytes).map_err(|e| StorageError::io(&path, e))?;
        tracing::info!("Wrote {}", path.display());
        Ok(filename)
    }

    /// Delete `<name>-<round>.json` if an earlier run wrote it. Returns the
    /// removed file name.
    pub fn remove_round(&self, name: &str, round: u32) -> Result<Option<String>> {
        validate_name(name)?;
        let filename = format!("{}-{}.json", name, round);
        let path = self.path_of(&filename);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!("Removed {}", path.display());
                Ok(Some(filename))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    /// Read an artifact from the scope by file name
    pub fn read<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        validate_name(filename)?;
        let path = self.path_of(filename);
        read_json(&path)
    }

    /// Whether an artifact exists in the scope
    pub fn exists(&self, filename: &str) -> bool {
        validate_name(filename).is_ok() && self.path_of(filename).is_file()
    }
}

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StorageError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(StorageError::io(path, e)),
    };
    Ok(serde_json::from_slice(&content)?)
}

/// Write `bytes` to a freshly created file. On failure the partial file is
/// removed so its suffix stays free.
fn write_or_discard<W: Write>(mut out: W, path: &Path, bytes: &[u8]) -> Result<()> {
    if let Err(e) = out.write_all(bytes).and_then(|()| out.flush()) {
        drop(out);
        if let Err(cleanup) = fs::remove_file(path) {
            tracing::warn!("Could not remove partial {}: {}", path.display(), cleanup);
        }
        return Err(StorageError::io(path, e));
    }
    Ok(())
}

/// Four-space indented JSON
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

fn first_free(dir: &Path, name: &str, start: u64) -> String {
    let mut i = start;
    loop {
        let filename = format!("{}-{}.json", name, i);
        if !dir.join(&filename).exists() {
            return filename;
        }
        i += 1;
    }
}

fn suffix_of(filename: &str, name: &str) -> Option<u64> {
    filename
        .strip_prefix(name)?
        .strip_prefix('-')?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0')
    {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

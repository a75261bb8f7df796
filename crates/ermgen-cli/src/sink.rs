use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ermgen_emit::{Artifact, ArtifactSink};

/// Writes artifacts into a directory.
///
/// Accepted artifacts are staged as synced temp files; they replace their
/// targets only once the whole run has been accepted, so a failed run
/// leaves the previous artifacts in place.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    staged: Vec<(PathBuf, PathBuf)>,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            staged: Vec::new(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn discard_staged(&mut self) {
        for (tmp_path, _) in self.staged.drain(..) {
            if let Err(err) = std::fs::remove_file(&tmp_path) {
                tracing::warn!(event = "staged_file_left", path = %tmp_path.display(), error = %err);
            }
        }
    }
}

impl ArtifactSink for DirectorySink {
    type Error = io::Error;

    fn accept(&mut self, artifact: &Artifact) -> io::Result<()> {
        let path = self.dir.join(&artifact.file_name);
        match stage_bytes(&path, artifact.contents.as_bytes()) {
            Ok(tmp_path) => {
                tracing::debug!(event = "artifact_staged", kind = ?artifact.kind, path = %tmp_path.display());
                self.staged.push((tmp_path, path));
                Ok(())
            }
            Err(err) => {
                self.discard_staged();
                Err(err)
            }
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        sync_parent(&self.dir)?;
        for (tmp_path, path) in std::mem::take(&mut self.staged) {
            std::fs::rename(&tmp_path, &path)?;
            tracing::info!(event = "artifact_written", path = %path.display());
            self.written.push(path);
        }
        sync_parent(&self.dir)
    }
}

/// Write `data` to a synced temp file next to `path` and return its path.
fn stage_bytes(path: &Path, data: &[u8]) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    Ok(tmp_path)
}

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "invalid path for atomic write")
    })?;
    let tmp_name = format!("{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

fn sync_parent(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    sync_dir(dir)
}

fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

//! Outputs written to temporary files beside their destination and moved
//! into place together once every one of them has been written.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::errors::Result;

#[derive(Debug, Default)]
pub struct StagedOutputs {
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl StagedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one output to a temporary file in the directory of `path`.
    ///
    /// Nothing appears at `path` until [`StagedOutputs::commit`].
    pub fn stage<F>(&mut self, path: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
    {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            write(&mut writer)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        debug!("Staged {} at {}", path.display(), tmp.path().display());
        self.staged.push((tmp, path.to_path_buf()));
        Ok(())
    }

    /// Move every staged file into place, in staging order.
    ///
    /// If a move fails, outputs this commit created are removed again and the
    /// remaining temporary files are dropped. A file replaced under `--force`
    /// before the failure is not restored.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut committed: Vec<(PathBuf, bool)> = Vec::with_capacity(self.staged.len());
        for (tmp, path) in self.staged {
            let existed = path.exists();
            if let Err(err) = tmp.persist(&path) {
                for (done, existed) in &committed {
                    if *existed {
                        continue;
                    }
                    if let Err(e) = std::fs::remove_file(done) {
                        warn!("Could not remove partial output {}: {}", done.display(), e);
                    }
                }
                return Err(err.error.into());
            }
            committed.push((path, existed));
        }
        Ok(committed.into_iter().map(|(path, _)| path).collect())
    }
}

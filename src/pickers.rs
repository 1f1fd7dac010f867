//! Where a batch gets its inputs and its destination.
//!
//! The converter only needs a list of files and an output directory. Both
//! come from small provider traits so the same batch driver serves the CLI
//! (paths from arguments), the dialog front end, and tests.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::pipeline::{self, ConvertResult};

/// Supplies the files to convert.
pub trait FileListProvider {
    fn files(&self) -> Result<Vec<PathBuf>>;
}

/// Supplies the directory converted files are written to.
pub trait OutputDirProvider {
    fn output_dir(&self) -> Result<PathBuf>;
}

/// A selection known up front.
#[derive(Debug, Clone, Default)]
pub struct FixedSelection {
    pub files: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

impl FixedSelection {
    pub fn new(files: Vec<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            files,
            output_dir: output_dir.into(),
        }
    }
}

impl FileListProvider for FixedSelection {
    fn files(&self) -> Result<Vec<PathBuf>> {
        Ok(self.files.clone())
    }
}

impl OutputDirProvider for FixedSelection {
    fn output_dir(&self) -> Result<PathBuf> {
        Ok(self.output_dir.clone())
    }
}

/// Native file and folder dialogs.
#[cfg(feature = "gui")]
#[derive(Debug, Clone, Default)]
pub struct DialogPicker;

#[cfg(feature = "gui")]
impl FileListProvider for DialogPicker {
    fn files(&self) -> Result<Vec<PathBuf>> {
        let files = rfd::FileDialog::new()
            .set_title("Select images to convert")
            .add_filter("Images", pipeline::SOURCE_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_files()
            .context("File dialog was cancelled")?;
        log::info!("Chosen file(s): {}", files.len());
        Ok(files)
    }
}

#[cfg(feature = "gui")]
impl OutputDirProvider for DialogPicker {
    fn output_dir(&self) -> Result<PathBuf> {
        let dir = rfd::FileDialog::new()
            .set_title("Select a folder for the converted files")
            .pick_folder()
            .context("Folder dialog was cancelled")?;
        log::info!("Chosen folder: {}", dir.display());
        Ok(dir)
    }
}

/// Ask the providers for a selection, then convert it.
///
/// Provider failures (including a cancelled dialog) abort before anything is
/// written. Conversion failures are per file and come back in the results.
pub fn run_batch(
    files: &dyn FileListProvider,
    output: &dyn OutputDirProvider,
    config: &Config,
) -> Result<Vec<ConvertResult>> {
    let inputs = files.files()?;
    let out_dir = output.output_dir()?;
    ensure_output_dir(&out_dir)?;

    if inputs.is_empty() {
        log::warn!("No files selected");
        return Ok(Vec::new());
    }
    Ok(pipeline::convert_all(&inputs, &out_dir, config))
}

/// Create the output directory if needed.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

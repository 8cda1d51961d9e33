use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::ExtendedColorType;

use crate::filter::frame::Frame;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MilkError, MilkResult};

/// Extensions recognised as frame images when scanning a directory.
pub const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Extension used for extracted frames.
pub const DEFAULT_FRAME_EXT: &str = "jpg";

/// Zero-padded frame file name, e.g. `frame000042.jpg`.
pub fn frame_file_name(index: u64, ext: &str) -> String {
    format!("frame{index:06}.{ext}")
}

/// `ffmpeg` output pattern matching [`frame_file_name`].
pub fn frame_file_pattern(ext: &str) -> String {
    format!("frame%06d.{ext}")
}

/// Lexicographically sorted frame files in one flat directory.
///
/// Position in the sorted list is the frame's [`FrameIndex`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSet {
    dir: PathBuf,
    names: Vec<String>,
}

impl FrameSet {
    /// List image files in `dir` (non-recursive) and sort them by name.
    pub fn scan(dir: impl Into<PathBuf>) -> MilkResult<Self> {
        let dir = dir.into();
        let entries = std::fs::read_dir(&dir).map_err(|e| {
            MilkError::directory(format!("failed to list frames in '{}': {e}", dir.display()))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                MilkError::directory(format!("failed to read entry in '{}': {e}", dir.display()))
            })?;
            let path = entry.path();
            if !path.is_file() || !has_frame_extension(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        Ok(Self::from_names(dir, names))
    }

    /// Build a set from known names; names are sorted.
    pub fn from_names(dir: impl Into<PathBuf>, mut names: Vec<String>) -> Self {
        names.sort();
        Self {
            dir: dir.into(),
            names,
        }
    }

    /// Directory the frames live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` when the directory holds no frames.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Sorted file names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// File name of frame `idx`.
    pub fn name(&self, idx: FrameIndex) -> Option<&str> {
        self.names.get(idx.0 as usize).map(String::as_str)
    }

    /// Full path of frame `idx`.
    pub fn path(&self, idx: FrameIndex) -> Option<PathBuf> {
        self.name(idx).map(|n| self.dir.join(n))
    }
}

fn has_frame_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Decode the image at `path` into an RGB frame.
///
/// Any failure (missing, empty, corrupt) is reported as [`MilkError::FrameDecode`].
pub fn read_frame(path: &Path, index: FrameIndex, name: &str) -> MilkResult<Frame> {
    let img = image::open(path)
        .map_err(|e| MilkError::frame_decode(format!("'{}': {e}", path.display())))?
        .into_rgb8();
    Frame::from_rgb_image(index, name, img)
}

/// Encode `frame` to `path`; the format follows the file extension.
pub fn write_frame(frame: &Frame, path: &Path) -> MilkResult<()> {
    let img = frame.to_rgb_image()?;
    image::save_buffer(
        path,
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgb8,
    )
    .map_err(|e| MilkError::filter(format!("failed to write '{}': {e}", path.display())))
}

/// Create `dir`, removing any previous contents when `clear` is set.
pub fn prepare_dir(dir: &Path, clear: bool) -> MilkResult<()> {
    if clear && dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| {
            MilkError::directory(format!("failed to clear '{}': {e}", dir.display()))
        })?;
    }
    std::fs::create_dir_all(dir)
        .map_err(|e| MilkError::directory(format!("failed to create '{}': {e}", dir.display())))
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> MilkResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/media/frames.rs"]
mod tests;

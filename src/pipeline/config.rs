use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;

use crate::filter::config::FilterConfig;
use crate::foundation::error::{MilkError, MilkResult};

static WORK_DIR_SEQ: AtomicU64 = AtomicU64::new(0);

/// Settings for a whole video run, loadable from JSON.
///
/// ```json
/// { "source": "clip.mp4", "target_fps": 12,
///   "filter": { "palette": 2, "effect": true, "recompress": 40, "workers": 8 } }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Source video.
    pub source: PathBuf,
    /// Output video; defaults to `<stem>_filtered<ext>` next to the source.
    pub output: Option<PathBuf>,
    /// Frame sampling rate; defaults to the source rate.
    pub target_fps: Option<u32>,
    /// Resize extracted frames to `[width, height]`.
    pub scale: Option<(u32, u32)>,
    /// Directory for intermediate frames; defaults to a per-process temp directory.
    pub work_dir: Option<PathBuf>,
    /// Keep intermediate frame directories after the run.
    pub keep_frames: bool,
    /// Overwrite an existing output video.
    pub overwrite: bool,
    /// Filter and worker settings.
    pub filter: FilterConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            output: None,
            target_fps: None,
            scale: None,
            work_dir: None,
            keep_frames: false,
            overwrite: true,
            filter: FilterConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Config for `source` with every other field defaulted.
    pub fn for_source(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file.
    pub fn from_path(path: &Path) -> MilkResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config '{}'", path.display()))?;
        Ok(cfg)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> MilkResult<()> {
        if self.source.as_os_str().is_empty() {
            return Err(MilkError::validation("source video path is required"));
        }
        if self.target_fps == Some(0) {
            return Err(MilkError::validation("target fps must be >= 1"));
        }
        if let Some((w, h)) = self.scale
            && (w == 0 || h == 0)
        {
            return Err(MilkError::validation("scale width/height must be non-zero"));
        }
        self.filter.validate()
    }

    /// Resolved output path.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.source, "_filtered"))
    }

    /// Resolved working directory.
    ///
    /// When unset, every call names a fresh `milktone-<pid>-<n>` directory under the system temp
    /// dir; the source name never appears in it.
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(|| {
            let n = WORK_DIR_SEQ.fetch_add(1, Ordering::Relaxed);
            std::env::temp_dir().join(format!("milktone-{}-{n}", std::process::id()))
        })
    }
}

/// `dir/<stem><suffix>.<ext>` for `input`.
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    input.with_file_name(name)
}

/// `dir/filtered_<name>` for a single image.
pub fn default_image_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image.png".to_string());
    input.with_file_name(format!("filtered_{name}"))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;

use crate::foundation::error::{CaptureError, CaptureResult};
use crate::session::model::{StillConfig, TurntableConfig};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Saved capture settings, loaded from JSON.
///
/// Every field is optional in the file; missing sections take the configurator defaults.
///
/// ```json
/// {
///   "output_dir": "renders",
///   "still": { "width": 4096, "height": 4096, "sample_count": 128 },
///   "turntable": { "total_frames": 72, "fps": { "num": 24, "den": 1 }, "format": "webm" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapturePreset {
    /// Directory artifacts are written to.
    pub output_dir: Option<PathBuf>,
    /// Still render request.
    pub still: StillConfig,
    /// Turntable request.
    pub turntable: TurntableConfig,
}

impl CapturePreset {
    /// Load and validate a preset file.
    pub fn from_path(path: impl AsRef<Path>) -> CaptureResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CaptureError::validation(format!("open preset JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse and validate a preset from a reader.
    pub fn from_reader(r: impl Read) -> CaptureResult<Self> {
        let preset: Self = serde_json::from_reader(r)
            .map_err(|e| CaptureError::validation(format!("parse preset JSON: {e}")))?;
        preset.validate()?;
        Ok(preset)
    }

    /// Validate both sections.
    pub fn validate(&self) -> CaptureResult<()> {
        self.still.validate()?;
        self.turntable.validate()
    }
}

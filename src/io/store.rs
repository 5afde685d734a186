//! Read/write saved model artifacts.
//!
//! An artifact is one JSON document holding everything needed to serve predictions:
//! - variant + feature order + coefficients + intercept
//! - the frozen category encodings
//! - a `schema_version` so the format can evolve without breaking `load_model`
//!
//! Writes go to a sibling temp file that is renamed over the target, so a reader never
//! sees a half-written artifact.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Variant;
use crate::encoding::Encodings;
use crate::error::{AppError, ErrorKind};
use crate::fit::TrainedModel;

/// Artifact format written by this version.
pub const SCHEMA_VERSION: u32 = 1;

const SUPPORTED_SCHEMA_VERSIONS: [u32; 1] = [1];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelArtifact {
    schema_version: u32,
    #[serde(default)]
    tool: String,
    variant: Variant,
    feature_order: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    encodings: Encodings,
}

/// Atomically write `model` to `path`, creating parent directories as needed.
pub fn save_model(path: &Path, model: &TrainedModel) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            io_error(format!("Failed to create model directory '{}': {e}", parent.display()))
        })?;
    }

    let artifact = ModelArtifact {
        schema_version: SCHEMA_VERSION,
        tool: "pricecast".to_string(),
        variant: model.variant(),
        feature_order: model.feature_order().to_vec(),
        coefficients: model.coefficients().to_vec(),
        intercept: model.intercept(),
        encodings: model.encodings().clone(),
    };

    replace_atomically(path, |writer| {
        serde_json::to_writer_pretty(writer, &artifact)
            .map_err(|e| io_error(format!("Failed to write model JSON: {e}")))
    })?;

    tracing::info!(variant = %model.variant(), path = %path.display(), "saved model");
    Ok(())
}

/// Load and validate a model artifact.
pub fn load_model(path: &Path) -> Result<TrainedModel, AppError> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::new(
                ErrorKind::NotFound,
                format!("Model file '{}' does not exist.", path.display()),
            )
        } else {
            io_error(format!("Failed to read model file '{}': {e}", path.display()))
        }
    })?;

    let model = parse_artifact(&text).map_err(|e| e.context(path.display()))?;
    tracing::info!(variant = %model.variant(), path = %path.display(), "loaded model");
    Ok(model)
}

/// Load an artifact and require it to be for `variant`.
pub fn load_model_for(path: &Path, variant: Variant) -> Result<TrainedModel, AppError> {
    let model = load_model(path)?;
    if model.variant() != variant {
        return Err(AppError::corrupt_artifact(format!(
            "{}: artifact is a {} model, expected {variant}.",
            path.display(),
            model.variant()
        )));
    }
    Ok(model)
}

fn parse_artifact(text: &str) -> Result<TrainedModel, AppError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| AppError::corrupt_artifact(format!("Invalid model JSON: {e}")))?;

    let version = value
        .get("schema_version")
        .ok_or_else(|| AppError::corrupt_artifact("Model artifact has no `schema_version`."))?
        .as_u64()
        .ok_or_else(|| AppError::corrupt_artifact("`schema_version` must be an integer."))?;
    if !SUPPORTED_SCHEMA_VERSIONS.iter().any(|&v| u64::from(v) == version) {
        return Err(AppError::corrupt_artifact(format!(
            "Unsupported schema_version {version} (supported: {SUPPORTED_SCHEMA_VERSIONS:?})."
        )));
    }

    let artifact: ModelArtifact = serde_json::from_value(value)
        .map_err(|e| AppError::corrupt_artifact(format!("Malformed model artifact: {e}")))?;

    TrainedModel::from_parts(
        artifact.variant,
        artifact.feature_order,
        artifact.coefficients,
        artifact.intercept,
        artifact.encodings,
    )
}

/// Write through `write` into a sibling temp file, then rename it over `path`.
///
/// The temp file is removed on every failure after it was created.
fn replace_atomically<F>(path: &Path, write: F) -> Result<(), AppError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), AppError>,
{
    let tmp = temp_path(path);
    let file = File::create(&tmp)
        .map_err(|e| io_error(format!("Failed to create model file '{}': {e}", tmp.display())))?;

    let result = write_and_sync(file, write).and_then(|()| {
        fs::rename(&tmp, path)
            .map_err(|e| io_error(format!("Failed to move model into '{}': {e}", path.display())))
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_and_sync<F>(file: File, write: F) -> Result<(), AppError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), AppError>,
{
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer
        .flush()
        .map_err(|e| io_error(format!("Failed to flush model file: {e}")))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| io_error(format!("Failed to sync model file: {e}")))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn io_error(message: String) -> AppError {
    AppError::new(ErrorKind::Io, message)
}

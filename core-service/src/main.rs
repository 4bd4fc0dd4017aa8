//! FlowGuard Score - offline scoring of one flow row
//!
//! Usage:
//!   flowguard-score row.json
//!   flowguard-score --artifacts /srv/models row.json
//!
//! The row file is a flat JSON object, or a non-empty array whose first
//! element is scored. Prints the verdict with its MSE and threshold.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;

use flowguard_core::constants::{APP_NAME, APP_VERSION};
use flowguard_core::{ArtifactPaths, FeatureRecord, InferenceContext};

/// Score a network-flow feature row for anomalousness
#[derive(Parser, Debug)]
#[command(name = "flowguard-score")]
#[command(about = "Score one network-flow row: BENIGN or ANOMALY with attack category")]
struct Args {
    /// Row JSON file
    row: PathBuf,

    /// Artifact directory (defaults to FLOWGUARD_ARTIFACT_DIR, then ./models)
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let args = Args::parse();

    log::info!("Starting {} scorer v{}", APP_NAME, APP_VERSION);

    let paths = match &args.artifacts {
        Some(dir) => ArtifactPaths::in_dir(dir),
        None => ArtifactPaths::from_env(),
    };

    let ctx = match InferenceContext::load(&paths) {
        Ok(ctx) => ctx,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    let record = match read_row(&args.row) {
        Ok(record) => record,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::from(1);
        }
    };

    match ctx.predict_detailed(&record) {
        Ok(prediction) => {
            let rendered = if args.pretty {
                serde_json::to_string_pretty(&prediction)
            } else {
                serde_json::to_string(&prediction)
            };
            match rendered {
                Ok(out) => {
                    println!("{}", out);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    log::error!("Failed to render result: {}", e);
                    ExitCode::from(1)
                }
            }
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(1)
        }
    }
}

/// Read a row file: an object, or the first element of an array
fn read_row(path: &Path) -> Result<FeatureRecord, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;

    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| format!("{} is not valid JSON: {}", path.display(), e))?;

    let row = match value {
        Value::Array(rows) => rows
            .into_iter()
            .next()
            .ok_or_else(|| format!("{} contains an empty array", path.display()))?,
        other => other,
    };

    match row {
        Value::Object(fields) => Ok(FeatureRecord::from(fields)),
        _ => Err(format!("{} must contain a JSON object of feature -> value", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_row_object_and_array() {
        let dir = tempdir().unwrap();

        let object = dir.path().join("row.json");
        std::fs::write(&object, r#"{"Flow Duration": 12}"#).unwrap();
        assert_eq!(read_row(&object).unwrap().len(), 1);

        let array = dir.path().join("rows.json");
        std::fs::write(&array, r#"[{"a": 1, "b": 2}, {"a": 3}]"#).unwrap();
        assert_eq!(read_row(&array).unwrap().len(), 2);
    }

    #[test]
    fn test_read_row_rejects_bad_shapes() {
        let dir = tempdir().unwrap();

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "[]").unwrap();
        assert!(read_row(&empty).is_err());

        let scalar = dir.path().join("scalar.json");
        std::fs::write(&scalar, "42").unwrap();
        assert!(read_row(&scalar).is_err());
    }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::math::{GeoAnchor, GeoCoordinateError, MapProjection, Mat4, WebMercator};
use gpu::{TransformDescriptor, compose_frame, model_matrix};
use layers::compute_transform;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use viewer::{ConfigError, ViewerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect georeferenced overlay transforms")]
struct Args {
    /// Viewer config JSON (built-in defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the transform descriptor for the configured anchor
    Transform {
        /// Override anchor longitude (degrees)
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Override anchor latitude (degrees)
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Override anchor altitude (meters)
        #[arg(long, allow_hyphen_values = true)]
        alt: Option<f64>,
    },

    /// Compose a map projection matrix with the model transform
    Compose {
        /// 16 comma-separated column-major values (identity when omitted)
        #[arg(long, allow_hyphen_values = true)]
        matrix: Option<String>,
    },

    /// Print the default config as JSON
    Defaults,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Geo(#[from] GeoCoordinateError),
    #[error("bad matrix: {0}")]
    Matrix(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct TransformReport {
    anchor: GeoAnchor,
    units_per_meter: f64,
    transform: TransformDescriptor,
}

#[derive(Debug, Serialize)]
struct ComposeReport {
    map_projection: [f64; 16],
    model: [f64; 16],
    combined: [f64; 16],
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!(error = %e, "atlas-overlay failed");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<String, CliError> {
    let config = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            ViewerConfig::from_path(path)?
        }
        None => ViewerConfig::default(),
    };

    match args.command {
        Command::Transform { lng, lat, alt } => {
            let anchor = GeoAnchor::new(
                lng.unwrap_or(config.anchor.longitude),
                lat.unwrap_or(config.anchor.latitude),
                alt.unwrap_or(config.anchor.altitude_meters),
            );
            let report = transform_report(&config, anchor)?;
            Ok(serde_json::to_string_pretty(&report)?)
        }
        Command::Compose { matrix } => {
            let map_projection = match matrix {
                Some(text) => parse_matrix(&text)?,
                None => Mat4::IDENTITY,
            };
            let report = compose_report(&config, &map_projection)?;
            Ok(serde_json::to_string_pretty(&report)?)
        }
        Command::Defaults => Ok(serde_json::to_string_pretty(&ViewerConfig::default())?),
    }
}

fn transform_report(config: &ViewerConfig, anchor: GeoAnchor) -> Result<TransformReport, CliError> {
    let transform = compute_transform(
        &WebMercator,
        anchor,
        config.calibration.rotation,
        config.calibration.scale_constant,
    )?;
    Ok(TransformReport {
        anchor,
        units_per_meter: WebMercator.units_per_meter(&anchor)?,
        transform,
    })
}

fn compose_report(config: &ViewerConfig, map_projection: &Mat4) -> Result<ComposeReport, CliError> {
    let transform = compute_transform(
        &WebMercator,
        config.anchor,
        config.calibration.rotation,
        config.calibration.scale_constant,
    )?;
    Ok(ComposeReport {
        map_projection: map_projection.to_cols_array(),
        model: model_matrix(&transform).to_cols_array(),
        combined: compose_frame(map_projection, &transform).to_cols_array(),
    })
}

fn parse_matrix(text: &str) -> Result<Mat4, CliError> {
    let values = text
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| CliError::Matrix(format!("{v:?}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let cols: [f64; 16] = values
        .try_into()
        .map_err(|v: Vec<f64>| CliError::Matrix(format!("expected 16 values, got {}", v.len())))?;
    Ok(Mat4::from_cols_array(&cols))
}

#[cfg(test)]
mod tests {
    use super::{CliError, compose_report, parse_matrix, transform_report};
    use foundation::math::{GeoAnchor, Mat4, Vec3};
    use pretty_assertions::assert_eq;
    use viewer::ViewerConfig;

    #[test]
    fn parses_column_major_matrix() {
        let text = "1,0,0,0, 0,1,0,0, 0,0,1,0, 4,5,6,1";
        let m = parse_matrix(text).unwrap();
        assert_eq!(m, Mat4::translation(Vec3::new(4.0, 5.0, 6.0)));
    }

    #[test]
    fn rejects_short_matrix() {
        assert!(matches!(parse_matrix("1,2,3"), Err(CliError::Matrix(_))));
        assert!(matches!(parse_matrix("1,x"), Err(CliError::Matrix(_))));
    }

    #[test]
    fn transform_report_scales_by_calibration() {
        let config = ViewerConfig::default();
        let report = transform_report(&config, config.anchor).unwrap();
        assert_eq!(report.transform.scale, report.units_per_meter * 100.0);
    }

    #[test]
    fn transform_report_rejects_polar_anchor() {
        let config = ViewerConfig::default();
        let err = transform_report(&config, GeoAnchor::new(0.0, 88.0, 0.0)).unwrap_err();
        assert!(matches!(err, CliError::Geo(_)));
    }

    #[test]
    fn identity_projection_combined_equals_model() {
        let report = compose_report(&ViewerConfig::default(), &Mat4::IDENTITY).unwrap();
        assert_eq!(report.combined, report.model);
        assert_eq!(report.map_projection, Mat4::IDENTITY.to_cols_array());
    }
}

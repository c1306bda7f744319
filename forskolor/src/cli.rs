//! Définition et implémentation des commandes CLI
//!
//! - `points` : points WGS84 → GeoJSON
//! - `hexbin` : densité hexagonale → GeoJSON
//! - `view` : vue initiale de la carte (JSON sur stdout)

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::{info, warn};

use forskolor::export::{hexbin_to_geojson, points_to_geojson, write_geojson};
use forskolor::view::DEFAULT_ZOOM;
use forskolor::{
    hexbin, Config, GeoTable, HexbinOptions, HttpPageSource, Pipeline, RunReport, ViewState,
    TARGET_EPSG,
};

#[derive(Subcommand)]
pub enum Commands {
    /// Export preschool locations as GeoJSON points (WGS84)
    Points {
        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Export hexagon density cells as GeoJSON polygons
    Hexbin {
        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Hexagon radius in meters
        #[arg(long, default_value_t = 100.0)]
        radius: f64,

        /// Elevation multiplier
        #[arg(long, default_value_t = 4.0)]
        elevation_scale: f64,
    },

    /// Print the initial map view (center, zoom, pitch) as JSON
    View {
        /// Map zoom level
        #[arg(long, default_value_t = DEFAULT_ZOOM)]
        zoom: f64,
    },
}

/// Options communes à toutes les commandes
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config preset name (stockholm) or path to a JSON config
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Service units endpoint (env: FORSKOLOR_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Page size (env: FORSKOLOR_BATCH_SIZE)
    #[arg(long, global = true)]
    pub batch_size: Option<usize>,

    /// Request timeout in seconds (env: FORSKOLOR_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// EPSG code of the planar coordinates (3006-3018)
    #[arg(long, global = true)]
    pub source_epsg: Option<u32>,

    /// Save the run report as JSON
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,
}

/// Construit la configuration : défauts < fichier < environnement < CLI
pub fn build_config(args: &GlobalArgs) -> Result<Config> {
    build_config_with(args, Config::env_var)
}

fn build_config_with(args: &GlobalArgs, var: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let mut config = match &args.config {
        Some(spec) => Config::resolve(spec)?,
        None => Config::default(),
    };
    config.apply_overrides(var)?;

    if let Some(ref endpoint) = args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(epsg) = args.source_epsg {
        config.source_epsg = epsg;
    }

    config.validate()?;
    Ok(config)
}

async fn run_pipeline(config: Config) -> forskolor::Result<(GeoTable, RunReport)> {
    let source = HttpPageSource::new(&config.endpoint, config.timeout())?;
    let pipeline = Pipeline::new(source, config)?;
    pipeline.run().await
}

/// Exécute le pipeline, sauvegarde le rapport (y compris en cas d'échec)
async fn load_points(config: Config, report_path: Option<&Path>) -> Result<(GeoTable, RunReport)> {
    let start = Instant::now();
    let endpoint = config.endpoint.clone();
    let source_epsg = config.source_epsg;

    let (geo, report) = match run_pipeline(config).await {
        Ok(ok) => ok,
        Err(e) => {
            if let Some(path) = report_path {
                let mut report = RunReport::new(&endpoint, source_epsg, TARGET_EPSG);
                report.record_failure(&e);
                report.set_duration(start.elapsed());
                report.finalize();
                if let Err(save_err) = report.save_to_file(path) {
                    warn!(path = %path.display(), error = %save_err, "Failed to save report");
                }
            }
            return Err(e).context("Pipeline failed");
        }
    };

    info!("{}", report.summary());
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    if let Some(path) = report_path {
        report
            .save_to_file(path)
            .context(format!("Failed to save report: {}", path.display()))?;
        info!(path = %path.display(), "Report saved");
    }

    Ok((geo, report))
}

/// Exécute la commande points
pub async fn cmd_points(config: Config, output: &Path, report: Option<&Path>) -> Result<()> {
    let (geo, run_report) = load_points(config, report).await?;

    write_geojson(&points_to_geojson(&geo), output)
        .context(format!("Failed to write {}", output.display()))?;
    run_report.display();

    info!(output = %output.display(), features = geo.len(), "Points exported");
    Ok(())
}

/// Exécute la commande hexbin
pub async fn cmd_hexbin(
    config: Config,
    output: &Path,
    radius: f64,
    elevation_scale: f64,
    report: Option<&Path>,
) -> Result<()> {
    let options = HexbinOptions {
        radius_m: radius,
        elevation_scale,
        ..HexbinOptions::default()
    };
    let (geo, run_report) = load_points(config, report).await?;
    let cells = hexbin(geo.points(), &options)?;

    write_geojson(&hexbin_to_geojson(&cells), output)
        .context(format!("Failed to write {}", output.display()))?;
    run_report.display();

    info!(
        output = %output.display(),
        cells = cells.len(),
        points = geo.len(),
        "Hexagons exported"
    );
    Ok(())
}

/// Exécute la commande view
pub async fn cmd_view(config: Config, zoom: f64, report: Option<&Path>) -> Result<()> {
    // stdout est réservé au JSON de la vue
    let (geo, _) = load_points(config, report).await?;

    match ViewState::centered_on(&geo, zoom) {
        Some(view) => println!("{}", serde_json::to_string_pretty(&view)?),
        None => warn!("No preschool found, map center is undefined"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_build_config_cli_wins() {
        let vars: HashMap<&str, &str> = [
            ("FORSKOLOR_ENDPOINT", "http://env.example.com/units"),
            ("FORSKOLOR_BATCH_SIZE", "50"),
            ("FORSKOLOR_TIMEOUT_SECS", "12"),
        ]
        .into_iter()
        .collect();
        let args = GlobalArgs {
            endpoint: Some("http://localhost:9999/units".into()),
            batch_size: Some(10),
            source_epsg: Some(3006),
            ..GlobalArgs::default()
        };
        let config = build_config_with(&args, |k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.endpoint, "http://localhost:9999/units");
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.source_epsg, 3006);
    }

    #[test]
    fn test_build_config_env_over_defaults() {
        let config = build_config_with(&GlobalArgs::default(), |k| {
            (k == "FORSKOLOR_BATCH_SIZE").then(|| "25".to_string())
        })
        .unwrap();

        assert_eq!(config.batch_size, 25);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_build_config_rejects_bad_env_value() {
        let result = build_config_with(&GlobalArgs::default(), |k| {
            (k == "FORSKOLOR_BATCH_SIZE").then(|| "lots".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_build_config_rejects_zero_timeout() {
        let args = GlobalArgs {
            timeout: Some(0),
            ..GlobalArgs::default()
        };
        assert!(build_config_with(&args, no_env).is_err());
    }

    #[test]
    fn test_build_config_unknown_preset() {
        let args = GlobalArgs {
            config: Some("does-not-exist".into()),
            ..GlobalArgs::default()
        };
        assert!(build_config_with(&args, no_env).is_err());
    }
}

//! Point d'entrée CLI pour forskolor

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{Commands, GlobalArgs};

/// Carte de densité des förskolor de Stockholm
#[derive(Parser)]
#[command(name = "forskolor")]
#[command(author, version)]
#[command(about = "Récupérer les förskolor de Stockholm, reprojeter en WGS84 et exporter en GeoJSON")]
#[command(long_about = "Récupère les unités de service (förskolor) de l'API de la ville de Stockholm, reprojette les coordonnées SWEREF99 en WGS84 et exporte des points, des hexagones de densité ou la vue initiale de la carte.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let config = cli::build_config(&cli.global)?;
    let report = cli.global.report.as_deref();

    match cli.command {
        Commands::Points { output } => {
            info!(endpoint = %config.endpoint, output = %output.display(), "Export des points");
            cli::cmd_points(config, &output, report).await?;
        }
        Commands::Hexbin {
            output,
            radius,
            elevation_scale,
        } => {
            info!(endpoint = %config.endpoint, output = %output.display(), radius, "Export des hexagones");
            cli::cmd_hexbin(config, &output, radius, elevation_scale, report).await?;
        }
        Commands::View { zoom } => {
            info!(endpoint = %config.endpoint, zoom, "Vue initiale");
            cli::cmd_view(config, zoom, report).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}

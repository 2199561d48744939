#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line client for the asset registry field map.
//!
//! Each subcommand plays one map interaction: a shape is described on the
//! command line, run through the same workflow the map uses, and the
//! resulting inspector JSON and layers are printed.

use std::sync::Arc;

use asset_registry_cli_utils::parse_shape;
use asset_registry_client::config::{
    ACCESS_TOKEN_ENV, BASE_URL_ENV, ClientConfig, REFRESH_TOKEN_ENV,
};
use asset_registry_client::http::HttpRegistryBackend;
use asset_registry_client::signing::BearerTokens;
use asset_registry_geometry::DrawnShape;
use asset_registry_workflow::FieldWorkflow;
use asset_registry_workflow::session::{ActionSession, FieldAction};
use asset_registry_workflow::state::DisplayState;
use clap::{Args, Parser, Subcommand};

/// Query and register fields in the asset registry.
#[derive(Parser)]
#[command(name = "asset_registry_cli")]
#[command(about = "Query and register fields in the asset registry")]
struct Cli {
    /// Registry base URL.
    #[arg(long, env = BASE_URL_ENV)]
    base_url: Option<String>,

    /// Access token sent with every request.
    #[arg(long, env = ACCESS_TOKEN_ENV, hide_env_values = true)]
    access_token: Option<String>,

    /// Refresh token sent with logout.
    #[arg(long, env = REFRESH_TOKEN_ENV, hide_env_values = true)]
    refresh_token: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// A drawn shape.
#[derive(Args)]
struct ShapeArgs {
    /// Layer type: polygon, rectangle, polyline, marker, circle, circlemarker.
    #[arg(long, default_value = "polygon")]
    shape: String,

    /// Vertices as `lat,lng;lat,lng;...` in drawn order.
    #[arg(long, allow_hyphen_values = true)]
    vertices: String,

    /// Circle radius in meters (circles only).
    #[arg(long)]
    radius: Option<f64>,
}

/// Popup parameters. Anything left out keeps its default.
#[derive(Args)]
struct ParameterArgs {
    /// Resolution level (default 13).
    #[arg(long)]
    resolution_level: Option<String>,

    /// Minimum overlap percentage, 0-100 (default 90).
    #[arg(long)]
    threshold: Option<String>,

    /// Domain filter (lookups only).
    #[arg(long)]
    domain: Option<String>,

    /// Spatial index levels as `min,max` (default 8,13).
    #[arg(long = "s2-index")]
    s2_index: Option<String>,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Look up registered fields matching a shape.
    Query {
        #[command(flatten)]
        shape: ShapeArgs,
        #[command(flatten)]
        params: ParameterArgs,
    },

    /// Register a polygon as a field boundary.
    Register {
        /// Polygon vertices as `lat,lng;lat,lng;...` in drawn order.
        #[arg(long, allow_hyphen_values = true)]
        vertices: String,
        #[command(flatten)]
        params: ParameterArgs,
    },

    /// Percentage overlap of two WKT geometries.
    Overlap {
        /// First geometry.
        wkt_a: String,
        /// Second geometry.
        wkt_b: String,
    },

    /// Print a shape's WKT and ground measurements without contacting the
    /// registry.
    Measure {
        #[command(flatten)]
        shape: ShapeArgs,
    },

    /// End the session.
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    asset_registry_cli_utils::init_logger();
    let cli = Cli::parse();

    if let Commands::Measure { shape } = &cli.command {
        return measure(shape);
    }

    let config = ClientConfig::new(cli.base_url.as_deref().unwrap_or_default())?;
    log::debug!("Using registry at {}", config.base_url);
    let backend = HttpRegistryBackend::new(
        reqwest::Client::new(),
        config,
        Arc::new(BearerTokens::new(cli.access_token, cli.refresh_token)),
    );
    let workflow = FieldWorkflow::new(Arc::new(backend));

    let result = match cli.command {
        Commands::Query { shape, params } => {
            let session = open_session(
                parse_shape(&shape.shape, &shape.vertices, shape.radius)?,
                &params,
            )?;
            session
                .run(&workflow, FieldAction::FetchField)
                .await
                .map(|_| ())
        }
        Commands::Register { vertices, params } => {
            let session = open_session(parse_shape("polygon", &vertices, None)?, &params)?;
            session
                .run(&workflow, FieldAction::RegisterField)
                .await
                .map(|_| ())
        }
        Commands::Overlap { wkt_a, wkt_b } => workflow
            .percentage_overlap(&wkt_a, &wkt_b)
            .await
            .map(|_| ()),
        Commands::Logout => workflow.logout().await,
        Commands::Measure { .. } => Ok(()),
    };

    print_display(&workflow.snapshot())?;
    result?;
    Ok(())
}

fn open_session(
    shape: DrawnShape,
    params: &ParameterArgs,
) -> Result<ActionSession, Box<dyn std::error::Error>> {
    let mut session = ActionSession::open(shape);

    if let Some(level) = &params.resolution_level {
        session.set_resolution_level(level)?;
    }
    if let Some(threshold) = &params.threshold {
        session.set_threshold(threshold)?;
    }
    if let Some(domain) = &params.domain {
        session.set_domain(domain);
    }
    if let Some(levels) = &params.s2_index {
        session.set_spatial_index_levels(levels)?;
    }

    log::debug!("Query parameters: {:?}", session.params());
    Ok(session)
}

fn measure(args: &ShapeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let shape = parse_shape(&args.shape, &args.vertices, args.radius)?;
    if matches!(shape, DrawnShape::Circle { .. }) && args.radius.is_none() {
        return Err("Measuring a circle needs --radius".into());
    }
    let wkt = asset_registry_geometry::encode(&shape);

    println!("Shape:     {}", shape.layer_name());
    println!("WKT:       {}", if wkt.is_empty() { "-" } else { &wkt });

    match shape.measure() {
        Some(measure) => {
            println!(
                "Centroid:  {:.6}, {:.6}",
                measure.centroid.lat, measure.centroid.lng
            );
            println!(
                "Area:      {:.1} m² ({:.4} ha)",
                measure.area_m2,
                measure.area_m2 / 10_000.0
            );
            println!("Perimeter: {:.1} m", measure.perimeter_m);
        }
        None => println!("No geometry to measure"),
    }

    Ok(())
}

fn print_display(display: &DisplayState) -> Result<(), serde_json::Error> {
    if let Some(inspection) = &display.inspection {
        println!("{}", serde_json::to_string_pretty(inspection)?);
    }

    for overlay in display.overlays() {
        println!(
            "Layer {:<10} color {} fill {:.1}",
            overlay.role, overlay.style.color, overlay.style.fill_opacity
        );
    }

    if let Some(message) = &display.error_message {
        eprintln!("Error: {message}");
    }

    Ok(())
}

use astar_corners::config::{Cli, Config};
use astar_corners::map::{Map, Position};
use astar_corners::pathfinder::Pathfinder;
use astar_corners::stat::Stats;

use anyhow::{ensure, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct PathReport<'a> {
    found: bool,
    path: &'a [Position],
    length: Option<f64>,
    corners: Option<usize>,
    stats: &'a Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;
    config.validate()?;

    let mut map = match &config.map_path {
        Some(map_path) => Map::from_file(map_path, config.movement)?,
        None => {
            let mut rng = StdRng::seed_from_u64(config.seed);
            Map::with_random_obstacles(
                config.height,
                config.width,
                config.obstacle_density,
                config.movement,
                &mut rng,
            )
        }
    };
    for (name, position) in [("start", config.start), ("goal", config.goal)] {
        ensure!(
            map.contains(position),
            "{name} {position:?} lies outside the {}x{} map",
            map.height,
            map.width
        );
        map.set_passable(position);
    }

    let mut pathfinder = Pathfinder::new();
    let mut path = Vec::new();
    let found = pathfinder.find_path(
        &map,
        config.start,
        &config.goal,
        &config.search_options(),
        &mut path,
    )?;

    let (length, corners) = if found {
        let length = map.path_length(&path);
        let corners = map.count_corners(&path)?;
        info!("Path length = {length} with {corners} corners: {path:?}");
        (Some(length), Some(corners))
    } else {
        error!("Path is not found");
        (None, None)
    };
    pathfinder.stats().print();

    if let Some(output_path) = &config.output_path {
        let report = PathReport {
            found,
            path: &path,
            length,
            corners,
            stats: pathfinder.stats(),
        };
        let file = File::create(output_path)
            .with_context(|| format!("failed to create result file: {output_path}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
        info!("Result written to {output_path}");
    }

    Ok(())
}

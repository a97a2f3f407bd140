use anyhow::{anyhow, ensure};
use clap::Parser;
use serde::Deserialize;

use crate::map::{Movement, Position};
use crate::pathfinder::SearchOptions;

#[derive(Parser, Debug, Default)]
#[command(
    name = "Corner-bounded A*",
    about = "A* pathfinding on grid maps with a limit on direction changes.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to a MovingAI .map file; a random map is generated if absent")]
    pub map_path: Option<String>,

    #[arg(long, help = "Height of the generated map")]
    pub height: Option<usize>,

    #[arg(long, help = "Width of the generated map")]
    pub width: Option<usize>,

    #[arg(long, help = "Share of blocked cells in the generated map")]
    pub obstacle_density: Option<f64>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Start cell as row,column", value_delimiter = ',')]
    pub start: Vec<usize>,

    #[arg(long, help = "Goal cell as row,column", value_delimiter = ',')]
    pub goal: Vec<usize>,

    #[arg(long, help = "Maximum number of direction changes along the path")]
    pub max_corners: Option<u32>,

    #[arg(long, help = "Give up after finalizing this many nodes (0 means unlimited)")]
    pub expansion_limit: Option<usize>,

    #[arg(long, value_enum, help = "Allowed moves")]
    pub movement: Option<Movement>,

    #[arg(long, help = "Path to the JSON result file")]
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub map_path: Option<String>,
    pub height: usize,
    pub width: usize,
    pub obstacle_density: f64,
    pub seed: u64,
    pub start: Position,
    pub goal: Position,
    pub max_corners: Option<u32>,
    pub expansion_limit: Option<usize>,
    pub movement: Movement,
    pub output_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: None,
            height: 32,
            width: 32,
            obstacle_density: 0.2,
            seed: 0,
            start: (0, 0),
            goal: (31, 31),
            max_corners: None,
            expansion_limit: None,
            movement: Movement::Octile,
            output_path: None,
        }
    }
}

impl Config {
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Values given on the command line win over the ones from the file.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(map_path) = &cli.map_path {
            self.map_path = Some(map_path.clone());
        }
        if let Some(height) = cli.height {
            self.height = height;
        }
        if let Some(width) = cli.width {
            self.width = width;
        }
        if let Some(obstacle_density) = cli.obstacle_density {
            self.obstacle_density = obstacle_density;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if !cli.start.is_empty() {
            self.start = parse_position(&cli.start, "start")?;
        }
        if !cli.goal.is_empty() {
            self.goal = parse_position(&cli.goal, "goal")?;
        }
        if cli.max_corners.is_some() {
            self.max_corners = cli.max_corners;
        }
        if cli.expansion_limit.is_some() {
            self.expansion_limit = cli.expansion_limit;
        }
        if let Some(movement) = cli.movement {
            self.movement = movement;
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        Ok(self)
    }

    /// Checks what can be checked before the map is known.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.map_path.is_none() {
            ensure!(
                (0.0..1.0).contains(&self.obstacle_density),
                "Obstacle density must be in [0, 1), got {}",
                self.obstacle_density
            );
            ensure!(
                self.height >= 2 && self.width >= 2,
                "Generated map must be at least 2x2, got {}x{}",
                self.height,
                self.width
            );
            for (name, (x, y)) in [("Start", self.start), ("Goal", self.goal)] {
                if x >= self.height || y >= self.width {
                    return Err(anyhow!(
                        "{name} ({x}, {y}) lies outside the {}x{} map",
                        self.height,
                        self.width
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_corners: self.max_corners,
            expansion_limit: self.expansion_limit,
        }
    }
}

fn parse_position(values: &[usize], name: &str) -> anyhow::Result<Position> {
    match values {
        [x, y] => Ok((*x, *y)),
        _ => Err(anyhow!(
            "{name} needs exactly two coordinates, got {values:?}"
        )),
    }
}

use anyhow::{bail, ensure, Context};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::common::Direction;
use crate::error::SearchError;
use crate::graph::{Graph, IMPASSABLE};

/// Grid cell as (row, column).
pub type Position = (usize, usize);

// Up, up-right, right, down-right, down, down-left, left, up-left.
// The direction code of DIRECTIONS[i] is i + 1.
const DIRECTIONS: [(isize, isize); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    /// Up, down, left and right only.
    Cardinal,
    /// Cardinal moves plus diagonals.
    #[default]
    Octile,
}

impl Movement {
    fn allows(self, direction_index: usize) -> bool {
        match self {
            Movement::Cardinal => direction_index % 2 == 0,
            Movement::Octile => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tile {
    passable: bool,
}

impl Tile {
    pub fn is_passable(&self) -> bool {
        self.passable
    }
}

#[derive(Debug, Clone)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    pub movement: Movement,
    pub grid: Vec<Vec<Tile>>,
}

impl Map {
    /// A fully passable grid.
    pub fn new(height: usize, width: usize, movement: Movement) -> Self {
        Map {
            height,
            width,
            movement,
            grid: vec![vec![Tile { passable: true }; width]; height],
        }
    }

    pub fn with_random_obstacles<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        density: f64,
        movement: Movement,
        rng: &mut R,
    ) -> Self {
        let grid = (0..height)
            .map(|_| {
                (0..width)
                    .map(|_| Tile {
                        passable: !rng.gen_bool(density),
                    })
                    .collect()
            })
            .collect();

        Map {
            height,
            width,
            movement,
            grid,
        }
    }

    pub fn from_file(path: &str, movement: Movement) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read map file {path}"))?;
        Self::parse(&content, movement).with_context(|| format!("malformed map file {path}"))
    }

    /// Parses the MovingAI `.map` format: a `type`/`height`/`width` header
    /// terminated by a `map` line, followed by `height` rows of cells.
    pub fn parse(content: &str, movement: Movement) -> anyhow::Result<Self> {
        let mut lines = content.lines();
        let mut height = None;
        let mut width = None;

        for line in lines.by_ref() {
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("type") | None => {}
                Some("height") => height = Some(parse_dimension(parts.next(), "height")?),
                Some("width") => width = Some(parse_dimension(parts.next(), "width")?),
                Some("map") => break,
                Some(_) => bail!("unexpected header line: {line:?}"),
            }
        }

        let height = height.context("header is missing the height")?;
        let width = width.context("header is missing the width")?;

        let rows: Vec<&str> = lines.take(height).collect();
        ensure!(
            rows.len() == height,
            "expected {height} rows, found {}",
            rows.len()
        );

        let map = Self::from_rows(&rows, movement)?;
        ensure!(
            map.width == width,
            "expected rows of width {width}, found {}",
            map.width
        );

        Ok(map)
    }

    /// Builds a map from header-less rows. `.`, `G` and `S` are passable,
    /// every other cell is blocked.
    pub fn from_rows(rows: &[&str], movement: Movement) -> anyhow::Result<Self> {
        ensure!(!rows.is_empty(), "map has no rows");
        let width = rows[0].trim_end().chars().count();

        let mut grid = Vec::with_capacity(rows.len());
        for (x, row) in rows.iter().enumerate() {
            let tiles: Vec<Tile> = row
                .trim_end()
                .chars()
                .map(|ch| Tile {
                    passable: matches!(ch, '.' | 'G' | 'S'),
                })
                .collect();
            ensure!(
                tiles.len() == width,
                "row {x} has {} cells, expected {width}",
                tiles.len()
            );
            grid.push(tiles);
        }

        Ok(Map {
            height: rows.len(),
            width,
            movement,
            grid,
        })
    }

    pub fn contains(&self, (x, y): Position) -> bool {
        x < self.height && y < self.width
    }

    pub fn tile(&self, (x, y): Position) -> Option<&Tile> {
        self.grid.get(x).and_then(|row| row.get(y))
    }

    pub fn set_passable(&mut self, position: Position) {
        self.set(position, true);
    }

    pub fn set_impassable(&mut self, position: Position) {
        self.set(position, false);
    }

    pub fn toggle(&mut self, (x, y): Position) {
        if let Some(tile) = self.grid.get_mut(x).and_then(|row| row.get_mut(y)) {
            tile.passable = !tile.passable;
        }
    }

    /// Sum of edge lengths along `path`.
    pub fn path_length(&self, path: &[Position]) -> f64 {
        path.windows(2)
            .map(|step| self.edge_length(&step[0], &step[1]))
            .sum()
    }

    /// Number of direction changes along `path`.
    pub fn count_corners(&self, path: &[Position]) -> Result<usize, SearchError> {
        let mut corners = 0;
        let mut previous = Direction::NONE;

        for step in path.windows(2) {
            let direction = self.last_move(&step[1], &step[0])?;
            if !previous.is_none() && direction != previous {
                corners += 1;
            }
            previous = direction;
        }

        Ok(corners)
    }

    fn set(&mut self, (x, y): Position, passable: bool) {
        if let Some(tile) = self.grid.get_mut(x).and_then(|row| row.get_mut(y)) {
            tile.passable = passable;
        }
    }

    fn step(&self, (x, y): Position, (dx, dy): (isize, isize)) -> Option<Position> {
        let next = (x.checked_add_signed(dx)?, y.checked_add_signed(dy)?);
        self.contains(next).then_some(next)
    }

    fn direction_index(&self, vertex: Position, predecessor: Position) -> Option<usize> {
        let offset = (
            vertex.0 as isize - predecessor.0 as isize,
            vertex.1 as isize - predecessor.1 as isize,
        );
        DIRECTIONS
            .iter()
            .position(|&direction| direction == offset)
            .filter(|&index| self.movement.allows(index))
    }
}

fn parse_dimension(value: Option<&str>, name: &str) -> anyhow::Result<usize> {
    let value = value.with_context(|| format!("{name} has no value"))?;
    value
        .parse()
        .with_context(|| format!("invalid {name}: {value:?}"))
}

fn euclidean(first: Position, second: Position) -> f64 {
    let dx = first.0 as f64 - second.0 as f64;
    let dy = first.1 as f64 - second.1 as f64;
    (dx * dx + dy * dy).sqrt()
}

impl Graph for Map {
    type Vertex = Position;

    fn neighbors(&self, vertex: &Position) -> impl Iterator<Item = Position> + '_ {
        let position = *vertex;
        DIRECTIONS
            .iter()
            .enumerate()
            .filter(move |(index, _)| self.movement.allows(*index))
            .filter_map(move |(_, &direction)| self.step(position, direction))
    }

    fn edge_length(&self, start: &Position, end: &Position) -> f64 {
        if !self.is_passable(start)
            || !self.is_passable(end)
            || self.direction_index(*end, *start).is_none()
        {
            return IMPASSABLE;
        }
        euclidean(*start, *end)
    }

    fn is_passable(&self, vertex: &Position) -> bool {
        self.tile(*vertex).is_some_and(Tile::is_passable)
    }

    fn heuristic(&self, source: &Position, destination: &Position) -> f64 {
        euclidean(*source, *destination)
    }

    fn last_move(&self, vertex: &Position, predecessor: &Position) -> Result<Direction, SearchError> {
        self.direction_index(*vertex, *predecessor)
            .map(|index| Direction(index as u32 + 1))
            .ok_or_else(|| SearchError::not_adjacent(vertex, predecessor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_read_map() {
        let map = Map::from_file("map_file/test/test.map", Movement::Octile).unwrap();

        assert_eq!(map.height, 4);
        assert_eq!(map.width, 5);

        assert!(map.is_passable(&(0, 0)));
        assert!(!map.is_passable(&(1, 1)));
        assert!(!map.is_passable(&(1, 3)));
        assert!(map.is_passable(&(1, 4)));
        assert!(!map.is_passable(&(3, 3)));
        assert!(!map.is_passable(&(4, 0)));

        let neighbors: Vec<Position> = map.neighbors(&(0, 0)).collect();
        assert_eq!(neighbors, vec![(0, 1), (1, 1), (1, 0)]);
    }

    #[test]
    fn test_missing_map_file() {
        let error = Map::from_file("map_file/test/missing.map", Movement::Octile).unwrap_err();
        assert!(error.to_string().contains("missing.map"));
    }

    #[test]
    fn test_parse_rejects_malformed_maps() {
        assert!(Map::parse("type octile\nwidth 2\nmap\n..\n", Movement::Octile).is_err());
        assert!(Map::parse("type octile\nheight 2\nwidth 2\nmap\n..\n", Movement::Octile).is_err());
        assert!(Map::parse("type octile\nheight 2\nwidth 3\nmap\n..\n..\n", Movement::Octile).is_err());
        assert!(Map::parse("type octile\nheight x\nwidth 2\nmap\n..\n", Movement::Octile).is_err());
        assert!(Map::from_rows(&["...", ".."], Movement::Octile).is_err());
        assert!(Map::from_rows(&[], Movement::Octile).is_err());
    }

    #[test]
    fn test_cardinal_neighbors() {
        let map = Map::new(3, 3, Movement::Cardinal);
        let neighbors: Vec<Position> = map.neighbors(&(1, 1)).collect();
        assert_eq!(neighbors, vec![(0, 1), (1, 2), (2, 1), (1, 0)]);

        let octile = Map::new(3, 3, Movement::Octile);
        assert_eq!(octile.neighbors(&(1, 1)).count(), 8);
        assert_eq!(octile.neighbors(&(2, 2)).count(), 3);
    }

    #[test]
    fn test_edge_length() {
        let mut map = Map::from_rows(&["...", ".@.", "..."], Movement::Octile).unwrap();
        assert_eq!(map.edge_length(&(0, 0), &(0, 1)), 1.0);
        assert!((map.edge_length(&(0, 1), &(1, 2)) - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(map.edge_length(&(0, 0), &(1, 1)), IMPASSABLE);
        assert_eq!(map.edge_length(&(0, 0), &(0, 2)), IMPASSABLE);

        map.toggle((1, 1));
        assert!(map.is_passable(&(1, 1)));
        assert!((map.edge_length(&(0, 0), &(1, 1)) - 2f64.sqrt()).abs() < 1e-12);

        let cardinal = Map::new(2, 2, Movement::Cardinal);
        assert_eq!(cardinal.edge_length(&(0, 0), &(1, 1)), IMPASSABLE);
    }

    #[test]
    fn test_last_move_and_corners() {
        let map = Map::new(3, 3, Movement::Octile);
        assert_eq!(map.last_move(&(0, 1), &(1, 1)), Ok(Direction(1)));
        assert_eq!(map.last_move(&(1, 2), &(1, 1)), Ok(Direction(3)));
        assert_eq!(map.last_move(&(2, 2), &(1, 1)), Ok(Direction(4)));
        assert_eq!(map.last_move(&(0, 0), &(1, 1)), Ok(Direction(8)));
        assert!(matches!(
            map.last_move(&(2, 2), &(0, 0)),
            Err(SearchError::NotAdjacent { .. })
        ));
        assert!(map.last_move(&(1, 1), &(1, 1)).is_err());

        assert_eq!(map.has_corner(&(1, 2), &(1, 1), Direction::NONE), Ok(false));
        assert_eq!(map.has_corner(&(1, 2), &(1, 1), Direction(3)), Ok(false));
        assert_eq!(map.has_corner(&(2, 1), &(1, 1), Direction(3)), Ok(true));
        assert!(map.has_corner(&(2, 2), &(0, 0), Direction(3)).is_err());
    }

    #[test]
    fn test_path_helpers() {
        let map = Map::new(3, 3, Movement::Octile);
        let path = [(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)];
        assert_eq!(map.path_length(&path), 4.0);
        assert_eq!(map.count_corners(&path), Ok(1));
        assert_eq!(map.count_corners(&[(0, 0), (1, 1), (2, 2)]), Ok(0));
        assert_eq!(map.count_corners(&[(0, 0), (0, 1), (1, 1), (1, 2)]), Ok(2));
        assert_eq!(map.count_corners(&[(0, 0)]), Ok(0));
        assert_eq!(map.path_length(&[(0, 0)]), 0.0);
        assert!(map.count_corners(&[(0, 0), (2, 2)]).is_err());
    }

    #[test]
    fn test_random_obstacles_are_reproducible() {
        let first = Map::with_random_obstacles(8, 8, 0.3, Movement::Octile, &mut StdRng::seed_from_u64(3));
        let second = Map::with_random_obstacles(8, 8, 0.3, Movement::Octile, &mut StdRng::seed_from_u64(3));

        let cells = |map: &Map| -> Vec<bool> {
            map.grid.iter().flatten().map(Tile::is_passable).collect()
        };
        assert_eq!(cells(&first), cells(&second));

        let open = Map::with_random_obstacles(4, 4, 0.0, Movement::Octile, &mut StdRng::seed_from_u64(3));
        assert!(cells(&open).into_iter().all(|passable| passable));
    }
}

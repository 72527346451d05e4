//! `TerrainMap`: a square cell grid carrying movement cost, cover, and
//! visibility per cell, painted from building footprints and road
//! polylines.

use tritium_core::enums::{AssetType, TerrainType};
use tritium_core::types::Point;

/// A closed building footprint, rasterized as `Building` cells.
#[derive(Debug, Clone)]
pub struct Building {
    pub vertices: Vec<Point>,
}

/// A road centerline with a fixed width, rasterized as `Road` cells.
#[derive(Debug, Clone)]
pub struct RoadSegment {
    pub start: Point,
    pub end: Point,
    pub width: f64,
}

/// A uniform square grid over `[-bounds, bounds]^2`.
#[derive(Debug, Clone)]
pub struct TerrainMap {
    bounds: f64,
    resolution: f64,
    grid_size: usize,
    cells: Vec<TerrainType>,
}

impl TerrainMap {
    pub fn new(bounds: f64, resolution: f64) -> Self {
        let grid_size = (2.0 * bounds / resolution) as usize + 1;
        Self {
            bounds,
            resolution,
            grid_size,
            cells: vec![TerrainType::Open; grid_size * grid_size],
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Grid coordinates (row, col) of `p`, unclamped; callers decide
    /// how to treat out-of-bounds positions.
    pub(crate) fn world_to_grid_raw(&self, p: Point) -> (i64, i64) {
        (
            ((p.y + self.bounds) / self.resolution).floor() as i64,
            ((p.x + self.bounds) / self.resolution).floor() as i64,
        )
    }

    pub(crate) fn cell_at(&self, row: i64, col: i64) -> TerrainType {
        if row < 0 || col < 0 || row >= self.grid_size as i64 || col >= self.grid_size as i64 {
            return TerrainType::Open;
        }
        self.cells[self.index(row as usize, col as usize)]
    }

    fn world_to_grid(&self, p: Point) -> Option<(usize, usize)> {
        let col = ((p.x + self.bounds) / self.resolution).floor();
        let row = ((p.y + self.bounds) / self.resolution).floor();
        if col < 0.0 || row < 0.0 || col >= self.grid_size as f64 || row >= self.grid_size as f64 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    fn grid_to_world(&self, row: usize, col: usize) -> Point {
        Point::new(
            col as f64 * self.resolution - self.bounds + self.resolution * 0.5,
            row as f64 * self.resolution - self.bounds + self.resolution * 0.5,
        )
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.grid_size + col
    }

    pub fn set_cell(&mut self, p: Point, terrain: TerrainType) {
        if let Some((row, col)) = self.world_to_grid(p) {
            let idx = self.index(row, col);
            self.cells[idx] = terrain;
        }
    }

    /// Defaults to `Open` for any position outside the grid.
    pub fn get_cell(&self, p: Point) -> TerrainType {
        match self.world_to_grid(p) {
            Some((row, col)) => self.cells[self.index(row, col)],
            None => TerrainType::Open,
        }
    }

    /// Rasterize building footprints by bounding-box scan plus
    /// point-in-polygon test.
    pub fn load_buildings(&mut self, buildings: &[Building]) {
        for building in buildings {
            if building.vertices.len() < 3 {
                continue;
            }
            let min_x = building.vertices.iter().map(|v| v.x).fold(f64::INFINITY, f64::min);
            let max_x = building.vertices.iter().map(|v| v.x).fold(f64::NEG_INFINITY, f64::max);
            let min_y = building.vertices.iter().map(|v| v.y).fold(f64::INFINITY, f64::min);
            let max_y = building.vertices.iter().map(|v| v.y).fold(f64::NEG_INFINITY, f64::max);

            let mut row = min_y;
            while row <= max_y {
                let mut col = min_x;
                while col <= max_x {
                    let p = Point::new(col, row);
                    if point_in_polygon(p, &building.vertices) {
                        self.set_cell(p, TerrainType::Building);
                    }
                    col += self.resolution;
                }
                row += self.resolution;
            }
        }
    }

    /// Rasterize road centerlines by stepping along each segment and
    /// painting cells across its width via the perpendicular normal.
    pub fn load_roads(&mut self, roads: &[RoadSegment]) {
        for road in roads {
            let delta = road.end - road.start;
            let length = delta.length();
            if length < 1e-9 {
                continue;
            }
            let dir = delta / length;
            let normal = Point::new(-dir.y, dir.x);
            let half_width = road.width * 0.5;
            let steps = (length / self.resolution).ceil() as usize;
            for i in 0..=steps {
                let t = i as f64 * self.resolution;
                let center = road.start + dir * t.min(length);
                let mut offset = -half_width;
                while offset <= half_width {
                    self.set_cell(center + normal * offset, TerrainType::Road);
                    offset += self.resolution;
                }
            }
        }
    }

    pub fn find_terrain_of_type(&self, terrain: TerrainType) -> Vec<Point> {
        let mut out = Vec::new();
        for row in 0..self.grid_size {
            for col in 0..self.grid_size {
                if self.cells[self.index(row, col)] == terrain {
                    out.push(self.grid_to_world(row, col));
                }
            }
        }
        out
    }

    /// Effective speed multiplier for an asset at `p`. Flying asset
    /// types ignore terrain entirely.
    pub fn get_speed_modifier(&self, p: Point, asset_type: AssetType) -> f64 {
        if asset_type.is_flying() {
            return 1.0;
        }
        let terrain = self.get_cell(p);
        let (movement_cost, _, _) = terrain.properties();
        let base = if movement_cost.is_infinite() { 0.0 } else { 1.0 / movement_cost };
        if asset_type == AssetType::Person && terrain == TerrainType::Yard {
            base * 0.9
        } else {
            base
        }
    }

    pub fn get_terrain_type(&self, p: Point) -> TerrainType {
        self.get_cell(p)
    }

    pub fn get_movement_cost(&self, p: Point) -> f64 {
        self.get_cell(p).properties().0
    }

    pub fn get_cover_value(&self, p: Point) -> f64 {
        self.get_cell(p).properties().1
    }

    pub fn get_visibility(&self, p: Point) -> f64 {
        self.get_cell(p).properties().2
    }

    pub fn bounds(&self) -> f64 {
        self.bounds
    }

    pub fn is_passable(&self, p: Point) -> bool {
        !self.get_movement_cost(p).is_infinite()
    }

    /// Clamp `p` into the map and, if its cell is impassable, walk
    /// outward ring by ring until a passable cell center is found.
    /// Falls back to the clamped point itself on a fully blocked map.
    pub fn snap_to_passable(&self, p: Point) -> Point {
        let clamped = Point::new(p.x.clamp(-self.bounds, self.bounds), p.y.clamp(-self.bounds, self.bounds));
        if self.is_passable(clamped) {
            return clamped;
        }
        let Some((row, col)) = self.world_to_grid(clamped) else { return clamped };
        for ring in 1..self.grid_size as i64 {
            let mut best: Option<(f64, Point)> = None;
            for dr in -ring..=ring {
                for dc in -ring..=ring {
                    if dr.abs() != ring && dc.abs() != ring {
                        continue;
                    }
                    let (r, c) = (row as i64 + dr, col as i64 + dc);
                    if r < 0 || c < 0 || r >= self.grid_size as i64 || c >= self.grid_size as i64 {
                        continue;
                    }
                    if self.cell_at(r, c).properties().0.is_infinite() {
                        continue;
                    }
                    let center = self.grid_to_world(r as usize, c as usize);
                    let dist = clamped.distance_squared(center);
                    if best.map(|(d, _)| dist < d).unwrap_or(true) {
                        best = Some((dist, center));
                    }
                }
            }
            if let Some((_, center)) = best {
                return center;
            }
        }
        clamped
    }
}

/// Standard ray-cast point-in-polygon test (odd-crossings-inside).
fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        let vi = polygon[i];
        let vj = polygon[j];
        if ((vi.y > p.y) != (vj.y > p.y))
            && (p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cell_is_open() {
        let map = TerrainMap::new(100.0, 5.0);
        assert_eq!(map.get_cell(Point::new(0.0, 0.0)), TerrainType::Open);
    }

    #[test]
    fn test_set_and_get_cell() {
        let mut map = TerrainMap::new(100.0, 5.0);
        map.set_cell(Point::new(10.0, 10.0), TerrainType::Road);
        assert_eq!(map.get_cell(Point::new(10.0, 10.0)), TerrainType::Road);
    }

    #[test]
    fn test_load_buildings_rasterizes_interior() {
        let mut map = TerrainMap::new(50.0, 2.0);
        let square = Building {
            vertices: vec![
                Point::new(-10.0, -10.0),
                Point::new(10.0, -10.0),
                Point::new(10.0, 10.0),
                Point::new(-10.0, 10.0),
            ],
        };
        map.load_buildings(&[square]);
        assert_eq!(map.get_cell(Point::new(0.0, 0.0)), TerrainType::Building);
        assert_eq!(map.get_cell(Point::new(40.0, 40.0)), TerrainType::Open);
    }

    #[test]
    fn test_speed_modifier_flying_ignores_terrain() {
        let mut map = TerrainMap::new(50.0, 2.0);
        map.set_cell(Point::new(0.0, 0.0), TerrainType::Building);
        assert_eq!(map.get_speed_modifier(Point::new(0.0, 0.0), AssetType::Drone), 1.0);
        assert_eq!(map.get_speed_modifier(Point::new(0.0, 0.0), AssetType::Rover), 0.0);
    }

    #[test]
    fn test_person_in_yard_penalty() {
        let mut map = TerrainMap::new(50.0, 2.0);
        map.set_cell(Point::new(0.0, 0.0), TerrainType::Yard);
        let modifier = map.get_speed_modifier(Point::new(0.0, 0.0), AssetType::Person);
        assert!((modifier - 0.9).abs() < 1e-9);
    }
}

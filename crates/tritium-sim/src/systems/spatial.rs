//! Uniform-grid spatial index for proximity queries over unit
//! positions, rebuilt from scratch once per tick.

use std::collections::HashMap;

use tritium_core::constants::SPATIAL_CELL_SIZE;
use tritium_core::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellKey(i64, i64);

fn cell_key(p: Point) -> CellKey {
    CellKey(
        (p.x / SPATIAL_CELL_SIZE).floor() as i64,
        (p.y / SPATIAL_CELL_SIZE).floor() as i64,
    )
}

/// A dict-of-buckets grid rebuilt every tick; `query_radius` visits
/// only the touched cells, then filters by exact distance.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    cells: HashMap<CellKey, Vec<(String, Point)>>,
}

impl SpatialGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild<'a>(&mut self, entries: impl IntoIterator<Item = (&'a str, Point)>) {
        self.cells.clear();
        for (id, pos) in entries {
            self.cells.entry(cell_key(pos)).or_default().push((id.to_string(), pos));
        }
    }

    pub fn query_radius(&self, center: Point, radius: f64) -> Vec<(String, Point)> {
        let radius_sq = radius * radius;
        let span = (radius / SPATIAL_CELL_SIZE).ceil() as i64;
        let base = cell_key(center);
        let mut out = Vec::new();
        for dx in -span..=span {
            for dy in -span..=span {
                if let Some(bucket) = self.cells.get(&CellKey(base.0 + dx, base.1 + dy)) {
                    for (id, pos) in bucket {
                        if center.distance_squared(*pos) <= radius_sq {
                            out.push((id.clone(), *pos));
                        }
                    }
                }
            }
        }
        out
    }

    pub fn query_rect(&self, min: Point, max: Point) -> Vec<(String, Point)> {
        let min_cell = cell_key(min);
        let max_cell = cell_key(max);
        let mut out = Vec::new();
        for cx in min_cell.0..=max_cell.0 {
            for cy in min_cell.1..=max_cell.1 {
                if let Some(bucket) = self.cells.get(&CellKey(cx, cy)) {
                    for (id, pos) in bucket {
                        if pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y {
                            out.push((id.clone(), *pos));
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_radius_finds_nearby_only() {
        let mut grid = SpatialGrid::new();
        grid.rebuild(vec![("near", Point::new(5.0, 0.0)), ("far", Point::new(500.0, 0.0))]);
        let results = grid.query_radius(Point::ZERO, 50.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "near");
    }

    #[test]
    fn test_query_radius_spans_multiple_cells() {
        let mut grid = SpatialGrid::new();
        grid.rebuild(vec![("a", Point::new(-40.0, 0.0)), ("b", Point::new(40.0, 0.0))]);
        let results = grid.query_radius(Point::ZERO, 45.0);
        assert_eq!(results.len(), 2);
    }
}

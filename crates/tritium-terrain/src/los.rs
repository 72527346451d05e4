//! Line-of-sight: blocked iff any grid cell the straight path crosses
//! is a building.

use tritium_core::enums::TerrainType;
use tritium_core::types::Point;

use crate::grid::TerrainMap;

/// Walks the Bresenham line between the two endpoints' grid cells.
/// Endpoints are ordered canonically first so `los(a, b)` and
/// `los(b, a)` traverse the identical cell set.
pub fn has_line_of_sight(map: &TerrainMap, from: Point, to: Point) -> bool {
    let a = map.world_to_grid_raw(from);
    let b = map.world_to_grid_raw(to);
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    !bresenham_cells(start, end)
        .into_iter()
        .any(|(row, col)| map.cell_at(row, col) == TerrainType::Building)
}

fn bresenham_cells(start: (i64, i64), end: (i64, i64)) -> Vec<(i64, i64)> {
    let (mut row, mut col) = start;
    let (end_row, end_col) = end;
    let d_row = (end_row - row).abs();
    let d_col = (end_col - col).abs();
    let step_row = if end_row > row { 1 } else { -1 };
    let step_col = if end_col > col { 1 } else { -1 };
    let mut error = d_col - d_row;

    let mut cells = Vec::with_capacity((d_row + d_col) as usize + 1);
    loop {
        cells.push((row, col));
        if row == end_row && col == end_col {
            break;
        }
        let doubled = 2 * error;
        if doubled > -d_row {
            error -= d_row;
            col += step_col;
        }
        if doubled < d_col {
            error += d_col;
            row += step_row;
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Building, TerrainMap};

    fn map_with_square() -> TerrainMap {
        let mut map = TerrainMap::new(100.0, 5.0);
        map.load_buildings(&[Building {
            vertices: vec![
                Point::new(-5.0, -5.0),
                Point::new(5.0, -5.0),
                Point::new(5.0, 5.0),
                Point::new(-5.0, 5.0),
            ],
        }]);
        map
    }

    #[test]
    fn test_los_clear_open_field() {
        let map = TerrainMap::new(100.0, 5.0);
        assert!(has_line_of_sight(&map, Point::new(-40.0, 0.0), Point::new(40.0, 0.0)));
    }

    #[test]
    fn test_los_blocked_by_building() {
        let map = map_with_square();
        assert!(!has_line_of_sight(&map, Point::new(-40.0, 0.0), Point::new(40.0, 0.0)));
    }

    #[test]
    fn test_los_clear_around_building() {
        let map = map_with_square();
        assert!(has_line_of_sight(&map, Point::new(-40.0, 50.0), Point::new(40.0, 50.0)));
    }

    #[test]
    fn test_los_symmetric() {
        let map = map_with_square();
        let pairs = [
            (Point::new(-40.0, 0.0), Point::new(40.0, 0.0)),
            (Point::new(-37.0, 13.0), Point::new(41.0, -8.0)),
            (Point::new(-40.0, 50.0), Point::new(40.0, 50.0)),
            (Point::new(3.0, -60.0), Point::new(-2.0, 60.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(has_line_of_sight(&map, a, b), has_line_of_sight(&map, b, a), "{a:?} <-> {b:?}");
        }
    }
}

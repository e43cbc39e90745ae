//! Sparse hash grid for efficient spatial queries
//!
//! Built once from a batch of entries and then read-only. Moved entities are
//! picked up by the next rebuild rather than by incremental updates.

use ahash::AHashMap;
use crate::core::types::Vec2;

/// Anything with a position on the ground plane
pub trait Positioned {
    fn ground_position(&self) -> Vec2;
}

/// Uniform grid index over entries of type `T`
#[derive(Debug, Clone)]
pub struct SpatialHash<T> {
    cell_size: f32,
    entries: Vec<T>,
    cells: AHashMap<(i32, i32), Vec<usize>>,
}

impl<T: Positioned> SpatialHash<T> {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: if cell_size > 0.0 { cell_size } else { 1.0 },
            entries: Vec::new(),
            cells: AHashMap::new(),
        }
    }

    /// Build in O(n). Entries with non-finite positions are dropped.
    pub fn build(cell_size: f32, entries: impl IntoIterator<Item = T>) -> Self {
        let mut grid = Self::new(cell_size);
        grid.rebuild(entries);
        grid
    }

    /// Floor-based quantization: an entry on a boundary belongs to exactly one cell
    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cells.clear();
    }

    /// Replace the contents wholesale
    pub fn rebuild(&mut self, entries: impl IntoIterator<Item = T>) {
        self.clear();
        for entry in entries {
            let pos = entry.ground_position();
            if !pos.is_finite() {
                continue;
            }
            let coord = self.cell_coord(pos);
            let idx = self.entries.len();
            self.entries.push(entry);
            self.cells.entry(coord).or_default().push(idx);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter()
    }

    /// Cell range covering the query square, padded against rounding at cell edges
    fn cell_range(&self, center: Vec2, radius: f32) -> ((i32, i32), (i32, i32)) {
        let reach = radius + radius * 1e-4 + 1e-3;
        let min = self.cell_coord(Vec2::new(center.x - reach, center.y - reach));
        let max = self.cell_coord(Vec2::new(center.x + reach, center.y + reach));
        (min, max)
    }

    /// Broad phase: every entry in the occupied cells overlapping the query square.
    ///
    /// A square wider than the occupied set walks the occupied cells instead of the
    /// coordinate range, so the cost tracks occupied cells, never empty ones.
    fn candidates<'a>(&'a self, center: Vec2, radius: f32) -> Box<dyn Iterator<Item = &'a T> + 'a> {
        let ((min_x, min_y), (max_x, max_y)) = self.cell_range(center, radius);
        let span = (max_x as i64 - min_x as i64 + 1) * (max_y as i64 - min_y as i64 + 1);

        if span > self.cells.len() as i64 {
            return Box::new(
                self.cells
                    .iter()
                    .filter(move |(coord, _)| {
                        let (cx, cy) = **coord;
                        (min_x..=max_x).contains(&cx) && (min_y..=max_y).contains(&cy)
                    })
                    .flat_map(move |(_, slots)| slots.iter().map(move |&idx| &self.entries[idx])),
            );
        }

        Box::new((min_x..=max_x).flat_map(move |cx| {
            (min_y..=max_y).flat_map(move |cy| {
                self.cells
                    .get(&(cx, cy))
                    .into_iter()
                    .flatten()
                    .map(move |&idx| &self.entries[idx])
            })
        }))
    }

    /// Number of entries the broad phase hands to the exact distance check
    pub fn candidate_count(&self, center: Vec2, radius: f32) -> usize {
        if !self.accepts_query(center, radius) {
            return 0;
        }
        self.candidates(center, radius).count()
    }

    fn accepts_query(&self, center: Vec2, radius: f32) -> bool {
        !self.entries.is_empty() && center.is_finite() && radius >= 0.0 && radius.is_finite()
    }

    /// Query entries within radius (inclusive), broad phase then exact distance
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<&T> {
        if !self.accepts_query(center, radius) {
            return Vec::new();
        }
        let radius_sq = radius * radius;
        self.candidates(center, radius)
            .filter(|entry| entry.ground_position().distance_squared(&center) <= radius_sq)
            .collect()
    }

    /// Closest entry within radius, if any
    pub fn nearest(&self, center: Vec2, radius: f32) -> Option<&T> {
        self.query_radius(center, radius).into_iter().min_by(|a, b| {
            let da = a.ground_position().distance_squared(&center);
            let db = b.ground_position().distance_squared(&center);
            da.total_cmp(&db)
        })
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

impl<T: Positioned> Default for SpatialHash<T> {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Point(u32, Vec2);

    impl Positioned for Point {
        fn ground_position(&self) -> Vec2 {
            self.1
        }
    }

    fn ids(results: Vec<&Point>) -> Vec<u32> {
        let mut ids: Vec<u32> = results.into_iter().map(|p| p.0).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let grid: SpatialHash<Point> = SpatialHash::new(4.0);
        assert!(grid.query_radius(Vec2::new(0.0, 0.0), 100.0).is_empty());
        assert!(grid.nearest(Vec2::new(0.0, 0.0), 100.0).is_none());
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let points = [2.0, 4.9, 5.0, 5.1, 10.0]
            .iter()
            .enumerate()
            .map(|(i, &d)| Point(i as u32, Vec2::new(d, 0.0)));
        let grid = SpatialHash::build(4.0, points);
        assert_eq!(ids(grid.query_radius(Vec2::new(0.0, 0.0), 5.0)), vec![0, 1, 2]);
    }

    #[test]
    fn test_boundary_entry_lands_in_one_cell() {
        let grid = SpatialHash::build(4.0, [Point(1, Vec2::new(4.0, 8.0))]);
        assert_eq!(grid.occupied_cells(), 1);
        assert_eq!(ids(grid.query_radius(Vec2::new(4.0, 8.0), 0.0)), vec![1]);
    }

    #[test]
    fn test_negative_coordinates_and_multi_cell_span() {
        let points = vec![
            Point(1, Vec2::new(-3.5, -3.5)),
            Point(2, Vec2::new(-0.1, 0.1)),
            Point(3, Vec2::new(7.9, -7.9)),
            Point(4, Vec2::new(30.0, 30.0)),
        ];
        let grid = SpatialHash::build(2.0, points);
        assert_eq!(ids(grid.query_radius(Vec2::new(0.0, 0.0), 12.0)), vec![1, 2, 3]);
    }

    #[test]
    fn test_nan_entries_and_bad_queries_are_ignored() {
        let grid = SpatialHash::build(
            4.0,
            [Point(1, Vec2::new(f32::NAN, 0.0)), Point(2, Vec2::new(1.0, 1.0))],
        );
        assert_eq!(grid.len(), 1);
        assert!(grid.query_radius(Vec2::new(0.0, 0.0), -1.0).is_empty());
        assert!(grid.query_radius(Vec2::new(f32::NAN, 0.0), 5.0).is_empty());
    }

    #[test]
    fn test_wide_query_only_visits_cells_in_range() {
        // A dense crowd far from the query must not be scanned
        let mut points: Vec<Point> = (0..1000)
            .map(|i| Point(i, Vec2::new(1.0 + (i % 3) as f32 * 0.5, 1.0)))
            .collect();
        points.push(Point(2000, Vec2::new(400.0, 400.0)));
        points.push(Point(2001, Vec2::new(404.5, 400.0)));
        points.push(Point(2002, Vec2::new(400.0, 404.5)));
        let grid = SpatialHash::build(4.0, points);
        assert!(grid.occupied_cells() < 10);

        let center = Vec2::new(401.0, 401.0);
        assert_eq!(grid.candidate_count(center, 20.0), 3);
        assert_eq!(ids(grid.query_radius(center, 20.0)), vec![2000, 2001, 2002]);
    }

    #[test]
    fn test_narrow_query_counts_only_its_cells() {
        let points = (0..50).map(|i| Point(i, Vec2::new(i as f32 * 4.0 + 1.0, 1.0)));
        let grid = SpatialHash::build(4.0, points);
        // Radius 1 around x=41 touches cells 9..=10 on x and 0 on y
        assert!(grid.candidate_count(Vec2::new(41.0, 1.0), 1.0) <= 2);
        assert_eq!(grid.candidate_count(Vec2::new(f32::NAN, 1.0), 1.0), 0);
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut grid = SpatialHash::build(4.0, [Point(1, Vec2::new(0.0, 0.0))]);
        grid.rebuild([Point(2, Vec2::new(50.0, 50.0))]);
        assert!(grid.query_radius(Vec2::new(0.0, 0.0), 5.0).is_empty());
        assert_eq!(grid.nearest(Vec2::new(49.0, 49.0), 5.0).map(|p| p.0), Some(2));
    }
}

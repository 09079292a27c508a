//! A city's immutable source data: the grid of map points and the travel
//! times between them.

use crate::error::{GridError, LoadError};
use glam::Vec2;
use log::{debug, info, warn};
use petgraph::algo::floyd_warshall;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One cell of a city's grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridEntry {
    /// Normalized geographic position on the map, in `[0, 1]`.
    pub x: f32,
    pub y: f32,
    /// Texture coordinates into the city's map image.
    pub uv_x: f32,
    pub uv_y: f32,
    /// Linear index of the cell, `y * size + x`.
    pub index: usize,
}

impl GridEntry {
    #[inline(always)]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.uv_x.is_finite() && self.uv_y.is_finite()
    }
}

/// A sparse route measurement between two grid points.
///
/// `duration` is written the way routing services report it, e.g. `"123s"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub origin_index: usize,
    pub destination_index: usize,
    pub duration: String,
}

impl RouteEntry {
    /// Duration in seconds, or `None` if the string is not `<number>s`.
    pub fn seconds(&self) -> Option<f32> {
        let secs: f32 = self.duration.trim().strip_suffix('s')?.parse().ok()?;
        (secs.is_finite() && secs >= 0.0).then_some(secs)
    }
}

/// Square matrix of travel times in seconds between grid points.
///
/// `None` marks a pair for which no travel time is known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TravelTimes(pub Vec<Vec<Option<f32>>>);

impl TravelTimes {
    /// Number of grid points the matrix covers.
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Travel time from `from` to `to`, if known and usable.
    ///
    /// NaN, infinite and negative entries read as unknown.
    pub fn get(&self, from: usize, to: usize) -> Option<f32> {
        let t = (*self.0.get(from)?.get(to)?)?;
        (t.is_finite() && t >= 0.0).then_some(t)
    }

    /// Builds a dense matrix from sparse route measurements.
    ///
    /// Routes are taken as symmetric. Missing pairs are filled in with the
    /// shortest chain of measured routes; pairs with no chain stay unknown.
    pub fn from_routes(count: usize, routes: &[RouteEntry]) -> Result<Self, GridError> {
        let mut graph = UnGraph::<(), f32>::with_capacity(count, routes.len());
        let nodes: Vec<NodeIndex> = (0..count).map(|_| graph.add_node(())).collect();

        let mut skipped = 0;
        for route in routes {
            if route.origin_index >= count || route.destination_index >= count {
                return Err(GridError::RouteOutOfRange {
                    origin: route.origin_index,
                    destination: route.destination_index,
                    count,
                });
            }
            let Some(seconds) = route.seconds() else {
                skipped += 1;
                continue;
            };
            graph.add_edge(
                nodes[route.origin_index],
                nodes[route.destination_index],
                seconds,
            );
        }
        if skipped > 0 {
            warn!("Skipped {skipped} routes with unreadable durations");
        }

        let mut matrix = vec![vec![None; count]; count];
        // Edge weights are never negative, so no negative cycle can exist.
        // Unreachable pairs come back as `f32::MAX`.
        if let Ok(distances) = floyd_warshall(&graph, |edge| *edge.weight()) {
            for ((a, b), seconds) in distances {
                if !seconds.is_finite() || seconds >= f32::MAX {
                    continue;
                }
                let (a, b) = (a.index(), b.index());
                for (from, to) in [(a, b), (b, a)] {
                    let cell = &mut matrix[from][to];
                    *cell = Some(cell.map_or(seconds, |t: f32| t.min(seconds)));
                }
            }
        }

        let unknown = matrix.iter().flatten().filter(|t| t.is_none()).count();
        if unknown > 0 {
            warn!("{unknown} travel-time pairs remain unreachable after densification");
        }
        debug!(
            "Densified {} routes into a {count}x{count} travel-time matrix",
            routes.len()
        );
        Ok(Self(matrix))
    }
}

/// A city's grid of map points and the travel times between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    /// Number of rows and columns.
    pub size: usize,
    /// `size` rows of `size` entries each.
    pub grid: Vec<Vec<GridEntry>>,
    pub travel_times: TravelTimes,
    /// Reference to the city's map image, handed through to the renderer.
    #[serde(default)]
    pub map_image: Option<String>,
}

/// On-disk form that may carry sparse routes instead of a dense matrix.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGridData {
    size: usize,
    grid: Vec<Vec<GridEntry>>,
    #[serde(default)]
    travel_times: Option<TravelTimes>,
    #[serde(default)]
    route_matrix: Option<Vec<RouteEntry>>,
    #[serde(default)]
    map_image: Option<String>,
}

impl GridData {
    /// Builds grid data and checks it for consistency.
    pub fn new(
        size: usize,
        grid: Vec<Vec<GridEntry>>,
        travel_times: TravelTimes,
    ) -> Result<Self, GridError> {
        let data = Self {
            size,
            grid,
            travel_times,
            map_image: None,
        };
        data.validate()?;
        Ok(data)
    }

    /// A regular `size`x`size` grid spanning `[0, 1]` with matching texture
    /// coordinates.
    pub fn regular(size: usize, travel_times: TravelTimes) -> Result<Self, GridError> {
        Self::new(size, regular_entries(size, 0.0, 1.0), travel_times)
    }

    /// Number of grid points.
    pub fn point_count(&self) -> usize {
        self.size.saturating_mul(self.size)
    }

    /// Entries in linear index order.
    pub fn entries(&self) -> impl Iterator<Item = &GridEntry> {
        self.grid.iter().flatten()
    }

    /// Checks every invariant of a city's grid data.
    pub fn validate(&self) -> Result<(), GridError> {
        let count = check_grid(self.size, &self.grid)?;
        if self.travel_times.dimension() != count {
            return Err(GridError::MatrixDimension {
                expected: count,
                found: self.travel_times.dimension(),
            });
        }
        for (row, columns) in self.travel_times.0.iter().enumerate() {
            if columns.len() != count {
                return Err(GridError::MatrixNotSquare {
                    row,
                    expected: count,
                    found: columns.len(),
                });
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let raw: RawGridData = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let raw: RawGridData = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    fn from_raw(raw: RawGridData) -> Result<Self, LoadError> {
        // The matrix is sized from `size`, so the grid must vouch for it first.
        let count = check_grid(raw.size, &raw.grid)?;
        let travel_times = match (raw.travel_times, raw.route_matrix) {
            (Some(dense), _) => dense,
            (None, Some(routes)) => TravelTimes::from_routes(count, &routes)?,
            (None, None) => {
                warn!("Grid data carries no travel times; only anchors will be built");
                TravelTimes(vec![vec![None; count]; count])
            }
        };
        let data = Self {
            size: raw.size,
            grid: raw.grid,
            travel_times,
            map_image: raw.map_image,
        };
        data.validate()?;
        info!("Loaded {0}x{0} grid data", data.size);
        Ok(data)
    }
}

/// Checks the shape, indices and coordinates of a grid's rows and returns
/// its point count.
fn check_grid(size: usize, grid: &[Vec<GridEntry>]) -> Result<usize, GridError> {
    if size < 2 {
        return Err(GridError::Degenerate(size));
    }
    if grid.len() != size {
        return Err(GridError::RowCount {
            expected: size,
            found: grid.len(),
        });
    }
    for (y, row) in grid.iter().enumerate() {
        if row.len() != size {
            return Err(GridError::RowLength {
                row: y,
                expected: size,
                found: row.len(),
            });
        }
        for (x, entry) in row.iter().enumerate() {
            let expected = y * size + x;
            if entry.index != expected {
                return Err(GridError::IndexMismatch {
                    x,
                    y,
                    expected,
                    found: entry.index,
                });
            }
            if !entry.is_finite() {
                return Err(GridError::NonFinite(expected));
            }
        }
    }
    size.checked_mul(size).ok_or(GridError::TooLarge(size))
}

/// Entries of a regular grid spanning `[lo, hi]` on both axes.
pub fn regular_entries(size: usize, lo: f32, hi: f32) -> Vec<Vec<GridEntry>> {
    let step = if size > 1 {
        (hi - lo) / (size - 1) as f32
    } else {
        0.0
    };
    let uv_step = if size > 1 { 1.0 / (size - 1) as f32 } else { 0.0 };
    (0..size)
        .map(|y| {
            (0..size)
                .map(|x| GridEntry {
                    x: lo + x as f32 * step,
                    y: lo + y as f32 * step,
                    uv_x: x as f32 * uv_step,
                    uv_y: y as f32 * uv_step,
                    index: y * size + x,
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_times(count: usize) -> TravelTimes {
        TravelTimes(vec![vec![None; count]; count])
    }

    #[test]
    fn regular_grid_is_valid() {
        let data = GridData::regular(4, empty_times(16)).unwrap();
        assert_eq!(data.point_count(), 16);
        let last = data.grid[3][3];
        assert_eq!(last.index, 15);
        assert_eq!(last.position(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn degenerate_size_is_rejected() {
        let err = GridData::regular(1, empty_times(1)).unwrap_err();
        assert_eq!(err, GridError::Degenerate(1));
    }

    #[test]
    fn mismatched_matrix_is_rejected() {
        let err = GridData::regular(3, empty_times(4)).unwrap_err();
        assert_eq!(
            err,
            GridError::MatrixDimension {
                expected: 9,
                found: 4
            }
        );

        let mut times = empty_times(9);
        times.0[2].pop();
        let err = GridData::regular(3, times).unwrap_err();
        assert_eq!(
            err,
            GridError::MatrixNotSquare {
                row: 2,
                expected: 9,
                found: 8
            }
        );
    }

    #[test]
    fn non_finite_entry_is_rejected() {
        let mut grid = regular_entries(2, 0.0, 1.0);
        grid[1][0].x = f32::NAN;
        let err = GridData::new(2, grid, empty_times(4)).unwrap_err();
        assert_eq!(err, GridError::NonFinite(2));
    }

    #[test]
    fn shuffled_index_is_rejected() {
        let mut grid = regular_entries(2, 0.0, 1.0);
        grid[0][1].index = 3;
        let err = GridData::new(2, grid, empty_times(4)).unwrap_err();
        assert!(matches!(err, GridError::IndexMismatch { x: 1, y: 0, .. }));
    }

    #[test]
    fn unusable_times_read_as_unknown() {
        let times = TravelTimes(vec![
            vec![Some(0.0), Some(f32::NAN)],
            vec![Some(-3.0), Some(12.0)],
        ]);
        assert_eq!(times.get(0, 0), Some(0.0));
        assert_eq!(times.get(0, 1), None);
        assert_eq!(times.get(1, 0), None);
        assert_eq!(times.get(1, 1), Some(12.0));
        assert_eq!(times.get(5, 0), None);
    }

    #[test]
    fn route_durations_parse() {
        let route = |duration: &str| RouteEntry {
            origin_index: 0,
            destination_index: 1,
            duration: duration.to_string(),
        };
        assert_eq!(route("123s").seconds(), Some(123.0));
        assert_eq!(route("12.5s").seconds(), Some(12.5));
        assert_eq!(route("123").seconds(), None);
        assert_eq!(route("-4s").seconds(), None);
    }

    #[test]
    fn routes_densify_through_shortest_chains() {
        let route = |a, b, d: &str| RouteEntry {
            origin_index: a,
            destination_index: b,
            duration: d.to_string(),
        };
        // 0 - 1 - 2 chain, 3 isolated, plus a slow direct 0 - 2 route.
        let routes = vec![route(0, 1, "10s"), route(1, 2, "15s"), route(0, 2, "60s")];
        let times = TravelTimes::from_routes(4, &routes).unwrap();

        assert_eq!(times.get(0, 0), Some(0.0));
        assert_eq!(times.get(1, 0), Some(10.0));
        assert_eq!(times.get(0, 2), Some(25.0));
        assert_eq!(times.get(2, 0), Some(25.0));
        assert_eq!(times.get(0, 3), None);
    }

    #[test]
    fn out_of_range_route_is_rejected() {
        let routes = vec![RouteEntry {
            origin_index: 0,
            destination_index: 7,
            duration: "5s".to_string(),
        }];
        assert!(matches!(
            TravelTimes::from_routes(4, &routes),
            Err(GridError::RouteOutOfRange { destination: 7, .. })
        ));
    }

    #[test]
    fn loads_from_json_with_dense_matrix() {
        let json = r#"{
            "size": 2,
            "grid": [
                [{"x": 0.0, "y": 0.0, "uvX": 0.0, "uvY": 0.0, "index": 0},
                 {"x": 1.0, "y": 0.0, "uvX": 1.0, "uvY": 0.0, "index": 1}],
                [{"x": 0.0, "y": 1.0, "uvX": 0.0, "uvY": 1.0, "index": 2},
                 {"x": 1.0, "y": 1.0, "uvX": 1.0, "uvY": 1.0, "index": 3}]
            ],
            "travelTimes": [
                [0, 30, null, null],
                [30, 0, null, null],
                [null, null, 0, 5],
                [null, null, 5, 0]
            ],
            "mapImage": "map.png"
        }"#;
        let data = GridData::from_json_str(json).unwrap();
        assert_eq!(data.size, 2);
        assert_eq!(data.travel_times.get(0, 1), Some(30.0));
        assert_eq!(data.travel_times.get(0, 2), None);
        assert_eq!(data.map_image.as_deref(), Some("map.png"));
    }

    #[test]
    fn loads_from_json_with_sparse_routes() {
        let json = r#"{
            "size": 2,
            "grid": [
                [{"x": 0.0, "y": 0.0, "uvX": 0.0, "uvY": 0.0, "index": 0},
                 {"x": 1.0, "y": 0.0, "uvX": 1.0, "uvY": 0.0, "index": 1}],
                [{"x": 0.0, "y": 1.0, "uvX": 0.0, "uvY": 1.0, "index": 2},
                 {"x": 1.0, "y": 1.0, "uvX": 1.0, "uvY": 1.0, "index": 3}]
            ],
            "routeMatrix": [
                {"originIndex": 0, "destinationIndex": 1, "duration": "20s"},
                {"originIndex": 1, "destinationIndex": 3, "duration": "20s"}
            ]
        }"#;
        let data = GridData::from_json_str(json).unwrap();
        assert_eq!(data.travel_times.get(0, 3), Some(40.0));
        assert_eq!(data.travel_times.get(0, 2), None);
    }

    #[test]
    fn oversized_json_grid_is_rejected_before_allocating() {
        let entry = r#"{"x": 0, "y": 0, "uvX": 0, "uvY": 0, "index": 0}"#;
        for size in ["4294967296", "18446744073709551615", "200000"] {
            let json = format!(r#"{{"size": {size}, "grid": [[{entry}]]}}"#);
            let routes = format!(
                r#"{{"size": {size}, "grid": [[{entry}]], "routeMatrix": []}}"#
            );
            for doc in [json, routes] {
                assert!(matches!(
                    GridData::from_json_str(&doc),
                    Err(LoadError::Grid(GridError::RowCount { found: 1, .. }))
                ));
            }
        }
    }

    #[test]
    fn ragged_json_grid_is_rejected_before_densifying() {
        let json = r#"{
            "size": 2,
            "grid": [
                [{"x": 0, "y": 0, "uvX": 0, "uvY": 0, "index": 0}],
                [{"x": 0, "y": 1, "uvX": 0, "uvY": 1, "index": 2},
                 {"x": 1, "y": 1, "uvX": 1, "uvY": 1, "index": 3}]
            ],
            "routeMatrix": [{"originIndex": 0, "destinationIndex": 3, "duration": "5s"}]
        }"#;
        assert!(matches!(
            GridData::from_json_str(json),
            Err(LoadError::Grid(GridError::RowLength { row: 0, .. }))
        ));
    }

    #[test]
    fn invalid_json_grid_surfaces_grid_error() {
        let json = r#"{"size": 1, "grid": [[{"x": 0, "y": 0, "uvX": 0, "uvY": 0, "index": 0}]]}"#;
        assert!(matches!(
            GridData::from_json_str(json),
            Err(LoadError::Grid(GridError::Degenerate(1)))
        ));
    }
}

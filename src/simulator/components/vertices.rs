//! Components which make up a vertex

use crate::grid_data::GridData;
use glam::Vec2;

/// The state of one simulated map point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VertexPosition {
    /// Position in normalized map coordinates.
    pub position: Vec2,
    /// A pinned vertex never moves. It only serves as an anchor target.
    pub pinned: bool,
}

impl VertexPosition {
    #[inline(always)]
    pub const fn movable(position: Vec2) -> Self {
        Self {
            position,
            pinned: false,
        }
    }

    #[inline(always)]
    pub const fn pinned(position: Vec2) -> Self {
        Self {
            position,
            pinned: true,
        }
    }

    #[inline(always)]
    pub fn x(&self) -> f32 {
        self.position.x
    }

    #[inline(always)]
    pub fn y(&self) -> f32 {
        self.position.y
    }
}

/// The geographic layout of a city: `N` movable vertices followed by their
/// `N` pinned twins at the same coordinates.
pub fn initial_positions(data: &GridData) -> Vec<VertexPosition> {
    let movable = data
        .entries()
        .map(|entry| VertexPosition::movable(entry.position()));
    let pinned = data
        .entries()
        .map(|entry| VertexPosition::pinned(entry.position()));
    movable.chain(pinned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_data::TravelTimes;

    #[test]
    fn movable_half_precedes_pinned_twins() {
        let data = GridData::regular(3, TravelTimes(vec![vec![None; 9]; 9])).unwrap();
        let positions = initial_positions(&data);
        assert_eq!(positions.len(), 18);
        for i in 0..9 {
            assert!(!positions[i].pinned);
            assert!(positions[i + 9].pinned);
            assert_eq!(positions[i].position, positions[i + 9].position);
        }
        assert_eq!(positions[5].x(), 1.0);
        assert_eq!(positions[5].y(), 0.5);
    }
}

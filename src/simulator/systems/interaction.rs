//! Local focus distortion around the vertex under the pointer.
//!
//! The grabbed vertex acts as a temporary anchor: its neighbours are pulled
//! towards their full travel-time distance from it, whatever the global
//! timeness. Only springs touching the grabbed vertex are visited.

use crate::simulator::{
    components::{springs::SpringNetwork, vertices::VertexPosition},
    ressources::simulator_vars::{FocusConfig, HoverPoint, MaxTimeness, Timeness},
    systems::{
        force_compute::{effective_rest_length, spring_force},
        location_detect::closest_movable_vertex,
    },
};
use glam::Vec2;
use log::trace;

/// Extra force on the neighbours of the grabbed vertex for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusField {
    /// The vertex closest to the hover point.
    pub center: usize,
    /// `(vertex, force, stiffness)`, sorted by vertex.
    forces: Vec<(u32, Vec2, f32)>,
}

impl FocusField {
    /// Builds the field for `hover`, or `None` if the hover point is not
    /// within `config.hover_radius` of any movable vertex.
    pub fn new(
        positions: &[VertexPosition],
        network: &SpringNetwork,
        hover: HoverPoint,
        max_timeness: MaxTimeness,
        config: &FocusConfig,
    ) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let (center, dist) = closest_movable_vertex(positions, hover.0)?;
        if dist > config.hover_radius {
            return None;
        }
        let center_pos = positions[center].position;

        let mut forces: Vec<(u32, Vec2, f32)> = Vec::new();
        for spring in network.incident(center) {
            if spring.is_anchor {
                continue;
            }
            let neighbour = spring.other(center as u32);
            let Some(vertex) = positions.get(neighbour as usize) else {
                continue;
            };
            if vertex.pinned || vertex.position.distance(center_pos) > config.focus_radius {
                continue;
            }
            let rest_length = effective_rest_length(spring, Timeness(1.0), max_timeness);
            let strength = spring.strength * config.strength;
            let force = spring_force(vertex.position, center_pos, rest_length, strength);
            forces.push((neighbour, force, strength));
        }
        forces.sort_by_key(|(vertex, _, _)| *vertex);
        forces.dedup_by(|next, kept| {
            if next.0 == kept.0 {
                kept.1 += next.1;
                kept.2 += next.2;
                true
            } else {
                false
            }
        });

        trace!(
            "Focus on vertex {center} affects {} neighbours",
            forces.len()
        );
        Some(Self { center, forces })
    }

    /// Extra force and stiffness on `vertex`, if it is in the neighbourhood.
    pub fn force_on(&self, vertex: usize) -> Option<(Vec2, f32)> {
        let i = self
            .forces
            .binary_search_by_key(&(vertex as u32), |(v, _, _)| *v)
            .ok()?;
        let (_, force, stiffness) = self.forces[i];
        Some((force, stiffness))
    }

    /// Number of vertices the focus moves.
    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::components::springs::Spring;

    fn setup() -> (Vec<VertexPosition>, SpringNetwork) {
        let positions = vec![
            VertexPosition::movable(Vec2::new(0.5, 0.5)),
            VertexPosition::movable(Vec2::new(0.6, 0.5)),
            VertexPosition::movable(Vec2::new(0.9, 0.5)),
            VertexPosition::pinned(Vec2::new(0.5, 0.5)),
            VertexPosition::pinned(Vec2::new(0.6, 0.5)),
            VertexPosition::pinned(Vec2::new(0.9, 0.5)),
        ];
        let springs = vec![
            Spring::anchor(0, 3, 1.0),
            Spring::anchor(1, 4, 1.0),
            Spring::anchor(2, 5, 1.0),
            Spring::timed(0, 1, 0.1, 0.2, 1.0),
            Spring::timed(0, 2, 0.4, 0.1, 1.0),
        ];
        let network = SpringNetwork::new(springs, &positions).unwrap();
        (positions, network)
    }

    fn hover(x: f32, y: f32) -> HoverPoint {
        HoverPoint::new(Vec2::new(x, y)).unwrap()
    }

    #[test]
    fn focus_pushes_slow_neighbours_away() {
        let (positions, network) = setup();
        let config = FocusConfig::default();
        let field =
            FocusField::new(&positions, &network, hover(0.51, 0.5), MaxTimeness(1.0), &config)
                .unwrap();

        assert_eq!(field.center, 0);
        // Vertex 2 lies outside the focus radius.
        assert_eq!(field.len(), 1);
        let (force, stiffness) = field.force_on(1).unwrap();
        assert!(force.x > 0.0);
        assert_eq!(stiffness, 2.0);
        assert_eq!(field.force_on(2), None);
        assert_eq!(field.force_on(0), None);
    }

    #[test]
    fn far_hover_grabs_nothing() {
        let (positions, network) = setup();
        let config = FocusConfig::default();
        assert!(
            FocusField::new(&positions, &network, hover(0.1, 0.9), MaxTimeness(1.0), &config)
                .is_none()
        );
    }

    #[test]
    fn disabled_focus_grabs_nothing() {
        let (positions, network) = setup();
        let config = FocusConfig {
            enabled: false,
            ..FocusConfig::default()
        };
        assert!(
            FocusField::new(&positions, &network, hover(0.5, 0.5), MaxTimeness(1.0), &config)
                .is_none()
        );
    }
}

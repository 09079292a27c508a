use crate::simulator::{
    components::{springs::Spring, springs::SpringNetwork, vertices::VertexPosition},
    ressources::simulator_vars::{MaxTimeness, Timeness},
};
use glam::Vec2;

/// Below this distance two vertices are treated as coincident.
pub const MIN_DISTANCE: f32 = 1e-9;

/// The rest length a spring pulls towards at the given blend.
///
/// Anchors always want length `0`. Other springs move linearly from their
/// geographic length to their travel-time length; `max_timeness` scales how
/// far along that line `timeness = 1` reaches.
#[inline(always)]
pub fn effective_rest_length(spring: &Spring, timeness: Timeness, max_timeness: MaxTimeness) -> f32 {
    if spring.is_anchor {
        return 0.0;
    }
    let blend = (timeness.0 * max_timeness.0).clamp(0.0, 1.0);
    spring.geo_length + (spring.length - spring.geo_length) * blend
}

/// Scalar Hooke force between two points.
///
/// Positive pulls the points together, negative pushes them apart.
#[inline(always)]
pub fn hooke_force(pos1: Vec2, pos2: Vec2, rest_length: f32, strength: f32) -> f32 {
    strength * (pos1.distance(pos2) - rest_length)
}

/// Force a spring exerts on the vertex at `pos1`, its other end at `pos2`.
///
/// Coincident endpoints have no direction and exert no force.
#[inline(always)]
pub fn spring_force(pos1: Vec2, pos2: Vec2, rest_length: f32, strength: f32) -> Vec2 {
    let dir_vec = pos2 - pos1;
    let length = dir_vec.length();
    if length <= MIN_DISTANCE {
        return Vec2::ZERO;
    }
    dir_vec / length * strength * (length - rest_length)
}

/// Sum of spring forces on `index`, plus the summed strength of those springs.
///
/// Springs whose other end is missing from `positions` are skipped.
pub fn net_force(
    index: usize,
    positions: &[VertexPosition],
    network: &SpringNetwork,
    timeness: Timeness,
    max_timeness: MaxTimeness,
) -> (Vec2, f32) {
    let Some(vertex) = positions.get(index) else {
        return (Vec2::ZERO, 0.0);
    };
    let mut force = Vec2::ZERO;
    let mut stiffness = 0.0;
    for spring in network.incident(index) {
        let Some(other) = positions.get(spring.other(index as u32) as usize) else {
            continue;
        };
        let rest_length = effective_rest_length(spring, timeness, max_timeness);
        force += spring_force(vertex.position, other.position, rest_length, spring.strength);
        stiffness += spring.strength;
    }
    (force, stiffness)
}

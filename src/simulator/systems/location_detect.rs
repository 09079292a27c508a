use crate::simulator::components::vertices::VertexPosition;
use glam::Vec2;

/// The movable vertex closest to `point`, with its distance.
///
/// Ties go to the lowest index. Returns `None` when no movable vertex exists.
///
/// TODO: Index vertices spatially once grids grow past a few thousand cells.
pub fn closest_movable_vertex(positions: &[VertexPosition], point: Vec2) -> Option<(usize, f32)> {
    let mut closest = None;
    let mut closest_dist = f32::INFINITY;
    for (i, vertex) in positions.iter().enumerate() {
        if vertex.pinned {
            continue;
        }
        let dist = vertex.position.distance(point);
        if dist < closest_dist {
            closest_dist = dist;
            closest = Some(i);
        }
    }
    closest.map(|i| (i, closest_dist))
}

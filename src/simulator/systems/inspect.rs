//! Read-only queries for debug overlays. Nothing here feeds back into the
//! simulation.

use crate::simulator::{
    components::{
        springs::{Spring, SpringNetwork},
        vertices::VertexPosition,
    },
    ressources::simulator_vars::{MaxTimeness, Timeness},
    systems::force_compute::{effective_rest_length, hooke_force},
};

/// The force one spring exerts on a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncidentForce {
    pub spring: Spring,
    /// The endpoint opposite to the inspected vertex.
    pub other: u32,
    /// Hooke scalar force; positive pulls together.
    pub force: f32,
}

impl IncidentForce {
    #[inline(always)]
    pub fn pushing_away(&self) -> bool {
        self.force < 0.0
    }
}

/// Forces of every spring touching `index`, at the given blend.
pub fn incident_forces(
    positions: &[VertexPosition],
    network: &SpringNetwork,
    index: usize,
    timeness: Timeness,
    max_timeness: MaxTimeness,
) -> Vec<IncidentForce> {
    let Some(vertex) = positions.get(index) else {
        return Vec::new();
    };
    network
        .incident(index)
        .filter_map(|spring| {
            let other = spring.other(index as u32);
            let other_pos = positions.get(other as usize)?.position;
            let rest_length = effective_rest_length(spring, timeness, max_timeness);
            Some(IncidentForce {
                spring: *spring,
                other,
                force: hooke_force(vertex.position, other_pos, rest_length, spring.strength),
            })
        })
        .collect()
}

/// Springs between movable vertices currently shorter than `threshold`,
/// thinned to roughly one in `sample_every` by a stable hash of the pair.
///
/// `sample_every` of `0` or `1` keeps every spring.
pub fn springs_within<'a>(
    positions: &'a [VertexPosition],
    network: &'a SpringNetwork,
    threshold: f32,
    sample_every: u64,
) -> impl Iterator<Item = &'a Spring> + 'a {
    network.springs().iter().filter(move |spring| {
        let (Some(from), Some(to)) = (
            positions.get(spring.from as usize),
            positions.get(spring.to as usize),
        ) else {
            return false;
        };
        if from.pinned || to.pinned {
            return false;
        }
        if from.position.distance(to.position) > threshold {
            return false;
        }
        sample_every <= 1 || hash_pair(spring.from, spring.to) % sample_every == 0
    })
}

/// Stable across runs and platforms, unlike `std`'s default hasher.
fn hash_pair(a: u32, b: u32) -> u64 {
    let mut h = ((u64::from(a) << 32) | u64::from(b)).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= h >> 29;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^ (h >> 32)
}

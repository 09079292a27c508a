//! Components which make up a spring

use crate::error::NetworkError;
use crate::simulator::components::vertices::VertexPosition;

/// A pairwise distance constraint between two vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub from: u32,
    pub to: u32,
    /// Rest length implied by the travel time between the endpoints.
    ///
    /// Always `0` for anchors.
    pub length: f32,
    /// Distance between the endpoints in the geographic layout.
    ///
    /// Always `0` for anchors.
    pub geo_length: f32,
    /// How strong the spring pulls or pushes.
    pub strength: f32,
    /// Anchors tie a movable vertex to its pinned geographic twin.
    pub is_anchor: bool,
}

impl Spring {
    /// A zero-length spring holding `from` near `to`.
    #[inline(always)]
    pub const fn anchor(from: u32, to: u32, strength: f32) -> Self {
        Self {
            from,
            to,
            length: 0.0,
            geo_length: 0.0,
            strength,
            is_anchor: true,
        }
    }

    /// A spring whose rest length moves from `geo_length` to `length` as
    /// timeness grows.
    #[inline(always)]
    pub const fn timed(from: u32, to: u32, geo_length: f32, length: f32, strength: f32) -> Self {
        Self {
            from,
            to,
            length,
            geo_length,
            strength,
            is_anchor: false,
        }
    }

    /// The endpoint opposite to `index`.
    #[inline(always)]
    pub fn other(&self, index: u32) -> u32 {
        if self.from == index {
            self.to
        } else {
            self.from
        }
    }
}

/// A validated set of springs over a vertex array, indexed by vertex.
///
/// Springs are addressed by their position in [`SpringNetwork::springs`]; the
/// incidence index lists, per vertex, the springs touching it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpringNetwork {
    springs: Vec<Spring>,
    vertex_count: usize,
    /// `incident[offsets[v]..offsets[v + 1]]` are the springs touching `v`.
    offsets: Vec<usize>,
    incident: Vec<u32>,
}

impl SpringNetwork {
    /// Validates `springs` against `positions` and indexes them by vertex.
    pub fn new(springs: Vec<Spring>, positions: &[VertexPosition]) -> Result<Self, NetworkError> {
        let vertex_count = positions.len();
        for (i, spring) in springs.iter().enumerate() {
            for index in [spring.from, spring.to] {
                if index as usize >= vertex_count {
                    return Err(NetworkError::IndexOutOfRange {
                        spring: i,
                        index,
                        count: vertex_count,
                    });
                }
            }
            if spring.from == spring.to {
                return Err(NetworkError::SelfLoop(i, spring.from));
            }
            let valid = |v: f32| v.is_finite() && v >= 0.0;
            if !valid(spring.length) || !valid(spring.geo_length) || !valid(spring.strength) {
                return Err(NetworkError::InvalidSpring(i));
            }
            if positions[spring.from as usize].pinned && positions[spring.to as usize].pinned {
                return Err(NetworkError::PinnedOnly(i));
            }
        }

        let mut degree = vec![0usize; vertex_count];
        for spring in &springs {
            degree[spring.from as usize] += 1;
            degree[spring.to as usize] += 1;
        }
        let mut offsets = Vec::with_capacity(vertex_count + 1);
        offsets.push(0);
        for d in &degree {
            offsets.push(offsets[offsets.len() - 1] + d);
        }
        let mut cursor = offsets[..vertex_count].to_vec();
        let mut incident = vec![0u32; offsets[vertex_count]];
        for (i, spring) in springs.iter().enumerate() {
            for v in [spring.from as usize, spring.to as usize] {
                incident[cursor[v]] = i as u32;
                cursor[v] += 1;
            }
        }

        Ok(Self {
            springs,
            vertex_count,
            offsets,
            incident,
        })
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Number of vertices the network was validated against.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn len(&self) -> usize {
        self.springs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.springs.is_empty()
    }

    pub fn anchor_count(&self) -> usize {
        self.springs.iter().filter(|s| s.is_anchor).count()
    }

    /// Springs touching `vertex`, in the order they were added.
    pub fn incident(&self, vertex: usize) -> impl Iterator<Item = &Spring> + '_ {
        let range = match (self.offsets.get(vertex), self.offsets.get(vertex + 1)) {
            (Some(&start), Some(&end)) => start..end,
            _ => 0..0,
        };
        self.incident[range]
            .iter()
            .map(move |&i| &self.springs[i as usize])
    }
}

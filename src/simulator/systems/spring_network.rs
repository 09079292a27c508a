//! Builds a city's spring network from its grid data.

use crate::error::NetworkError;
use crate::grid_data::GridData;
use crate::simulator::components::{
    springs::{Spring, SpringNetwork},
    vertices::{initial_positions, VertexPosition},
};
use glam::Vec2;
use log::{debug, info};
use rand::{rngs::StdRng, seq::index::sample, SeedableRng};
use std::collections::BTreeSet;

/// Which pairs of grid points get a travel-time spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionPolicy {
    /// Every pair with a known travel time. `O(N²)` springs.
    Full,
    /// Pairs closer than `max_distance` in the geographic layout.
    ///
    /// Spring count grows with the radius; long-range distortion only
    /// emerges through chains of springs.
    Radius { max_distance: f32 },
    /// The `nearest` geographically closest points plus `long_range` random
    /// further ones, per point. Near-linear in `N`; the random pairs keep
    /// far, slow-to-reach points visibly apart. `seed` makes it repeatable.
    Neighborhood {
        nearest: usize,
        long_range: usize,
        seed: u64,
    },
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        Self::Radius { max_distance: 0.25 }
    }
}

/// How travel times in seconds become rest lengths in map units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Calibration {
    /// Map units covered per second of travel.
    Speed(f32),
    /// Derive the speed so that the median spring keeps its geographic
    /// length in the travel-time layout.
    MedianRatio,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::MedianRatio
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringNetworkConfig {
    /// Strength of the spring tying each point to its geographic position.
    pub anchor_strength: f32,
    /// Strength of every travel-time spring.
    ///
    /// Against anchors of strength `1`, a pair held by one travel-time spring
    /// of strength `s` settles `2s / (1 + 2s)` of the way to its travel-time
    /// length; `20` reaches about 98%.
    pub time_spring_strength: f32,
    pub policy: ConnectionPolicy,
    pub calibration: Calibration,
}

impl Default for SpringNetworkConfig {
    fn default() -> Self {
        Self {
            anchor_strength: 1.0,
            time_spring_strength: 20.0,
            policy: ConnectionPolicy::default(),
            calibration: Calibration::default(),
        }
    }
}

impl SpringNetworkConfig {
    fn validate(&self) -> Result<(), NetworkError> {
        let check = |name: &'static str, value: f32, ok: bool| {
            if ok && value.is_finite() {
                Ok(())
            } else {
                Err(NetworkError::InvalidParameter { name, value })
            }
        };
        check("anchor_strength", self.anchor_strength, self.anchor_strength >= 0.0)?;
        check(
            "time_spring_strength",
            self.time_spring_strength,
            self.time_spring_strength >= 0.0,
        )?;
        if let ConnectionPolicy::Radius { max_distance } = self.policy {
            check("max_distance", max_distance, max_distance > 0.0)?;
        }
        if let Calibration::Speed(speed) = self.calibration {
            check("speed", speed, speed > 0.0)?;
        }
        Ok(())
    }
}

/// Builds the geographic layout and the validated spring network for a city.
///
/// Every grid point `i` gets an anchor to its pinned twin `i + N`. Pairs
/// selected by the connection policy get a travel-time spring when a travel
/// time is known in either direction; the mean of both directions is used.
pub fn build_network(
    data: &GridData,
    config: &SpringNetworkConfig,
) -> Result<(Vec<VertexPosition>, SpringNetwork), NetworkError> {
    data.validate()?;
    config.validate()?;

    let positions = initial_positions(data);
    let geo: Vec<Vec2> = data.entries().map(|e| e.position()).collect();
    let count = geo.len();

    let mut springs: Vec<Spring> = (0..count as u32)
        .map(|i| Spring::anchor(i, i + count as u32, config.anchor_strength))
        .collect();

    let pairs = candidate_pairs(&geo, &config.policy);
    let mut timed: Vec<(u32, u32, f32, f32)> = Vec::with_capacity(pairs.len());
    let mut skipped = 0;
    for (a, b) in pairs {
        let Some(seconds) = pair_travel_time(data, a as usize, b as usize) else {
            skipped += 1;
            continue;
        };
        timed.push((a, b, geo[a as usize].distance(geo[b as usize]), seconds));
    }
    if skipped > 0 {
        debug!("Skipped {skipped} pairs without a usable travel time");
    }

    let speed = match config.calibration {
        Calibration::Speed(speed) => speed,
        Calibration::MedianRatio => median_speed(&timed),
    };
    springs.extend(timed.iter().map(|&(a, b, geo_length, seconds)| {
        Spring::timed(a, b, geo_length, seconds * speed, config.time_spring_strength)
    }));

    info!(
        "Built spring network: {0} points | {1} anchors | {2} timed springs | speed {3}",
        count,
        count,
        springs.len() - count,
        speed
    );
    let network = SpringNetwork::new(springs, &positions)?;
    Ok((positions, network))
}

fn pair_travel_time(data: &GridData, a: usize, b: usize) -> Option<f32> {
    match (data.travel_times.get(a, b), data.travel_times.get(b, a)) {
        (Some(t1), Some(t2)) => Some((t1 + t2) / 2.0),
        (Some(t), None) | (None, Some(t)) => Some(t),
        (None, None) => None,
    }
}

/// Map units per second such that the median spring keeps its geographic
/// length. Falls back to `0` when no pair has both a length and a time.
fn median_speed(timed: &[(u32, u32, f32, f32)]) -> f32 {
    let mut ratios: Vec<f32> = timed
        .iter()
        .filter(|(_, _, geo_length, seconds)| *geo_length > 0.0 && *seconds > 0.0)
        .map(|(_, _, geo_length, seconds)| geo_length / seconds)
        .collect();
    if ratios.is_empty() {
        return 0.0;
    }
    ratios.sort_by(f32::total_cmp);
    let mid = ratios.len() / 2;
    if ratios.len() % 2 == 0 {
        (ratios[mid - 1] + ratios[mid]) / 2.0
    } else {
        ratios[mid]
    }
}

/// Unordered pairs `(a, b)` with `a < b`, in ascending order.
fn candidate_pairs(geo: &[Vec2], policy: &ConnectionPolicy) -> BTreeSet<(u32, u32)> {
    let count = geo.len();
    let mut pairs = BTreeSet::new();
    let ordered = |a: usize, b: usize| {
        if a < b {
            (a as u32, b as u32)
        } else {
            (b as u32, a as u32)
        }
    };

    match *policy {
        ConnectionPolicy::Full => {
            for a in 0..count {
                for b in a + 1..count {
                    pairs.insert((a as u32, b as u32));
                }
            }
        }
        ConnectionPolicy::Radius { max_distance } => {
            for a in 0..count {
                for b in a + 1..count {
                    if geo[a].distance(geo[b]) < max_distance {
                        pairs.insert((a as u32, b as u32));
                    }
                }
            }
        }
        ConnectionPolicy::Neighborhood {
            nearest,
            long_range,
            seed,
        } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut others: Vec<usize> = Vec::with_capacity(count.saturating_sub(1));
            for a in 0..count {
                others.clear();
                others.extend((0..count).filter(|&b| b != a));
                others.sort_by(|&b, &c| {
                    geo[a]
                        .distance_squared(geo[b])
                        .total_cmp(&geo[a].distance_squared(geo[c]))
                        .then(b.cmp(&c))
                });
                let near = nearest.min(others.len());
                for &b in &others[..near] {
                    pairs.insert(ordered(a, b));
                }
                let far = &others[near..];
                let picks = long_range.min(far.len());
                for i in sample(&mut rng, far.len(), picks) {
                    pairs.insert(ordered(a, far[i]));
                }
            }
        }
    }
    debug!("Connection policy {policy:?} selected {} pairs", pairs.len());
    pairs
}

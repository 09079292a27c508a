#![allow(dead_code)]

use glam::Vec2;
use spacetime_mesh::grid_data::regular_entries;
use spacetime_mesh::prelude::*;

/// Travel time proportional to geographic distance, `factor` seconds per unit.
pub fn uniform_city(size: usize, factor: f32) -> GridData {
    let grid = regular_entries(size, 0.0, 1.0);
    let geo: Vec<Vec2> = grid.iter().flatten().map(|e| e.position()).collect();
    let times = geo
        .iter()
        .map(|a| geo.iter().map(|b| Some(a.distance(*b) * factor)).collect())
        .collect();
    GridData::new(size, grid, TravelTimes(times)).unwrap()
}

/// 3x3 grid spaced 0.1 apart where points 3 and 4 are adjacent but 60s
/// apart, which maps to a rest length of 0.6. No other travel times are known.
pub fn slow_pair_city() -> GridData {
    let n = 9;
    let mut times = vec![vec![None; n]; n];
    times[3][4] = Some(60.0);
    times[4][3] = Some(60.0);
    GridData::new(3, regular_entries(3, 0.4, 0.6), TravelTimes(times)).unwrap()
}

/// The slow-pair city under default strengths, with every pair connected.
pub fn slow_pair_network() -> (Vec<VertexPosition>, SpringNetwork) {
    let config = SpringNetworkConfig {
        policy: ConnectionPolicy::Full,
        calibration: Calibration::Speed(0.01),
        ..SpringNetworkConfig::default()
    };
    build_network(&slow_pair_city(), &config).unwrap()
}

pub fn no_focus() -> IntegratorConfig {
    IntegratorConfig {
        focus: FocusConfig {
            enabled: false,
            ..FocusConfig::default()
        },
        ..IntegratorConfig::default()
    }
}

/// Runs `steps` frames of 50ms without hover.
pub fn relax(
    mut positions: Vec<VertexPosition>,
    network: &SpringNetwork,
    timeness: f32,
    max_timeness: f32,
    steps: usize,
) -> Vec<VertexPosition> {
    let config = no_focus();
    for _ in 0..steps {
        positions = step(
            &positions,
            network,
            DeltaTime(0.05),
            None,
            Timeness::new(timeness),
            MaxTimeness::new(max_timeness),
            &config,
        );
    }
    positions
}

pub fn distance(positions: &[VertexPosition], a: usize, b: usize) -> f32 {
    positions[a].position.distance(positions[b].position)
}

use crate::simulator::{
    components::{springs::SpringNetwork, vertices::VertexPosition},
    ressources::simulator_vars::{DeltaTime, HoverPoint, IntegratorConfig, MaxTimeness, Timeness},
    systems::{force_compute::net_force, interaction::FocusField},
};
use glam::Vec2;
use log::trace;
use rayon::prelude::*;

/// Advances every movable vertex one relaxation step.
///
/// Each vertex moves towards the point where its springs balance, by the
/// fraction [`IntegratorConfig::step_fraction`] of the way. The net force is
/// divided by the summed strength of the springs involved, so a step never
/// overshoots however stiff the springs are or however long the frame took.
/// No velocity is carried between steps.
///
/// The hover focus is normalized on its own and added to that displacement,
/// so disabling it leaves every other part of the step unchanged.
///
/// Pinned vertices are copied through unchanged. The input is never
/// modified; the next layout is returned as a new array.
pub fn step(
    positions: &[VertexPosition],
    network: &SpringNetwork,
    delta: DeltaTime,
    hover: Option<HoverPoint>,
    timeness: Timeness,
    max_timeness: MaxTimeness,
    config: &IntegratorConfig,
) -> Vec<VertexPosition> {
    let fraction = config.step_fraction(delta);
    if fraction <= 0.0 {
        return positions.to_vec();
    }

    let focus = hover.and_then(|hover| {
        FocusField::new(positions, network, hover, max_timeness, &config.focus)
    });
    trace!(
        "Step dt: {0} | t: {1} | max: {2} | fraction: {3} | focus: {4:?}",
        delta.0,
        timeness.0,
        max_timeness.0,
        fraction,
        focus.as_ref().map(|f| f.center)
    );

    positions
        .par_iter()
        .enumerate()
        .map(|(i, vertex)| {
            if vertex.pinned {
                return *vertex;
            }
            let (force, stiffness) = net_force(i, positions, network, timeness, max_timeness);
            let mut displacement = if stiffness > 0.0 {
                force / stiffness * fraction
            } else {
                Vec2::ZERO
            };
            // The focus moves a vertex on top of its regular step.
            if let Some((extra, extra_stiffness)) = focus.as_ref().and_then(|f| f.force_on(i)) {
                if extra_stiffness > 0.0 {
                    displacement += extra / extra_stiffness * fraction;
                }
            }
            if !displacement.is_finite() {
                return *vertex;
            }
            VertexPosition {
                position: vertex.position + displacement,
                pinned: false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::components::springs::Spring;
    use crate::simulator::ressources::simulator_vars::FocusConfig;

    fn pair() -> (Vec<VertexPosition>, SpringNetwork) {
        let positions = vec![
            VertexPosition::movable(Vec2::new(0.2, 0.5)),
            VertexPosition::pinned(Vec2::new(0.5, 0.5)),
        ];
        let network = SpringNetwork::new(vec![Spring::anchor(0, 1, 1.0)], &positions).unwrap();
        (positions, network)
    }

    #[test]
    fn anchored_vertex_moves_a_fraction_of_the_way() {
        let (positions, network) = pair();
        let config = IntegratorConfig::default();
        let next = step(
            &positions,
            &network,
            DeltaTime(0.05),
            None,
            Timeness(0.0),
            MaxTimeness(1.0),
            &config,
        );
        // 0.4 of the remaining 0.3.
        assert!((next[0].position.x - 0.32).abs() < 1e-6);
        assert_eq!(next[1], positions[1]);
    }

    #[test]
    fn huge_frame_time_does_not_overshoot() {
        let (positions, network) = pair();
        let config = IntegratorConfig::default();
        let next = step(
            &positions,
            &network,
            DeltaTime(5.0),
            None,
            Timeness(0.0),
            MaxTimeness(1.0),
            &config,
        );
        assert!((next[0].position.x - 0.35).abs() < 1e-6);
    }

    #[test]
    fn vertex_without_springs_stays_put() {
        let positions = vec![VertexPosition::movable(Vec2::new(0.2, 0.5))];
        let network = SpringNetwork::new(vec![], &positions).unwrap();
        let next = step(
            &positions,
            &network,
            DeltaTime(0.016),
            None,
            Timeness(1.0),
            MaxTimeness(1.0),
            &IntegratorConfig::default(),
        );
        assert_eq!(next, positions);
    }

    #[test]
    fn focus_adds_its_own_displacement_on_top() {
        let positions = vec![
            VertexPosition::movable(Vec2::new(0.4, 0.5)),
            VertexPosition::movable(Vec2::new(0.5, 0.5)),
            VertexPosition::pinned(Vec2::new(0.4, 0.5)),
            VertexPosition::pinned(Vec2::new(0.5, 0.5)),
        ];
        let springs = vec![
            Spring::anchor(0, 2, 1.0),
            Spring::anchor(1, 3, 1.0),
            Spring::timed(0, 1, 0.1, 0.6, 20.0),
        ];
        let network = SpringNetwork::new(springs, &positions).unwrap();
        let config = IntegratorConfig::default();
        let delta = DeltaTime(0.05);
        let hover = HoverPoint::new(Vec2::new(0.4, 0.5));
        let frame = |hover| {
            step(
                &positions,
                &network,
                delta,
                hover,
                Timeness(0.5),
                MaxTimeness(1.0),
                &config,
            )
        };
        let base = frame(None);
        let focused = frame(hover);

        let field = FocusField::new(
            &positions,
            &network,
            hover.unwrap(),
            MaxTimeness(1.0),
            &FocusConfig::default(),
        )
        .unwrap();
        assert_eq!(field.center, 0);
        let (force, stiffness) = field.force_on(1).unwrap();
        let focus_only = force / stiffness * config.step_fraction(delta);

        let base_move = base[1].position - positions[1].position;
        let focused_move = focused[1].position - positions[1].position;
        assert!(base_move.x > 0.0);
        assert!((focused_move - (base_move + focus_only)).length() < 1e-6);
        // The grabbed vertex takes only its regular step.
        assert_eq!(focused[0], base[0]);
    }
}

pub mod components;
pub mod ressources;
pub mod systems;

use crate::{
    error::NetworkError,
    grid_data::GridData,
    mesh::GridMesh,
    simulator::{
        components::{springs::SpringNetwork, vertices::VertexPosition},
        ressources::simulator_vars::{
            DeltaTime, FocusConfig, HoverPoint, IntegratorConfig, MaxStepFraction, MaxTimeness,
            RelaxationRate, Timeness,
        },
        systems::{
            inspect::{incident_forces, IncidentForce},
            location_detect::closest_movable_vertex,
            position_update::step,
            spring_network::{build_network, Calibration, ConnectionPolicy, SpringNetworkConfig},
        },
    },
};
use glam::Vec2;
use log::{debug, info};

/// One city's deforming mesh.
///
/// Holds the per-city mesh and spring network together with the latest
/// layout, and advances that layout once per frame. The relaxation itself is
/// the pure [`step`]; the simulator only keeps the snapshot between frames.
pub struct Simulator {
    mesh: GridMesh,
    network: SpringNetwork,
    initial_positions: Vec<VertexPosition>,
    positions: Vec<VertexPosition>,
    max_timeness: MaxTimeness,
    config: IntegratorConfig,
}

impl Simulator {
    pub fn builder() -> SimulatorBuilder {
        SimulatorBuilder::default()
    }

    /// Advances the layout by one frame and returns it.
    ///
    /// `hover` is a pointer location in normalized map space; points outside
    /// the map are ignored.
    pub fn tick(&mut self, delta_seconds: f32, timeness: f32, hover: Option<Vec2>) -> &[VertexPosition] {
        let hover = hover.and_then(HoverPoint::new);
        self.positions = step(
            &self.positions,
            &self.network,
            DeltaTime::new(delta_seconds),
            hover,
            Timeness::new(timeness),
            self.max_timeness,
            &self.config,
        );
        &self.positions
    }

    /// Returns every vertex to its geographic position.
    pub fn reset(&mut self) {
        debug!("Resetting layout");
        self.positions.clone_from(&self.initial_positions);
    }

    /// The current layout: movable vertices first, then their pinned twins.
    pub fn positions(&self) -> &[VertexPosition] {
        &self.positions
    }

    /// The current layout of the movable vertices only.
    pub fn movable_positions(&self) -> &[VertexPosition] {
        &self.positions[..self.positions.len() / 2]
    }

    pub fn mesh(&self) -> &GridMesh {
        &self.mesh
    }

    pub fn network(&self) -> &SpringNetwork {
        &self.network
    }

    pub fn max_timeness(&self) -> MaxTimeness {
        self.max_timeness
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Turns the hover focus on or off.
    pub fn set_focus_on_hover(&mut self, enabled: bool) {
        debug!("Focus on hover: {enabled}");
        self.config.focus.enabled = enabled;
    }

    /// The movable vertex closest to a point in normalized map space.
    pub fn closest_vertex(&self, point: Vec2) -> Option<usize> {
        closest_movable_vertex(&self.positions, point).map(|(i, _)| i)
    }

    /// Forces acting on a vertex in the current layout.
    pub fn forces_on(&self, index: usize, timeness: f32) -> Vec<IncidentForce> {
        incident_forces(
            &self.positions,
            &self.network,
            index,
            Timeness::new(timeness),
            self.max_timeness,
        )
    }
}

/// Builder for `Simulator`
pub struct SimulatorBuilder {
    network: SpringNetworkConfig,
    integrator: IntegratorConfig,
    max_timeness: f32,
}

impl SimulatorBuilder {
    /// Get a Instance of `SimulatorBuilder` with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// How far the travel-time layout may stretch this city's mesh.
    ///
    /// `1.0` lets springs reach their full travel-time length.
    ///
    /// Default: `1.0`
    pub fn max_timeness(mut self, max_timeness: f32) -> Self {
        self.max_timeness = max_timeness;
        self
    }

    /// How strong each point is held at its geographic position.
    ///
    /// Default: `1.0`
    pub fn anchor_strength(mut self, strength: f32) -> Self {
        self.network.anchor_strength = strength;
        self
    }

    /// How strong the travel-time springs are, relative to the anchors.
    ///
    /// Weaker springs leave the travel-time layout short of its full
    /// distances, since the anchors keep pulling back.
    ///
    /// Default: `20.0`
    pub fn time_spring_strength(mut self, strength: f32) -> Self {
        self.network.time_spring_strength = strength;
        self
    }

    /// Which pairs of points get a travel-time spring.
    ///
    /// Default: `ConnectionPolicy::Radius { max_distance: 0.25 }`
    pub fn connection_policy(mut self, policy: ConnectionPolicy) -> Self {
        self.network.policy = policy;
        self
    }

    /// How travel times become rest lengths.
    ///
    /// Default: `Calibration::MedianRatio`
    pub fn calibration(mut self, calibration: Calibration) -> Self {
        self.network.calibration = calibration;
        self
    }

    /// Fraction of the way to equilibrium a vertex moves per second.
    ///
    /// Default: `8.0`
    pub fn relaxation_rate(mut self, rate: f32) -> Self {
        self.integrator.relaxation_rate = RelaxationRate(rate);
        self
    }

    /// Largest fraction of the way to equilibrium a single step may cover.
    ///
    /// Value should be in `(0.0, 1.0]`.
    ///
    /// Default: `0.5`
    pub fn max_step_fraction(mut self, fraction: f32) -> Self {
        self.integrator.max_step_fraction = MaxStepFraction(fraction);
        self
    }

    /// Whether the vertex under the pointer distorts its neighbourhood.
    ///
    /// Default: `true`
    pub fn focus_on_hover(mut self, enabled: bool) -> Self {
        self.integrator.focus.enabled = enabled;
        self
    }

    /// How close the pointer must be to a vertex to grab it.
    ///
    /// Default: `0.1`
    pub fn hover_radius(mut self, radius: f32) -> Self {
        self.integrator.focus.hover_radius = radius;
        self
    }

    /// How far from the grabbed vertex the focus reaches.
    ///
    /// Default: `0.3`
    pub fn focus_radius(mut self, radius: f32) -> Self {
        self.integrator.focus.focus_radius = radius;
        self
    }

    /// Multiplier on the grabbed vertex's spring strengths.
    ///
    /// Default: `2.0`
    pub fn focus_strength(mut self, strength: f32) -> Self {
        self.integrator.focus.strength = strength;
        self
    }

    /// Constructs a instance of `Simulator` for one city.
    pub fn build(self, data: &GridData) -> Result<Simulator, NetworkError> {
        self.validate()?;
        let mesh = GridMesh::build(data)?;
        let (initial_positions, network) = build_network(data, &self.network)?;

        info!(
            "Simulator ready: {0} vertices | {1} springs | max timeness {2}",
            initial_positions.len(),
            network.len(),
            self.max_timeness
        );
        Ok(Simulator {
            mesh,
            network,
            positions: initial_positions.clone(),
            initial_positions,
            max_timeness: MaxTimeness::new(self.max_timeness),
            config: self.integrator,
        })
    }

    fn validate(&self) -> Result<(), NetworkError> {
        let IntegratorConfig {
            relaxation_rate,
            max_step_fraction,
            focus,
        } = self.integrator;
        let params = [
            ("max_timeness", self.max_timeness, self.max_timeness >= 0.0),
            ("relaxation_rate", relaxation_rate.0, relaxation_rate.0 >= 0.0),
            (
                "max_step_fraction",
                max_step_fraction.0,
                max_step_fraction.0 > 0.0 && max_step_fraction.0 <= 1.0,
            ),
            ("hover_radius", focus.hover_radius, focus.hover_radius >= 0.0),
            ("focus_radius", focus.focus_radius, focus.focus_radius >= 0.0),
            ("focus_strength", focus.strength, focus.strength >= 0.0),
        ];
        for (name, value, ok) in params {
            if !ok || !value.is_finite() {
                return Err(NetworkError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

impl Default for SimulatorBuilder {
    /// Get a Instance of `SimulatorBuilder` with default values
    fn default() -> Self {
        Self {
            network: SpringNetworkConfig::default(),
            integrator: IntegratorConfig {
                relaxation_rate: RelaxationRate::default(),
                max_step_fraction: MaxStepFraction::default(),
                focus: FocusConfig::default(),
            },
            max_timeness: 1.0,
        }
    }
}

//! Ressources used by the mesh simulator.
//!
//! Per-frame inputs are sanitized when they are wrapped, so the integrator
//! never sees NaN, negative time or an out-of-range blend.

use glam::Vec2;
use log::debug;

/// Blend between the geographic layout (`0`) and the travel-time layout (`1`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timeness(pub f32);

impl Timeness {
    /// Clamps into `[0, 1]`. NaN reads as `0`.
    pub fn new(timeness: f32) -> Self {
        if timeness.is_nan() {
            return Self(0.0);
        }
        Self(timeness.clamp(0.0, 1.0))
    }
}

/// Per-city cap on how far the travel-time layout may stretch the mesh.
///
/// `1.0` lets springs reach their full travel-time length, `0.0` freezes the
/// geographic layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxTimeness(pub f32);

impl MaxTimeness {
    /// Negative values and NaN read as `0`.
    pub fn new(max_timeness: f32) -> Self {
        if max_timeness.is_nan() {
            return Self(0.0);
        }
        Self(max_timeness.max(0.0))
    }
}

impl Default for MaxTimeness {
    fn default() -> Self {
        Self(1.0)
    }
}

/// How much time a simulation step should simulate, measured in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeltaTime(pub f32);

impl DeltaTime {
    /// Negative, infinite and NaN deltas read as `0`.
    pub fn new(seconds: f32) -> Self {
        if !seconds.is_finite() || seconds < 0.0 {
            return Self(0.0);
        }
        Self(seconds)
    }
}

/// A pointer location in normalized map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverPoint(pub Vec2);

impl HoverPoint {
    /// Pointer input is untrusted: points outside `[0, 1]²` are dropped.
    pub fn new(point: Vec2) -> Option<Self> {
        let inside = point.is_finite()
            && (0.0..=1.0).contains(&point.x)
            && (0.0..=1.0).contains(&point.y);
        if !inside {
            debug!("Ignoring hover point {point} outside the map");
            return None;
        }
        Some(Self(point))
    }

    /// Converts a pointer position in pixels over a square map of
    /// `map_size_px` pixels.
    pub fn from_pixels(pixels: Vec2, map_size_px: f32) -> Option<Self> {
        if map_size_px.is_nan() || map_size_px <= 0.0 {
            return None;
        }
        Self::new(pixels / map_size_px)
    }
}

/// Fraction of the way to equilibrium a vertex travels per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationRate(pub f32);

impl Default for RelaxationRate {
    fn default() -> Self {
        Self(8.0)
    }
}

/// Upper bound on the fraction of the way to equilibrium a vertex travels in
/// one step, whatever the frame time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxStepFraction(pub f32);

impl Default for MaxStepFraction {
    fn default() -> Self {
        Self(0.5)
    }
}

/// Tuning of the hover focus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusConfig {
    /// Whether a hover point distorts the mesh at all.
    pub enabled: bool,
    /// The hover point must lie this close to a movable vertex to grab it.
    pub hover_radius: f32,
    /// Only neighbours within this distance of the grabbed vertex feel the focus.
    pub focus_radius: f32,
    /// Multiplier on the strength of the grabbed vertex's springs.
    pub strength: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hover_radius: 0.1,
            focus_radius: 0.3,
            strength: 2.0,
        }
    }
}

/// Everything the integrator needs besides the per-frame inputs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntegratorConfig {
    pub relaxation_rate: RelaxationRate,
    pub max_step_fraction: MaxStepFraction,
    pub focus: FocusConfig,
}

impl IntegratorConfig {
    /// Fraction of the way to equilibrium covered by a step of `delta`.
    #[inline(always)]
    pub fn step_fraction(&self, delta: DeltaTime) -> f32 {
        (delta.0 * self.relaxation_rate.0)
            .min(self.max_step_fraction.0)
            .max(0.0)
    }
}

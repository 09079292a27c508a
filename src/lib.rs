//! Deform a city map between its geographic layout and a layout where
//! distance reflects travel time.
//!
//! A city's grid of map points becomes a triangle mesh and a network of
//! springs: anchors hold every point at its true position, travel-time
//! springs pull or push pairs of points towards the distance implied by how
//! long it takes to travel between them. Each frame, the layout relaxes a
//! step towards the balance of both, blended by a "timeness" in `[0, 1]`.
//!
//! # Example
//! ```no_run
//! use spacetime_mesh::prelude::*;
//!
//! let data = GridData::from_json_file("assets/newyork_pedestrian/grid_data.json")?;
//! let mut simulator = Simulator::builder()
//!     .max_timeness(0.08)
//!     .connection_policy(ConnectionPolicy::Radius { max_distance: 0.3 })
//!     .build(&data)?;
//!
//! // Once per rendered frame.
//! let positions = simulator.tick(1.0 / 60.0, 0.5, None).to_vec();
//! let triangles = &simulator.mesh().triangles;
//! # let _ = (positions, triangles);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod grid_data;
pub mod mesh;
pub mod simulator;

/// Exports all the core types of the library.
pub mod prelude {
    pub use crate::error::{GridError, LoadError, NetworkError};
    pub use crate::grid_data::{GridData, GridEntry, RouteEntry, TravelTimes};
    pub use crate::mesh::GridMesh;
    pub use crate::simulator::components::{
        springs::{Spring, SpringNetwork},
        vertices::{initial_positions, VertexPosition},
    };
    pub use crate::simulator::ressources::simulator_vars::{
        DeltaTime, FocusConfig, HoverPoint, IntegratorConfig, MaxStepFraction, MaxTimeness,
        RelaxationRate, Timeness,
    };
    pub use crate::simulator::systems::{
        inspect::{incident_forces, springs_within, IncidentForce},
        interaction::FocusField,
        location_detect::closest_movable_vertex,
        position_update::step,
        spring_network::{build_network, Calibration, ConnectionPolicy, SpringNetworkConfig},
    };
    pub use crate::simulator::{Simulator, SimulatorBuilder};
}

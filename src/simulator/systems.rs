//! The computations of the simulator.

pub mod force_compute;
pub mod inspect;
pub mod interaction;
pub mod location_detect;
pub mod position_update;
pub mod spring_network;

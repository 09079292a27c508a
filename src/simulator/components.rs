//! The plain data of the simulator. Vertices and springs are value arrays
//! addressed by index.

pub mod springs;
pub mod vertices;

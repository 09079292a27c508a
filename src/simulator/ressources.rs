pub mod simulator_vars;

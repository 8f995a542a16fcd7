pub mod addresses;
pub mod auth;
pub mod master_runs;
pub mod patients;
pub mod recipes;
pub mod runs;
pub mod vehicles;

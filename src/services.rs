pub mod auth;
pub mod cascade;
pub mod filters;
pub mod references;

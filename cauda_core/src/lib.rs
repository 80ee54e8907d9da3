//! Core rust implementation of cauda, a driver for single member knockout sweeps of microbial
//! communities and for interpolating between growth media.

pub mod community;
pub mod configuration;
pub mod flux;
pub mod io;
pub mod knockout;

//! Headless tooling around the globe engine: demo scene generation, a decaying
//! heat field, and a frame-stepped simulator that drives a mounted session
//! against recording surfaces.

pub mod demo;
pub mod heat;
pub mod sim;

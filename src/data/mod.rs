// src/data/mod.rs

//! The data created and maintained by this project.

pub mod classifier;
pub mod datetime;
pub mod event;
pub mod model;
pub mod patterns;
pub mod size;

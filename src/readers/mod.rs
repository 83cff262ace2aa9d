// src/readers/mod.rs

pub mod crashreader;

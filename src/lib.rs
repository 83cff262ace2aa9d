// src/lib.rs

pub mod analysis;
pub mod catalog;
pub mod common;
pub mod data;
pub mod printer;
pub mod readers;
#[cfg(test)]
pub mod tests;

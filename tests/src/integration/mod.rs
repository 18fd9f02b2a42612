//! Cross-crate orchestration scenarios.

#[cfg(test)]
pub mod fixtures;

mod addressing;
mod membership;
mod operations;
mod startup;

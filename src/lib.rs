//! Chest Predictor — encounter tracking and next-enemy prediction for games.
//!
//! Logs which enemy appeared at which chest and guesses the next one with a
//! first-order Markov chain over enemy transitions, backed by a rarity prior
//! for transitions that have never been observed.

pub mod core;
pub mod schema;

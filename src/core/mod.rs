pub mod catalog;
pub mod config;
pub mod history;
pub mod insights;
pub mod markov;
pub mod predictor;
pub mod stats;

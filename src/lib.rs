//! Phonpact - phonological adjusted-use studies over child speech lexicons
//!
//! Derives per-word usage and neighborhood variables from child and adult
//! speech lexicons, including the polynomial-adjusted use columns, and fits
//! the study regressions with bootstrap confidence intervals.

pub mod cli;
pub mod config;
pub mod derive;
pub mod models;
pub mod pipeline;
pub mod regress;
pub mod reporters;
pub mod stats;
pub mod store;

//! Headless runner for the tower-defense core.
//!
//! Loads a level layout and a scenario script (both RON), drives the game
//! session tick by tick without graphics, and reports the outcome as JSON.
//! Designed for CI verification and scripted balance experiments.

pub mod runner;
pub mod scenario;

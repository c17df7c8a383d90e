// Game modules: actions, combat simulation, shared constants

pub mod action;
pub mod combat;
pub mod config;

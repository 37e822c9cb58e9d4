pub mod config;
pub mod dataset;
pub mod detection;
pub mod my_types;
pub mod pipeline;
pub mod synthetic;
pub mod tracker;
pub mod visualization;

pub mod axis;
pub mod bindings;
pub mod config;
pub mod error;
pub mod explorer;
pub mod export;
pub mod fetch;
pub mod filter_values;
pub mod filters;
pub mod heatmap;
pub mod hierarchy;
pub mod model;
pub mod organs;
pub mod settings;
pub mod statements;
pub mod summary;
pub mod synaptic;

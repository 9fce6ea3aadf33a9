pub mod cli;
pub mod config;
pub mod customer;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod output;
pub mod params;
pub mod selection;
pub mod server;
pub mod state;
pub mod variates;

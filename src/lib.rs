pub mod catalog;
pub mod commands;
pub mod config;
pub mod connection;
pub mod dashboard;
pub mod inventory;
pub mod labs;
pub mod models;
pub mod reachability;
pub mod restconf;
pub mod runner;
pub mod utils;

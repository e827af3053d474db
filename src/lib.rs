pub mod config;
pub mod controllers;
pub mod db;
pub mod devserver;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;

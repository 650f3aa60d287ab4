pub mod app;
pub mod availability;
pub mod brands;
pub mod config;
pub mod enrich;
pub mod models;
pub mod tmdb;
pub mod watchlist;

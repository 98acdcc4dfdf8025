pub mod adapter;
pub mod app;
pub mod catalog;
pub mod config;
pub mod content;
pub mod genres;
pub mod store;
pub mod tmdb;
pub mod watchlist;

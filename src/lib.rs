//! Amata: diets, training programs and workouts behind a small HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod slug;
pub mod validation;

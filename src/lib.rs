#[macro_use] extern crate diesel;
#[macro_use] extern crate log;

pub mod config;
pub mod db;
pub mod errors;
pub mod messages;
pub mod models;
pub mod responses;
pub mod routes;
pub mod schema;
pub mod upload;

pub mod config;
pub mod data_models;
pub mod error;
pub mod runner;
pub mod search;
pub mod table;
pub mod validator;

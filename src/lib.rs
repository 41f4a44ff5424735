pub mod config;
pub mod environment;
pub mod errors;
pub mod form;
pub mod pages;
pub mod routes;
pub mod store;
pub mod submission;
pub mod sync;
pub mod timestamp;
pub mod validation;

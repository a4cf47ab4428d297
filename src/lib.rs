pub mod app;
pub mod config;
pub mod error;
pub mod gallery;
pub mod intake;
pub mod logging;
pub mod photo;
pub mod seed;
pub mod session;
pub mod storage;
pub mod tasks;
pub mod ui;

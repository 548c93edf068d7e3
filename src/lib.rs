pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod render;
pub mod source;
pub mod storage;
pub mod theme;
pub mod view;

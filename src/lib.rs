pub mod calendar;
pub mod config;
pub mod demo_feed;
pub mod engine;
pub mod feed;
pub mod model;
pub mod names;
pub mod pool;
pub mod selector;
pub mod sheet_cache;
pub mod sheets;
pub mod sorter;
pub mod state;

pub mod catalog;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod debounce;
pub mod dismissal;
pub mod fetcher;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod query;
pub mod runtime;
pub mod session;
pub mod source;
pub mod transport;

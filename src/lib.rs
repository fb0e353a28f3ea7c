pub mod analytics;
pub mod core;
pub mod explorer;
pub mod main_module;
pub mod security;
pub mod tickets;

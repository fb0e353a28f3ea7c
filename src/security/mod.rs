pub mod cors;

pub use cors::CorsConfig;

// Shared types
pub mod types;

// Pipeline tools, leaf-first
pub mod batch;
pub mod clean;
pub mod dates;
pub mod dedupe;
pub mod extract;
pub mod fallback;
pub mod fetch;
pub mod map;
pub mod render;
pub mod scrape;
pub mod validate;

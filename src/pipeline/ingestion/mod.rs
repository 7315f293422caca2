// Pipeline ingestion: resources and the bounded loader

pub mod loader;
pub mod resource;

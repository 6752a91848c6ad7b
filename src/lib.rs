// Library crate exposing modules for the binary, integration tests and benches

pub mod analysis;
pub mod model;
pub mod repository;
pub mod util;
pub mod view;

mod model;

pub mod script_data;

pub use model::*;

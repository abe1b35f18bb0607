pub mod gene;
pub mod matrix;
pub mod pair;
pub mod params;

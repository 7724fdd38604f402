pub mod animate;
pub mod manifest;
pub mod parse;
pub mod process;
pub mod rasterize;
pub mod render;
pub mod stats;
pub mod sync;

pub mod aspect_ratio;
pub mod image;

pub use aspect_ratio::*;
pub use image::*;

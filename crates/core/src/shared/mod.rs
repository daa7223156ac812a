pub mod bounding_box;
pub mod constants;
pub mod error;
pub mod image;
pub mod image_file_reader;
pub mod model_resolver;

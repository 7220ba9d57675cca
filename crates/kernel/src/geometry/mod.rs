pub mod bounding_box;
pub mod point;
pub mod rotation;
pub mod vector;

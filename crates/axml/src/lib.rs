pub mod arsc;
pub mod axml;
pub mod errors;
pub mod vector;

pub mod structs;

pub use arsc::ARSC;
pub use axml::AXML;
pub use errors::{ARCSError, AXMLError};
pub use vector::VectorXform;

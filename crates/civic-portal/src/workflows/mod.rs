pub mod applications;
pub mod content;
pub mod profile;

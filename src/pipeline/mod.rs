pub mod demo;
pub mod persistence;
pub mod project;

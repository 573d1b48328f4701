pub mod obstacle;
pub mod spec;

pub mod obstacles;
pub mod quadrotors;

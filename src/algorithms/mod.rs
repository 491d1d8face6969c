pub mod avoidance;
pub mod flocking;
pub mod leader;
pub mod progression;
pub mod visibility;

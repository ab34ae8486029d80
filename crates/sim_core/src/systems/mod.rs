pub mod clock;
pub mod incidents;
pub mod patrol;

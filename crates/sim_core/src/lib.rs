pub mod clock;
pub mod dispatch;
pub mod ecs;
pub mod error;
pub mod geometry;
pub mod incident;
pub mod patrol;
pub mod random;
pub mod runner;
pub mod scenario;
pub mod systems;
pub mod telemetry;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use error::{Result, SimError};

use thiserror::Error;

use crate::geometry::ShapeKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid generator constants a={a}, c={c}, m={m}, x0={x0}: {reason}")]
    InvalidGenerator {
        a: u64,
        c: u64,
        m: u64,
        x0: u64,
        reason: &'static str,
    },

    #[error("zone {zone} has shape {shape:?}, which has no point sampler")]
    UnsupportedZoneShape { zone: String, shape: ShapeKind },

    #[error("no transfer station is mapped to zone {0}")]
    UnknownZone(String),

    #[error("invalid scenario configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

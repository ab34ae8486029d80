//! Mixed linear congruential generator and the two streams the simulation draws from.
//!
//! Every stochastic decision in a run comes from one of two independent streams:
//!
//! - [IncidentStream]: Poisson incident counts, zone selection, and point sampling
//! - [VehicleStream]: contact outcomes and patrol movement
//!
//! Streams are plain values owned by the world that seeded them. Two runs built from
//! the same [GeneratorParams] and drawing in the same order produce identical traces.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Constants `(a, c, m, x0)` of a mixed LCG: `x' = (a * x + c) mod m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorParams {
    pub a: u64,
    pub c: u64,
    pub m: u64,
    pub x0: u64,
}

impl GeneratorParams {
    /// Full-period constants used for vehicle contact and movement draws.
    pub const VEHICLES: Self = Self {
        a: 501,
        c: 547,
        m: 1000,
        x0: 827,
    };

    /// Full-period constants used for incident counts and locations.
    pub const INCIDENTS: Self = Self {
        a: 5001,
        c: 4607,
        m: 10000,
        x0: 4049,
    };

    pub fn new(a: u64, c: u64, m: u64, x0: u64) -> Self {
        Self { a, c, m, x0 }
    }

    /// Same multiplier, increment and modulus with a different starting state.
    pub fn with_seed(mut self, x0: u64) -> Self {
        self.x0 = x0;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomStream {
    a: u64,
    c: u64,
    m: u64,
    x: u64,
}

impl RandomStream {
    pub fn new(params: GeneratorParams) -> Result<Self> {
        let GeneratorParams { a, c, m, x0 } = params;
        let invalid = |reason| SimError::InvalidGenerator {
            a,
            c,
            m,
            x0,
            reason,
        };
        if m == 0 {
            return Err(invalid("modulus must be positive"));
        }
        if a == 0 {
            return Err(invalid("multiplier must be positive"));
        }
        if x0 >= m {
            return Err(invalid("seed must lie in [0, m)"));
        }
        Ok(Self { a, c, m, x: x0 })
    }

    pub fn params(&self) -> GeneratorParams {
        GeneratorParams {
            a: self.a,
            c: self.c,
            m: self.m,
            x0: self.x,
        }
    }

    /// Current state, i.e. the last value returned by [Self::next] (or the seed).
    pub fn state(&self) -> u64 {
        self.x
    }

    pub fn modulus(&self) -> u64 {
        self.m
    }

    /// Advance the state and return it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        // 128-bit intermediate so large moduli cannot overflow a * x.
        let next = (self.a as u128 * self.x as u128 + self.c as u128) % self.m as u128;
        self.x = next as u64;
        self.x
    }

    /// Uniform deviate in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.next() as f64 / self.m as f64
    }

    /// Poisson-distributed event count via the product-of-uniforms method.
    ///
    /// Returns 0 without consuming draws when `lambda <= 0`.
    pub fn poisson(&mut self, lambda: f64) -> u32 {
        if lambda <= 0.0 || lambda.is_nan() {
            return 0;
        }
        let threshold = (-lambda).exp();
        let mut draws: u32 = 0;
        let mut product = 1.0;
        while product > threshold {
            draws += 1;
            product *= self.uniform();
        }
        draws - 1
    }
}

/// Stream feeding incident counts, zone selection and location sampling.
#[derive(Debug, Clone, Resource)]
pub struct IncidentStream(pub RandomStream);

/// Stream feeding contact outcomes and patrol movement.
#[derive(Debug, Clone, Resource)]
pub struct VehicleStream(pub RandomStream);

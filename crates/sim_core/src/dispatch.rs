//! Vehicle selection for incidents.
//!
//! A [DispatchPolicy] receives every patrolling vehicle as a [DispatchCandidate]
//! and picks at most one. The default [NearestEtaDispatch] ranks by ETA, then by how
//! many incidents each vehicle has already been assigned, then by creation order.

use bevy_ecs::prelude::{Entity, Resource};

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchCandidate {
    pub entity: Entity,
    pub index: usize,
    pub position: Point,
    pub speed: f64,
    pub assigned_count: u32,
}

impl DispatchCandidate {
    pub fn eta_to(&self, target: Point) -> f64 {
        if self.speed <= 0.0 {
            return f64::INFINITY;
        }
        self.position.distance_to(target) / self.speed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchDecision {
    pub entity: Entity,
    pub eta: f64,
}

pub trait DispatchPolicy: Send + Sync {
    /// Choose a vehicle for an incident at `target`, or `None` when there are no candidates.
    ///
    /// Candidates are already restricted to patrolling vehicles.
    fn select(&self, target: Point, candidates: &[DispatchCandidate]) -> Option<DispatchDecision>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NearestEtaDispatch;

impl DispatchPolicy for NearestEtaDispatch {
    fn select(&self, target: Point, candidates: &[DispatchCandidate]) -> Option<DispatchDecision> {
        candidates
            .iter()
            .map(|c| (c.eta_to(target), c))
            .min_by(|(eta_a, a), (eta_b, b)| {
                eta_a
                    .total_cmp(eta_b)
                    .then_with(|| a.assigned_count.cmp(&b.assigned_count))
                    .then_with(|| a.index.cmp(&b.index))
            })
            .map(|(eta, c)| DispatchDecision {
                entity: c.entity,
                eta,
            })
    }
}

/// Resource wrapper for the dispatch policy trait object.
#[derive(Resource)]
pub struct DispatchPolicyResource(pub Box<dyn DispatchPolicy>);

impl DispatchPolicyResource {
    pub fn new(policy: Box<dyn DispatchPolicy>) -> Self {
        Self(policy)
    }
}

impl Default for DispatchPolicyResource {
    fn default() -> Self {
        Self::new(Box::new(NearestEtaDispatch))
    }
}

impl std::ops::Deref for DispatchPolicyResource {
    type Target = dyn DispatchPolicy;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

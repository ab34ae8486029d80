//! Incident generation and on-scene resolution.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Point, Region};
use crate::random::RandomStream;

/// Selection draws below this value pick the first incident zone.
pub const ZONE_SELECTION_THRESHOLD: f64 = 0.5;

/// Contact draws below this value find the affected person.
pub const CONTACT_SUCCESS_PROBABILITY: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub zone_name: String,
    pub location: Point,
}

impl Incident {
    pub fn new(zone_name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            zone_name: zone_name.into(),
            location: Point::new(x, y),
        }
    }
}

/// Incidents injected by the caller, handled at the start of the next tick
/// before any generated ones.
#[derive(Debug, Default, Resource)]
pub struct PendingIncidents(pub VecDeque<Incident>);

impl PendingIncidents {
    pub fn push(&mut self, incident: Incident) {
        self.0.push_back(incident);
    }
}

/// Pick one of the two incident zones with equal probability (one draw), then sample
/// a point inside it.
///
/// Zone choice ignores zone area. Fails when the chosen zone's shape has no sampler.
pub fn generate_incident(region: &Region, stream: &mut RandomStream) -> Result<Incident> {
    let [first, second] = &region.incident_zones;
    let chosen = if stream.uniform() < ZONE_SELECTION_THRESHOLD {
        first
    } else {
        second
    };
    let location = chosen.zone.sample(stream)?;
    Ok(Incident {
        zone_name: chosen.zone.name.clone(),
        location,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactOutcome {
    pub success: bool,
    pub draw: f64,
}

/// One draw against [CONTACT_SUCCESS_PROBABILITY]. Failed contacts are never retried.
pub fn resolve_contact(stream: &mut RandomStream) -> ContactOutcome {
    let draw = stream.uniform();
    ContactOutcome {
        success: draw < CONTACT_SUCCESS_PROBABILITY,
        draw,
    }
}

//! Incident handling for one tick: injected incidents first, then a Poisson batch
//! drawn from the incident stream. Each incident runs the full dispatch pipeline
//! before the next one starts.

use bevy_ecs::prelude::{Entity, Query, Res, ResMut};
use tracing::{debug, info, warn};

use crate::clock::SimulationClock;
use crate::dispatch::{DispatchCandidate, DispatchPolicy, DispatchPolicyResource};
use crate::ecs::{Position, Vehicle, VehicleIndex, VehicleState};
use crate::geometry::Region;
use crate::incident::{generate_incident, resolve_contact, Incident, PendingIncidents};
use crate::random::{IncidentStream, RandomStream, VehicleStream};
use crate::scenario::IncidentRate;
use crate::telemetry::{EventLog, SimEvent, SimMetrics};

type VehicleQuery<'w, 's> =
    Query<'w, 's, (Entity, &'static VehicleIndex, &'static mut Vehicle, &'static mut Position)>;

struct TickContext<'a> {
    tick: u64,
    time: f64,
    region: &'a Region,
    policy: &'a dyn DispatchPolicy,
    vehicle_stream: &'a mut RandomStream,
    metrics: &'a mut SimMetrics,
    events: Option<&'a mut EventLog>,
}

impl TickContext<'_> {
    fn record(&mut self, event: SimEvent) {
        if let Some(log) = self.events.as_deref_mut() {
            log.record(self.tick, self.time, event);
        }
    }

    fn reject(&mut self, reason: String) {
        warn!(tick = self.tick, %reason, "incident rejected");
        self.metrics.incidents_rejected += 1;
        self.record(SimEvent::IncidentRejected { reason });
    }
}

#[allow(clippy::too_many_arguments)]
pub fn incident_system(
    clock: Res<SimulationClock>,
    rate: Res<IncidentRate>,
    region: Res<Region>,
    policy: Res<DispatchPolicyResource>,
    mut incident_stream: ResMut<IncidentStream>,
    mut vehicle_stream: ResMut<VehicleStream>,
    mut pending: ResMut<PendingIncidents>,
    mut metrics: ResMut<SimMetrics>,
    mut events: Option<ResMut<EventLog>>,
    mut vehicles: VehicleQuery,
) {
    let mut ctx = TickContext {
        tick: clock.ticks(),
        time: clock.now(),
        region: &*region,
        policy: &**policy,
        vehicle_stream: &mut vehicle_stream.0,
        metrics: &mut *metrics,
        events: events.as_deref_mut(),
    };

    let injected: Vec<Incident> = pending.0.drain(..).collect();
    for incident in injected {
        ctx.record(SimEvent::IncidentGenerated {
            zone: incident.zone_name.clone(),
            x: incident.location.x,
            y: incident.location.y,
        });
        handle_incident(&mut ctx, &mut vehicles, incident);
    }

    let count = incident_stream.0.poisson(rate.0 * clock.interval());
    if count > 0 {
        debug!(tick = ctx.tick, count, "incidents drawn");
    }
    for _ in 0..count {
        match generate_incident(ctx.region, &mut incident_stream.0) {
            Ok(incident) => {
                debug!(
                    zone = %incident.zone_name,
                    x = incident.location.x,
                    y = incident.location.y,
                    "incident generated"
                );
                ctx.record(SimEvent::IncidentGenerated {
                    zone: incident.zone_name.clone(),
                    x: incident.location.x,
                    y: incident.location.y,
                });
                handle_incident(&mut ctx, &mut vehicles, incident);
            }
            Err(err) => ctx.reject(err.to_string()),
        }
    }
}

fn handle_incident(ctx: &mut TickContext<'_>, vehicles: &mut VehicleQuery, incident: Incident) {
    let region = ctx.region;
    let station = match region.transfer_station_for(&incident.zone_name) {
        Ok(station) => station,
        Err(err) => {
            ctx.reject(err.to_string());
            return;
        }
    };

    ctx.metrics.incidents_total += 1;

    let mut candidates: Vec<DispatchCandidate> = vehicles
        .iter()
        .filter(|(_, _, vehicle, _)| vehicle.is_patrolling())
        .map(|(entity, index, vehicle, position)| DispatchCandidate {
            entity,
            index: index.0,
            position: position.0,
            speed: vehicle.speed,
            assigned_count: vehicle.assigned_count,
        })
        .collect();
    candidates.sort_by_key(|c| c.index);

    let selected = ctx
        .policy
        .select(incident.location, &candidates)
        .and_then(|decision| {
            vehicles
                .get_mut(decision.entity)
                .ok()
                .map(|(_, _, vehicle, position)| (decision, vehicle, position))
        });
    let Some((decision, mut vehicle, mut position)) = selected else {
        warn!(zone = %incident.zone_name, "no patrolling vehicle available");
        ctx.metrics.incidents_failed += 1;
        ctx.metrics.incidents_unassigned += 1;
        ctx.record(SimEvent::NoVehicleAvailable {
            zone: incident.zone_name,
        });
        return;
    };

    vehicle.state = VehicleState::Dispatched;
    vehicle.assigned_count += 1;
    info!(
        vehicle = %vehicle.name,
        zone = %incident.zone_name,
        eta = decision.eta,
        "vehicle dispatched"
    );
    ctx.record(SimEvent::VehicleDispatched {
        vehicle: vehicle.name.clone(),
        eta: decision.eta,
        assigned_count: vehicle.assigned_count,
    });

    let approach = position.travel_to(incident.location);
    vehicle.total_distance += approach;
    ctx.record(SimEvent::VehicleArrived {
        vehicle: vehicle.name.clone(),
        zone: incident.zone_name.clone(),
        distance: approach,
    });

    let outcome = resolve_contact(ctx.vehicle_stream);
    ctx.record(SimEvent::ContactResolved {
        vehicle: vehicle.name.clone(),
        success: outcome.success,
        draw: outcome.draw,
    });

    if outcome.success {
        vehicle.state = VehicleState::Transferring;
        let transfer = position.travel_to(station.position);
        vehicle.total_distance += transfer;
        vehicle.served_count += 1;
        ctx.metrics.incidents_successful += 1;
        info!(
            vehicle = %vehicle.name,
            station = %station.name,
            distance = transfer,
            "transfer completed"
        );
        ctx.record(SimEvent::TransferCompleted {
            vehicle: vehicle.name.clone(),
            station: station.name.clone(),
            distance: transfer,
        });
        vehicle.state = VehicleState::Available;
    } else {
        vehicle.failed_count += 1;
        ctx.metrics.incidents_failed += 1;
        info!(vehicle = %vehicle.name, draw = outcome.draw, "contact failed");
    }

    vehicle.state = VehicleState::Patrolling;
}

//! Patrol movement policies. Neither touches a vehicle's odometer.

use crate::ecs::PatrolRoute;
use crate::geometry::{MapBounds, Point};
use crate::random::RandomStream;

/// Free-roam speed is `FREE_ROAM_BASE_SPEED * (0.5 + u)`, i.e. 2.5 to 7.5 per tick.
pub const FREE_ROAM_BASE_SPEED: f64 = 5.0;
/// Route patrol speed is `ROUTE_MIN_SPEED + ROUTE_SPEED_SPAN * u`, i.e. 3 to 5 per tick.
pub const ROUTE_MIN_SPEED: f64 = 3.0;
pub const ROUTE_SPEED_SPAN: f64 = 2.0;
/// Per-axis traffic jitter is `(u - 0.5) * ROUTE_JITTER_SCALE`, i.e. within +/-0.25.
pub const ROUTE_JITTER_SCALE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolStep {
    pub position: Point,
    pub speed: f64,
    /// Index and coordinates of the waypoint reached during this step, if any.
    pub reached: Option<(usize, Point)>,
}

/// Random offset in each axis scaled by a random speed, clamped to the map.
///
/// Draws, in order: x offset, y offset, speed.
pub fn free_roam_step(from: Point, bounds: &MapBounds, stream: &mut RandomStream) -> PatrolStep {
    let dx = (stream.uniform() - 0.5) * 2.0;
    let dy = (stream.uniform() - 0.5) * 2.0;
    let speed = FREE_ROAM_BASE_SPEED * (0.5 + stream.uniform());
    let moved = Point::new(from.x + dx * speed, from.y + dy * speed);
    PatrolStep {
        position: bounds.clamp(moved),
        speed,
        reached: None,
    }
}

/// One step toward the current waypoint, snapping to it (and advancing the route)
/// when it lies closer than this tick's travel distance.
///
/// Draws, in order: speed, x jitter, y jitter. An empty route degrades to free-roam.
pub fn route_step(
    from: Point,
    route: &mut PatrolRoute,
    bounds: &MapBounds,
    stream: &mut RandomStream,
) -> PatrolStep {
    let Some(target) = route.target() else {
        return free_roam_step(from, bounds, stream);
    };

    let dx = target.x - from.x;
    let dy = target.y - from.y;
    let distance = dx.hypot(dy);
    let speed = ROUTE_MIN_SPEED + ROUTE_SPEED_SPAN * stream.uniform();

    let mut reached = None;
    let mut next = if distance < speed {
        reached = Some((route.current_waypoint_index, target));
        route.advance();
        target
    } else {
        Point::new(from.x + dx / distance * speed, from.y + dy / distance * speed)
    };

    next.x += (stream.uniform() - 0.5) * ROUTE_JITTER_SCALE;
    next.y += (stream.uniform() - 0.5) * ROUTE_JITTER_SCALE;

    PatrolStep {
        position: bounds.clamp(next),
        speed,
        reached,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Region;
    use crate::random::GeneratorParams;

    fn bounds() -> MapBounds {
        Region::default().bounds
    }

    #[test]
    fn free_roam_moves_within_speed_and_bounds() {
        let mut stream = RandomStream::new(GeneratorParams::VEHICLES).expect("stream");
        let mut position = Point::new(32.5, 30.0);
        for _ in 0..500 {
            let step = free_roam_step(position, &bounds(), &mut stream);
            assert!((2.5..7.5).contains(&step.speed));
            assert!(bounds().contains(step.position));
            // Each axis moves by at most the drawn speed.
            assert!((step.position.x - position.x).abs() <= step.speed + 1e-9);
            assert!((step.position.y - position.y).abs() <= step.speed + 1e-9);
            position = step.position;
        }
    }

    #[test]
    fn free_roam_uses_three_draws_in_order() {
        // Draws: 0.547 -> dx, then 0.594 -> dy, then 0.141 -> speed.
        let mut stream = RandomStream::new(GeneratorParams::new(501, 547, 1000, 0)).expect("stream");
        let step = free_roam_step(Point::new(30.0, 30.0), &bounds(), &mut stream);
        let speed = 5.0 * (0.5 + 0.141);
        assert!((step.speed - speed).abs() < 1e-12);
        assert!((step.position.x - (30.0 + (0.547 - 0.5) * 2.0 * speed)).abs() < 1e-9);
        assert!((step.position.y - (30.0 + (0.594 - 0.5) * 2.0 * speed)).abs() < 1e-9);
    }

    #[test]
    fn free_roam_clamps_at_the_edge() {
        // Draws 0.0 for both offsets push toward the lower-left corner.
        let mut stream = RandomStream::new(GeneratorParams::new(1, 0, 1000, 0)).expect("stream");
        let step = free_roam_step(Point::new(0.0, -2.5), &bounds(), &mut stream);
        assert_eq!(step.position, Point::new(0.0, -2.5));
    }

    #[test]
    fn route_step_moves_toward_target() {
        let mut route = PatrolRoute::new(vec![Point::new(5.0, 90.0)]);
        let mut stream = RandomStream::new(GeneratorParams::VEHICLES).expect("stream");
        let from = Point::new(5.0, 10.0);
        let step = route_step(from, &mut route, &bounds(), &mut stream);
        assert!(step.reached.is_none());
        assert_eq!(route.current_waypoint_index, 0);
        assert!((3.0..5.0).contains(&step.speed));
        // Straight north plus at most 0.25 of jitter per axis.
        assert!((step.position.x - 5.0).abs() <= 0.25);
        assert!((step.position.y - (10.0 + step.speed)).abs() <= 0.25);
    }

    #[test]
    fn route_step_snaps_and_wraps() {
        let mut route = PatrolRoute::new(vec![Point::new(5.0, 10.0), Point::new(5.0, 90.0)]);
        route.current_waypoint_index = 1;
        let mut stream = RandomStream::new(GeneratorParams::VEHICLES).expect("stream");
        let step = route_step(Point::new(5.0, 88.0), &mut route, &bounds(), &mut stream);
        assert_eq!(step.reached, Some((1, Point::new(5.0, 90.0))));
        assert_eq!(route.current_waypoint_index, 0);
        assert!((step.position.x - 5.0).abs() <= 0.25);
        assert!(step.position.y <= 90.0 && step.position.y >= 89.75);
    }

    #[test]
    fn follows_reference_loop_indefinitely() {
        let region = Region::default();
        let mut route = PatrolRoute::from_route(&region.routes[2]);
        let mut stream = RandomStream::new(GeneratorParams::VEHICLES).expect("stream");
        let mut position = region.operations_center.position;
        let mut visited = 0;
        for _ in 0..400 {
            let step = route_step(position, &mut route, &region.bounds, &mut stream);
            if step.reached.is_some() {
                visited += 1;
            }
            position = step.position;
        }
        assert!(visited > 5, "only {visited} waypoints reached");
    }
}

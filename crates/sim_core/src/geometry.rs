//! Planar geometry: zones, stations, map bounds and patrol routes.
//!
//! Coordinates are kilometres in a local frame with the origin at the lower-left
//! corner of the map. Zones are immutable after construction; containment uses
//! an area-sum test for triangles so points on the edges are accepted despite
//! floating-point error.

use std::f64::consts::PI;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::random::RandomStream;

/// Absolute tolerance (area units) for the triangle area-sum containment test.
pub const TRIANGLE_AREA_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Triangle,
    HalfDisk,
    Rectangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZoneShape {
    Triangle {
        vertices: [Point; 3],
    },
    /// Half-disk opening downward: the half with `y <= center.y`.
    HalfDisk {
        center: Point,
        radius: f64,
    },
    Rectangle {
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },
}

impl ZoneShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ZoneShape::Triangle { .. } => ShapeKind::Triangle,
            ZoneShape::HalfDisk { .. } => ShapeKind::HalfDisk,
            ZoneShape::Rectangle { .. } => ShapeKind::Rectangle,
        }
    }
}

fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    ((a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)) / 2.0).abs()
}

fn point_in_triangle(p: Point, [v1, v2, v3]: [Point; 3]) -> bool {
    let total = triangle_area(v1, v2, v3);
    let parts = triangle_area(p, v2, v3) + triangle_area(v1, p, v3) + triangle_area(v1, v2, p);
    (total - parts).abs() < TRIANGLE_AREA_TOLERANCE
}

/// Area-uniform point inside a triangle. Draws `r1` then `r2`.
pub fn sample_triangle(vertices: [Point; 3], stream: &mut RandomStream) -> Point {
    let [v1, v2, v3] = vertices;
    let r1 = stream.uniform();
    let r2 = stream.uniform();
    let s = r1.sqrt();
    let a = 1.0 - s;
    let b = s * (1.0 - r2);
    let c = s * r2;
    Point::new(
        a * v1.x + b * v2.x + c * v3.x,
        a * v1.y + b * v2.y + c * v3.y,
    )
}

/// Area-uniform point inside the lower half-disk. Draws the radius then the angle.
pub fn sample_half_disk(center: Point, radius: f64, stream: &mut RandomStream) -> Point {
    let r = radius * stream.uniform().sqrt();
    let theta = PI * (1.0 + stream.uniform());
    Point::new(center.x + r * theta.cos(), center.y + r * theta.sin())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub shape: ZoneShape,
}

impl Zone {
    pub fn new(name: impl Into<String>, shape: ZoneShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        match self.shape {
            ZoneShape::Triangle { vertices } => point_in_triangle(p, vertices),
            ZoneShape::HalfDisk { center, radius } => {
                p.distance_to(center) <= radius && p.y <= center.y
            }
            ZoneShape::Rectangle {
                x_min,
                x_max,
                y_min,
                y_max,
            } => (x_min..=x_max).contains(&p.x) && (y_min..=y_max).contains(&p.y),
        }
    }

    /// Uniform point inside the zone, drawn from `stream`.
    ///
    /// Only triangles and half-disks carry a sampler; other shapes fail with
    /// [SimError::UnsupportedZoneShape] without consuming draws.
    pub fn sample(&self, stream: &mut RandomStream) -> Result<Point> {
        match self.shape {
            ZoneShape::Triangle { vertices } => Ok(sample_triangle(vertices, stream)),
            ZoneShape::HalfDisk { center, radius } => Ok(sample_half_disk(center, radius, stream)),
            ZoneShape::Rectangle { .. } => Err(SimError::UnsupportedZoneShape {
                zone: self.name.clone(),
                shape: self.shape.kind(),
            }),
        }
    }
}

/// Named fixed coordinate: transfer station, operations center or reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub position: Point,
}

impl Station {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            position: Point::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl MapBounds {
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.x_min, self.x_max),
            p.y.clamp(self.y_min, self.y_max),
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        (self.x_min..=self.x_max).contains(&p.x) && (self.y_min..=self.y_max).contains(&p.y)
    }
}

/// A zone that produces incidents, paired with the station its persons are taken to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentZone {
    pub zone: Zone,
    pub transfer_station: Station,
}

/// Ordered, cyclic list of waypoints for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    pub waypoints: Vec<Point>,
}

/// Read-only geography shared by every system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct Region {
    /// Exactly two incident zones; the first is picked when the selection draw is below 0.5.
    pub incident_zones: [IncidentZone; 2],
    /// Zones used only for containment checks.
    pub other_zones: Vec<Zone>,
    pub operations_center: Station,
    pub reference_points: Vec<Station>,
    pub bounds: MapBounds,
    /// `routes[i]` is followed by the vehicle with index `i`.
    pub routes: Vec<Route>,
}

impl Region {
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.incident_zones
            .iter()
            .map(|iz| &iz.zone)
            .chain(self.other_zones.iter())
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones().find(|z| z.name == name)
    }

    pub fn zones_containing(&self, p: Point) -> Vec<&str> {
        self.zones()
            .filter(|z| z.contains(p))
            .map(|z| z.name.as_str())
            .collect()
    }

    pub fn transfer_station_for(&self, zone_name: &str) -> Result<&Station> {
        self.incident_zones
            .iter()
            .find(|iz| iz.zone.name == zone_name)
            .map(|iz| &iz.transfer_station)
            .ok_or_else(|| SimError::UnknownZone(zone_name.to_string()))
    }

    pub fn route_for(&self, vehicle_index: usize) -> Option<&Route> {
        self.routes.get(vehicle_index)
    }
}

impl Default for Region {
    /// The reference map: a 65 x 92.5 km area with a triangular zone to the north,
    /// a half-disk zone to the south and a rectangular core around the operations center.
    fn default() -> Self {
        let north = Zone::new(
            "A1",
            ZoneShape::Triangle {
                vertices: [
                    Point::new(28.0, 50.0),
                    Point::new(37.0, 50.0),
                    Point::new(32.5, 90.0),
                ],
            },
        );
        let south = Zone::new(
            "A2",
            ZoneShape::HalfDisk {
                center: Point::new(32.5, 10.0),
                radius: 12.5,
            },
        );
        let core = Zone::new(
            "A3",
            ZoneShape::Rectangle {
                x_min: 20.0,
                x_max: 45.0,
                y_min: 10.0,
                y_max: 50.0,
            },
        );

        // Cross-routing: the northern zone transfers to the south-east station and vice versa.
        let north_west_station = Station::new("EP1", 0.0, 90.0);
        let south_east_station = Station::new("EP2", 65.0, 10.0);

        Self {
            incident_zones: [
                IncidentZone {
                    zone: north,
                    transfer_station: south_east_station,
                },
                IncidentZone {
                    zone: south,
                    transfer_station: north_west_station,
                },
            ],
            other_zones: vec![core],
            operations_center: Station::new("CAI", 32.5, 30.0),
            reference_points: vec![Station::new("P1", 32.5, 50.0), Station::new("P2", 32.5, 10.0)],
            bounds: MapBounds {
                x_min: 0.0,
                x_max: 65.0,
                y_min: -2.5,
                y_max: 90.0,
            },
            routes: vec![
                Route {
                    name: "west-north".into(),
                    waypoints: vec![
                        Point::new(5.0, 10.0),
                        Point::new(5.0, 90.0),
                        Point::new(32.5, 90.0),
                    ],
                },
                Route {
                    name: "south-east".into(),
                    waypoints: vec![
                        Point::new(5.0, 10.0),
                        Point::new(60.0, 10.0),
                        Point::new(60.0, 90.0),
                    ],
                },
                Route {
                    name: "operations-loop".into(),
                    waypoints: vec![
                        Point::new(32.5, 30.0),
                        Point::new(32.5, 50.0),
                        Point::new(45.0, 30.0),
                        Point::new(32.5, 10.0),
                        Point::new(20.0, 30.0),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::GeneratorParams;
    use proptest::prelude::*;

    fn reference_triangle() -> [Point; 3] {
        [
            Point::new(28.0, 50.0),
            Point::new(37.0, 50.0),
            Point::new(32.5, 90.0),
        ]
    }

    fn incident_stream() -> RandomStream {
        RandomStream::new(GeneratorParams::INCIDENTS).expect("stream")
    }

    #[test]
    fn triangle_containment_accepts_vertices_and_interior() {
        let zone = Zone::new("t", ZoneShape::Triangle { vertices: reference_triangle() });
        assert!(zone.contains(Point::new(32.5, 70.0)));
        assert!(zone.contains(Point::new(32.5, 85.0)));
        assert!(zone.contains(Point::new(28.0, 50.0)));
        assert!(!zone.contains(Point::new(32.5, 30.0)));
        assert!(!zone.contains(Point::new(20.0, 60.0)));
    }

    #[test]
    fn half_disk_opens_downward() {
        let zone = Zone::new(
            "h",
            ZoneShape::HalfDisk {
                center: Point::new(32.5, 10.0),
                radius: 12.5,
            },
        );
        assert!(zone.contains(Point::new(32.5, 5.0)));
        assert!(zone.contains(Point::new(32.5, -1.0)));
        assert!(zone.contains(Point::new(32.5, 10.0)));
        assert!(!zone.contains(Point::new(32.5, 12.0)));
        assert!(!zone.contains(Point::new(32.5, -3.0)));
    }

    #[test]
    fn rectangle_bounds_are_inclusive() {
        let region = Region::default();
        let core = region.zone("A3").expect("core zone");
        assert!(core.contains(Point::new(20.0, 10.0)));
        assert!(core.contains(Point::new(45.0, 50.0)));
        assert!(!core.contains(Point::new(45.01, 30.0)));
    }

    #[test]
    fn rectangle_has_no_sampler() {
        let region = Region::default();
        let core = region.zone("A3").expect("core zone").clone();
        let mut stream = incident_stream();
        let err = core.sample(&mut stream).expect_err("rectangle sampling must fail");
        assert_eq!(
            err,
            SimError::UnsupportedZoneShape {
                zone: "A3".into(),
                shape: ShapeKind::Rectangle
            }
        );
        assert_eq!(stream.state(), GeneratorParams::INCIDENTS.x0);
    }

    #[test]
    fn triangle_samples_are_contained_and_centered() {
        let vertices = reference_triangle();
        let zone = Zone::new("t", ZoneShape::Triangle { vertices });
        // The short-period reference streams correlate consecutive pairs, which skews
        // the centroid; a long-period generator isolates the sampler itself.
        let mut stream =
            RandomStream::new(GeneratorParams::new(1_103_515_245, 12_345, 1 << 31, 42))
                .expect("stream");
        let n = 10_000;
        let (mut sx, mut sy) = (0.0, 0.0);
        for _ in 0..n {
            let p = zone.sample(&mut stream).expect("sample");
            assert!(zone.contains(p), "{p:?} outside triangle");
            sx += p.x;
            sy += p.y;
        }
        let (cx, cy) = (sx / n as f64, sy / n as f64);
        assert!((cx - 32.5).abs() < 0.25, "centroid x {cx}");
        assert!((cy - 63.33).abs() < 0.25, "centroid y {cy}");
    }

    #[test]
    fn half_disk_samples_stay_below_center() {
        let zone = Zone::new(
            "h",
            ZoneShape::HalfDisk {
                center: Point::new(32.5, 10.0),
                radius: 12.5,
            },
        );
        let mut stream = incident_stream();
        for _ in 0..10_000 {
            let p = zone.sample(&mut stream).expect("sample");
            assert!(p.distance_to(Point::new(32.5, 10.0)) <= 12.5 + 1e-9);
            assert!(p.y <= 10.0 + 1e-9, "{p:?} above center");
        }
    }

    #[test]
    fn default_region_cross_routes_transfers() {
        let region = Region::default();
        assert_eq!(region.transfer_station_for("A1").expect("A1").name, "EP2");
        assert_eq!(region.transfer_station_for("A2").expect("A2").name, "EP1");
        assert_eq!(
            region.transfer_station_for("A3"),
            Err(SimError::UnknownZone("A3".into()))
        );
    }

    #[test]
    fn zones_containing_reports_every_match() {
        let region = Region::default();
        assert_eq!(region.zones_containing(Point::new(32.5, 30.0)), vec!["A3"]);
        assert_eq!(region.zones_containing(Point::new(32.5, 10.0)), vec!["A2", "A3"]);
        assert!(region.zones_containing(Point::new(10.0, 30.0)).is_empty());
    }

    #[test]
    fn bounds_clamp_to_map() {
        let bounds = Region::default().bounds;
        assert_eq!(bounds.clamp(Point::new(-4.0, 100.0)), Point::new(0.0, 90.0));
        assert_eq!(bounds.clamp(Point::new(70.0, -5.0)), Point::new(65.0, -2.5));
    }

    proptest! {
        #[test]
        fn sampled_triangle_points_pass_containment(seed in 0u64..10_000) {
            let zone = Zone::new("t", ZoneShape::Triangle { vertices: reference_triangle() });
            let mut stream = RandomStream::new(GeneratorParams::INCIDENTS.with_seed(seed)).unwrap();
            for _ in 0..32 {
                let p = zone.sample(&mut stream).unwrap();
                prop_assert!(zone.contains(p));
            }
        }
    }
}

//! Collision geometry: convex polygons and circles
//!
//! A shape stores its vertices in local space (relative to `origin`) and keeps a
//! world-space copy that is refreshed whenever the origin or orientation changes.
//! Polygons are normalized to counter-clockwise winding at construction, so the
//! outward normal of edge `a -> b` is `(e.y, -e.x)`.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Below this, lengths and areas are treated as zero
const GEOMETRY_EPSILON: f64 = 1e-9;

/// Reasons a shape cannot be built
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeError {
    /// Polygons need at least three vertices
    TooFewVertices(usize),
    /// All vertices are collinear or coincident
    ZeroArea,
    /// Vertices do not describe a convex polygon
    NonConvex,
    /// Circle radius must be finite and positive
    InvalidRadius(f64),
    /// A coordinate is NaN or infinite
    NonFinite,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::TooFewVertices(n) => {
                write!(f, "polygon needs at least 3 vertices, got {}", n)
            }
            ShapeError::ZeroArea => write!(f, "polygon has zero area"),
            ShapeError::NonConvex => write!(f, "polygon is not convex"),
            ShapeError::InvalidRadius(r) => write!(f, "invalid circle radius: {}", r),
            ShapeError::NonFinite => write!(f, "shape contains a non-finite coordinate"),
        }
    }
}

impl std::error::Error for ShapeError {}

/// Geometric flavour of a shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Convex polygon described by the vertex list
    Polygon,
    /// Circle around the origin; vertices are only a decorative outline
    Circle { radius: f64 },
}

/// Result of a successful narrow-phase test
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapResult {
    /// Points where the shapes touch (never empty)
    pub contact_points: Vec<DVec2>,
    /// How far the shapes interpenetrate along `separating_axis`
    pub penetration_depth: f64,
    /// Unit vector pointing from the tested shape toward the other one.
    /// Moving the other shape by `separating_axis * penetration_depth` separates them.
    pub separating_axis: DVec2,
}

/// A convex polygon or circle placed at an origin
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    origin: DVec2,
    /// Rotation of the local vertices around the origin (radians)
    orientation: f64,
    local: Vec<DVec2>,
    world: Vec<DVec2>,
}

impl Shape {
    /// Build a convex polygon from local-space vertices.
    pub fn polygon(vertices: impl Into<Vec<DVec2>>) -> Result<Self, ShapeError> {
        let mut local = vertices.into();
        if local.len() < 3 {
            return Err(ShapeError::TooFewVertices(local.len()));
        }
        if local.iter().any(|v| !v.is_finite()) {
            return Err(ShapeError::NonFinite);
        }

        let area = signed_area(&local);
        if area.abs() < GEOMETRY_EPSILON {
            return Err(ShapeError::ZeroArea);
        }
        if area < 0.0 {
            local.reverse();
        }
        if !is_convex_ccw(&local) {
            return Err(ShapeError::NonConvex);
        }

        let world = local.clone();
        Ok(Self {
            kind: ShapeKind::Polygon,
            origin: DVec2::ZERO,
            orientation: 0.0,
            local,
            world,
        })
    }

    /// Build from a built-in vertex table, skipping validation.
    ///
    /// Only the prototype tables use this; their tests run every table through
    /// the validating constructors.
    pub(crate) fn from_table(kind: ShapeKind, vertices: &[DVec2]) -> Self {
        debug_assert!(
            kind != ShapeKind::Polygon || vertices.len() >= 3,
            "polygon table with {} vertices",
            vertices.len()
        );
        let mut local = vertices.to_vec();
        if kind == ShapeKind::Polygon && signed_area(&local) < 0.0 {
            local.reverse();
        }
        let world = local.clone();
        Self {
            kind,
            origin: DVec2::ZERO,
            orientation: 0.0,
            local,
            world,
        }
    }

    /// Build a circle with no outline.
    pub fn circle(radius: f64) -> Result<Self, ShapeError> {
        Self::circle_with_outline(radius, Vec::new())
    }

    /// Build a circle that carries a decorative vertex ring for rendering.
    ///
    /// The ring never takes part in overlap tests.
    pub fn circle_with_outline(
        radius: f64,
        outline: impl Into<Vec<DVec2>>,
    ) -> Result<Self, ShapeError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ShapeError::InvalidRadius(radius));
        }
        let local = outline.into();
        if local.iter().any(|v| !v.is_finite()) {
            return Err(ShapeError::NonFinite);
        }
        let world = local.clone();
        Ok(Self {
            kind: ShapeKind::Circle { radius },
            origin: DVec2::ZERO,
            orientation: 0.0,
            local,
            world,
        })
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[inline]
    pub fn is_circular(&self) -> bool {
        matches!(self.kind, ShapeKind::Circle { .. })
    }

    /// Radius for circles, `None` for polygons
    #[inline]
    pub fn radius(&self) -> Option<f64> {
        match self.kind {
            ShapeKind::Circle { radius } => Some(radius),
            ShapeKind::Polygon => None,
        }
    }

    #[inline]
    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    #[inline]
    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// Vertices relative to the origin (counter-clockwise for polygons)
    pub fn local_vertices(&self) -> &[DVec2] {
        &self.local
    }

    /// Vertices in world space
    pub fn world_vertices(&self) -> &[DVec2] {
        &self.world
    }

    /// Move the shape so its origin sits at `origin`.
    pub fn translate(&mut self, origin: DVec2) {
        self.origin = origin;
        self.refresh_world();
    }

    /// Rotate the local vertices around the origin.
    pub fn set_orientation(&mut self, radians: f64) {
        self.orientation = radians;
        self.refresh_world();
    }

    /// Geometric center: the origin for circles, the vertex average for polygons
    pub fn center(&self) -> DVec2 {
        match self.kind {
            ShapeKind::Circle { .. } => self.origin,
            ShapeKind::Polygon => vertex_average(&self.world),
        }
    }

    /// Check if a world-space point lies inside or on the shape
    pub fn contains_point(&self, point: DVec2) -> bool {
        match self.kind {
            ShapeKind::Circle { radius } => point.distance_squared(self.origin) <= radius * radius,
            ShapeKind::Polygon => polygon_contains(&self.world, point),
        }
    }

    /// Narrow-phase overlap test.
    ///
    /// Returns `None` when the shapes are apart or merely touching.
    pub fn overlaps(&self, other: &Shape) -> Option<OverlapResult> {
        match (self.kind, other.kind) {
            (ShapeKind::Circle { radius: ra }, ShapeKind::Circle { radius: rb }) => {
                circle_circle(self.origin, ra, other.origin, rb)
            }
            (ShapeKind::Polygon, ShapeKind::Circle { radius }) => {
                polygon_circle(&self.world, other.origin, radius).map(|hit| OverlapResult {
                    contact_points: vec![hit.contact],
                    penetration_depth: hit.depth,
                    separating_axis: hit.normal,
                })
            }
            (ShapeKind::Circle { radius }, ShapeKind::Polygon) => {
                polygon_circle(&other.world, self.origin, radius).map(|hit| OverlapResult {
                    contact_points: vec![hit.contact],
                    penetration_depth: hit.depth,
                    separating_axis: -hit.normal,
                })
            }
            (ShapeKind::Polygon, ShapeKind::Polygon) => polygon_polygon(&self.world, &other.world),
        }
    }

    fn refresh_world(&mut self) {
        let rotation = DVec2::from_angle(self.orientation);
        let origin = self.origin;
        self.world.clear();
        self.world
            .extend(self.local.iter().map(|v| origin + rotation.rotate(*v)));
    }
}

/// Signed area (positive for counter-clockwise winding)
fn signed_area(vertices: &[DVec2]) -> f64 {
    let n = vertices.len();
    let mut sum = 0.0;
    for i in 0..n {
        sum += vertices[i].perp_dot(vertices[(i + 1) % n]);
    }
    sum / 2.0
}

fn is_convex_ccw(vertices: &[DVec2]) -> bool {
    let n = vertices.len();
    (0..n).all(|i| {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let c = vertices[(i + 2) % n];
        (b - a).perp_dot(c - b) >= -GEOMETRY_EPSILON
    })
}

fn vertex_average(vertices: &[DVec2]) -> DVec2 {
    if vertices.is_empty() {
        return DVec2::ZERO;
    }
    vertices.iter().copied().sum::<DVec2>() / vertices.len() as f64
}

/// Iterate `(start, end, outward_normal)` for each edge of a CCW polygon
fn edges(polygon: &[DVec2]) -> impl Iterator<Item = (DVec2, DVec2, DVec2)> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let e = b - a;
        (a, b, DVec2::new(e.y, -e.x).normalize_or_zero())
    })
}

fn polygon_contains(polygon: &[DVec2], point: DVec2) -> bool {
    edges(polygon).all(|(a, b, _)| (b - a).perp_dot(point - a) >= -GEOMETRY_EPSILON)
}

fn project(polygon: &[DVec2], axis: DVec2) -> (f64, f64) {
    polygon
        .iter()
        .map(|v| v.dot(axis))
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p), hi.max(p)))
}

/// Closest point on segment `a..b` to `point`
fn closest_point_on_segment(a: DVec2, b: DVec2, point: DVec2) -> DVec2 {
    let segment = b - a;
    let length_sq = segment.length_squared();
    if length_sq < GEOMETRY_EPSILON {
        return a;
    }
    let t = ((point - a).dot(segment) / length_sq).clamp(0.0, 1.0);
    a + segment * t
}

/// Intersection point of two segments, if they cross
fn segment_intersection(a1: DVec2, a2: DVec2, b1: DVec2, b2: DVec2) -> Option<DVec2> {
    let d1 = a2 - a1;
    let d2 = b2 - b1;
    let denominator = d1.perp_dot(d2);
    if denominator.abs() < GEOMETRY_EPSILON {
        // Parallel or collinear: vertex containment covers the overlap case
        return None;
    }
    let delta = b1 - a1;
    let t = delta.perp_dot(d2) / denominator;
    let u = delta.perp_dot(d1) / denominator;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1 + d1 * t)
    } else {
        None
    }
}

fn circle_circle(ca: DVec2, ra: f64, cb: DVec2, rb: f64) -> Option<OverlapResult> {
    let delta = cb - ca;
    let distance = delta.length();
    let radii = ra + rb;
    if distance >= radii {
        return None;
    }

    let axis = if distance > GEOMETRY_EPSILON {
        delta / distance
    } else {
        // Concentric: any axis separates them
        DVec2::Y
    };
    let depth = radii - distance;
    Some(OverlapResult {
        contact_points: vec![ca + axis * (ra - depth * 0.5)],
        penetration_depth: depth,
        separating_axis: axis,
    })
}

struct CircleHit {
    /// Unit vector from the polygon toward the circle
    normal: DVec2,
    depth: f64,
    contact: DVec2,
}

fn polygon_circle(polygon: &[DVec2], center: DVec2, radius: f64) -> Option<CircleHit> {
    let mut closest = *polygon.first()?;
    let mut closest_normal = DVec2::Y;
    let mut best = f64::MAX;
    for (a, b, normal) in edges(polygon) {
        let q = closest_point_on_segment(a, b, center);
        let d2 = q.distance_squared(center);
        if d2 < best {
            best = d2;
            closest = q;
            closest_normal = normal;
        }
    }
    let distance = best.sqrt();

    if polygon_contains(polygon, center) {
        // Center is inside: push out through the nearest edge
        return Some(CircleHit {
            normal: closest_normal,
            depth: radius + distance,
            contact: closest,
        });
    }

    if distance >= radius {
        return None;
    }
    let normal = if distance > GEOMETRY_EPSILON {
        (center - closest) / distance
    } else {
        closest_normal
    };
    Some(CircleHit {
        normal,
        depth: radius - distance,
        contact: closest,
    })
}

fn polygon_polygon(a: &[DVec2], b: &[DVec2]) -> Option<OverlapResult> {
    let mut depth = f64::MAX;
    let mut axis = DVec2::ZERO;

    for (_, _, normal) in edges(a).chain(edges(b)) {
        let (a_min, a_max) = project(a, normal);
        let (b_min, b_max) = project(b, normal);
        let overlap = a_max.min(b_max) - a_min.max(b_min);
        if overlap <= 0.0 {
            return None;
        }
        if overlap < depth {
            depth = overlap;
            axis = normal;
        }
    }

    let center_a = vertex_average(a);
    let center_b = vertex_average(b);
    if axis.dot(center_b - center_a) < 0.0 {
        axis = -axis;
    }

    let mut contacts: Vec<DVec2> = a
        .iter()
        .copied()
        .filter(|v| polygon_contains(b, *v))
        .chain(b.iter().copied().filter(|v| polygon_contains(a, *v)))
        .collect();
    for (a1, a2, _) in edges(a) {
        for (b1, b2, _) in edges(b) {
            if let Some(point) = segment_intersection(a1, a2, b1, b2) {
                contacts.push(point);
            }
        }
    }
    if contacts.is_empty() {
        contacts.push((center_a + center_b) * 0.5);
    }

    Some(OverlapResult {
        contact_points: contacts,
        penetration_depth: depth,
        separating_axis: axis,
    })
}

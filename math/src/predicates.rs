use super::Pnt2d;

/// Twice the signed area of the triangle `(a, b, c)`: positive when `c` lies left of `a -> b`.
#[inline]
pub fn orient(a: Pnt2d, b: Pnt2d, c: Pnt2d) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Shoelace signed area of a closed polygon, positive for counter-clockwise winding.
pub fn signed_area(points: &[Pnt2d]) -> f64 {
    let len = points.len();
    if len < 3 {
        return 0.0;
    }
    let twice = (0..len)
        .map(|i| {
            let (current, next) = (points[i], points[(i + 1) % len]);
            current.x * next.y - next.x * current.y
        })
        .sum::<f64>();
    twice * 0.5
}

/// Whether `point` lies on the closed segment `a -> b`.
pub fn point_on_segment(point: Pnt2d, a: Pnt2d, b: Pnt2d) -> bool {
    orient(a, b, point) == 0.0 && point.x >= a.x.min(b.x) && point.x <= a.x.max(b.x)
        && point.y >= a.y.min(b.y) && point.y <= a.y.max(b.y)
}

/// Whether the segments `a -> b` and `c -> d` cross at a single point interior to both.
/// Touching at an endpoint or overlapping collinearly is not a crossing.
pub fn segments_cross(a: Pnt2d, b: Pnt2d, c: Pnt2d, d: Pnt2d) -> bool {
    let (o1, o2) = (orient(a, b, c), orient(a, b, d));
    let (o3, o4) = (orient(c, d, a), orient(c, d, b));
    opposite_signs(o1, o2) && opposite_signs(o3, o4)
}

#[inline]
fn opposite_signs(a: f64, b: f64) -> bool {
    (a > 0.0 && b < 0.0) || (a < 0.0 && b > 0.0)
}

/// Inclusive point-in-triangle test, independent of the triangle's winding.
pub fn point_in_triangle(point: Pnt2d, a: Pnt2d, b: Pnt2d, c: Pnt2d) -> bool {
    let d1 = orient(a, b, point);
    let d2 = orient(b, c, point);
    let d3 = orient(c, a, point);
    let negative = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let positive = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(negative && positive)
}

/// Whether `point` lies on any edge of the closed polygon.
pub fn point_on_boundary(point: Pnt2d, polygon: &[Pnt2d]) -> bool {
    let len = polygon.len();
    (0..len).any(|i| point_on_segment(point, polygon[i], polygon[(i + 1) % len]))
}

/// Ray-casting parity test: a ray is cast from `point` towards positive x and the edges it
/// crosses are counted, an odd count meaning inside. Edges are treated as half-open in y so a
/// ray through a vertex is counted once. Points exactly on the boundary give an unspecified
/// answer; callers that care should test `point_on_boundary` first.
pub fn point_in_polygon(point: Pnt2d, polygon: &[Pnt2d]) -> bool {
    let len = polygon.len();
    let mut inside = false;
    for i in 0..len {
        let (a, b) = (polygon[i], polygon[(i + 1) % len]);
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if x > point.x {
                inside = !inside;
            }
        }
    }
    inside
}

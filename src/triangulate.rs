use super::errors::{ErrorKind, Result};
use super::merge::wedge_contains;
use log::trace;
use math::predicates::{orient, point_in_triangle, point_on_segment, segments_cross, signed_area};
use math::Pnt2d;

/// Remaining polygons with less area than this are collapsed into a fan instead of failing.
const AREA_EPSILON: f64 = 1e-6;

/// Splits `polygon` into `polygon.len() - 2` triangles, returned as indices into `polygon`, each
/// wound counter-clockwise. Either input winding is accepted.
pub fn triangulate(polygon: &[Pnt2d]) -> Result<Vec<[usize; 3]>> {
    let len = polygon.len();
    if len < 3 {
        return Err(ErrorKind::Triangulation { remaining: len }.into());
    }

    let mut order = (0..len).collect::<Vec<_>>();
    if signed_area(polygon) < 0.0 {
        order.reverse();
    }
    let mut points = order.iter().map(|&index| polygon[index]).collect::<Vec<_>>();
    let mut reflex = (0..len).map(|i| is_reflex(&points, i)).collect::<Vec<_>>();
    let mut triangles = Vec::with_capacity(len - 2);

    while points.len() > 3 {
        let remaining = points.len();
        let ear = match (0..remaining).find(|&i| is_ear(&points, &reflex, i)) {
            Some(ear) => ear,
            None => {
                let area = signed_area(&points);
                if area.abs() > AREA_EPSILON {
                    return Err(ErrorKind::Triangulation { remaining }.into());
                }
                trace!("Collapsing {} vertices of zero area into a fan.", remaining);
                for i in 1..remaining - 1 {
                    triangles.push([order[0], order[i], order[i + 1]]);
                }
                return Ok(triangles);
            }
        };

        let prev = (ear + remaining - 1) % remaining;
        let next = (ear + 1) % remaining;
        triangles.push([order[prev], order[ear], order[next]]);
        order.remove(ear);
        points.remove(ear);
        reflex.remove(ear);

        let remaining = points.len();
        let prev = (ear + remaining - 1) % remaining;
        let next = ear % remaining;
        reflex[prev] = is_reflex(&points, prev);
        reflex[next] = is_reflex(&points, next);
    }
    triangles.push([order[0], order[1], order[2]]);
    Ok(triangles)
}

/// Like `triangulate`, returning the triangles' points.
pub fn triangulate_points(polygon: &[Pnt2d]) -> Result<Vec<[Pnt2d; 3]>> {
    Ok(triangulate(polygon)?
        .into_iter()
        .map(|[a, b, c]| [polygon[a], polygon[b], polygon[c]])
        .collect())
}

fn is_reflex(points: &[Pnt2d], index: usize) -> bool {
    let len = points.len();
    orient(
        points[(index + len - 1) % len],
        points[index],
        points[(index + 1) % len],
    ) <= 0.0
}

fn is_ear(points: &[Pnt2d], reflex: &[bool], index: usize) -> bool {
    if reflex[index] {
        return false;
    }
    let len = points.len();
    let i_prev = (index + len - 1) % len;
    let i_next = (index + 1) % len;
    let (prev, vertex, next) = (points[i_prev], points[index], points[i_next]);

    if !wedge_contains(points, i_prev, next) || !wedge_contains(points, i_next, prev) {
        return false;
    }

    let is_corner = |point: Pnt2d| point == prev || point == vertex || point == next;
    for i_other in 0..len {
        let other = points[i_other];
        let after = points[(i_other + 1) % len];
        if segments_cross(prev, next, other, after) {
            return false;
        }
        if is_corner(other) {
            continue;
        }
        if point_on_segment(other, prev, next)
            || (reflex[i_other] && point_in_triangle(other, prev, vertex, next))
        {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod test {
    use super::{triangulate, triangulate_points};
    use crate::errors::ErrorKind;
    use crate::merge::merge;
    use math::predicates::{orient, point_in_triangle, segments_cross, signed_area};
    use math::Pnt2d;

    fn points(coords: &[(f64, f64)]) -> Vec<Pnt2d> {
        coords.iter().map(|&(x, y)| Pnt2d::new(x, y)).collect()
    }

    fn centroid(triangle: &[Pnt2d; 3]) -> Pnt2d {
        Pnt2d::new(
            (triangle[0].x + triangle[1].x + triangle[2].x) / 3.0,
            (triangle[0].y + triangle[1].y + triangle[2].y) / 3.0,
        )
    }

    fn strictly_inside(point: Pnt2d, triangle: &[Pnt2d; 3]) -> bool {
        orient(triangle[0], triangle[1], point) > 0.0
            && orient(triangle[1], triangle[2], point) > 0.0
            && orient(triangle[2], triangle[0], point) > 0.0
    }

    fn check_triangulation(polygon: &[Pnt2d]) -> Vec<[Pnt2d; 3]> {
        let triangles = triangulate_points(polygon).unwrap();
        assert_eq!(triangles.len(), polygon.len() - 2);

        let total = triangles
            .iter()
            .map(|triangle| signed_area(&triangle[..]))
            .sum::<f64>();
        assert!((total - signed_area(polygon).abs()).abs() < 1e-9);

        for (i_first, first) in triangles.iter().enumerate() {
            assert!(signed_area(&first[..]) >= 0.0, "{:?} is clockwise", first);
            for second in &triangles[i_first + 1..] {
                for i in 0..3 {
                    for j in 0..3 {
                        assert!(!segments_cross(
                            first[i],
                            first[(i + 1) % 3],
                            second[j],
                            second[(j + 1) % 3],
                        ));
                    }
                }
                if signed_area(&second[..]) > 0.0 {
                    assert!(!strictly_inside(centroid(second), first));
                }
                if signed_area(&first[..]) > 0.0 {
                    assert!(!strictly_inside(centroid(first), second));
                }
            }
        }
        triangles
    }

    #[test]
    fn simple_polygons() {
        let polygons = vec![
            points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            // L shape, clockwise.
            points(&[
                (0.0, 0.0),
                (0.0, 20.0),
                (10.0, 20.0),
                (10.0, 10.0),
                (20.0, 10.0),
                (20.0, 0.0),
            ]),
            // Comb with three teeth.
            points(&[
                (0.0, 0.0),
                (50.0, 0.0),
                (50.0, 30.0),
                (40.0, 30.0),
                (40.0, 10.0),
                (30.0, 10.0),
                (30.0, 30.0),
                (20.0, 30.0),
                (20.0, 10.0),
                (10.0, 10.0),
                (10.0, 30.0),
                (0.0, 30.0),
            ]),
            // Collinear vertices along the bottom edge.
            points(&[
                (0.0, 0.0),
                (5.0, 0.0),
                (10.0, 0.0),
                (15.0, 0.0),
                (15.0, 5.0),
                (0.0, 5.0),
            ]),
            // Arrow head with a deep notch.
            points(&[
                (0.0, 0.0),
                (8.0, 4.0),
                (16.0, 0.0),
                (8.0, 16.0),
            ]),
        ];
        for polygon in &polygons {
            check_triangulation(polygon);
        }
    }

    #[test]
    fn square_with_hole_gives_eight_triangles() {
        let outer = points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let hole = points(&[(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)]);
        let merged = merge(&outer, &hole).unwrap();
        assert_eq!(merged.len(), 10);

        let triangles = check_triangulation(&merged);
        assert_eq!(triangles.len(), 8);
        let total = triangles
            .iter()
            .map(|triangle| signed_area(&triangle[..]))
            .sum::<f64>();
        assert_eq!(total, 96.0);
        for triangle in &triangles {
            let middle = centroid(triangle);
            assert!(
                !(middle.x > 4.0 && middle.x < 6.0 && middle.y > 4.0 && middle.y < 6.0),
                "{:?} covers the hole",
                triangle
            );
            let [a, b, c] = *triangle;
            assert!(!point_in_triangle(Pnt2d::new(5.0, 5.0), a, b, c));
        }
    }

    #[test]
    fn merged_polygons_with_blockers() {
        let outer = points(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (11.0, 3.0),
            (12.0, 0.0),
            (20.0, 0.0),
            (20.0, 20.0),
            (0.0, 20.0),
        ]);
        let hole = points(&[(2.0, 3.0), (4.0, 5.0), (2.0, 6.0)]);
        check_triangulation(&merge(&outer, &hole).unwrap());

        let pinched = merge(
            &points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            &points(&[(6.0, 4.0), (10.0, 10.0), (6.0, 6.0)]),
        )
        .unwrap();
        check_triangulation(&pinched);
    }

    #[test]
    fn indices_refer_to_input() {
        let square = points(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]);
        let triangles = triangulate(&square).unwrap();
        assert_eq!(triangles.len(), 2);
        let mut used = triangles.iter().flat_map(|t| t.iter().cloned()).collect::<Vec<_>>();
        used.sort();
        used.dedup();
        assert_eq!(used, vec![0, 1, 2, 3]);
    }

    #[test]
    fn self_intersecting_polygon_fails() {
        let crossed = points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (4.0, -4.0)]);
        match triangulate(&crossed) {
            Err(error) => assert_eq!(error.kind(), &ErrorKind::Triangulation { remaining: 4 }),
            Ok(triangles) => panic!("triangulated into {:?}", triangles),
        }
    }

    #[test]
    fn degenerate_inputs() {
        let error = triangulate(&points(&[(0.0, 0.0), (1.0, 1.0)])).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::Triangulation { remaining: 2 });

        let flat = points(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (5.0, 0.0)]);
        let triangles = triangulate_points(&flat).unwrap();
        assert_eq!(triangles.len(), 2);
        assert!(triangles
            .iter()
            .all(|triangle| signed_area(&triangle[..]) == 0.0));
    }
}

use super::containment::Region;
use super::errors::{ErrorKind, Result};
use super::loops::{Loop, Winding};
use log::{debug, trace};
use math::predicates::{orient, point_in_triangle};
use math::Pnt2d;
use std::cmp::Ordering;

// Holes are spliced in with the opposite winding, so the interior is always on the left.
const OUTER_WINDING: Winding = Winding::CounterClockwise;

/// Merges every hole of `region` into its outer loop, rightmost hole first. The result is wound
/// counter-clockwise.
pub fn merge_holes(loops: &[Loop], region: &Region) -> Result<Vec<Pnt2d>> {
    let mut outer = loops[region.outer].clone();
    outer.set_winding(OUTER_WINDING);
    let mut merged = outer.into_points();

    let mut remaining = region
        .holes
        .iter()
        .map(|&hole_id| (hole_id, loops[hole_id].points()))
        .collect::<Vec<_>>();
    while let Some(next) = select_next_hole(&remaining) {
        let (hole_id, hole) = remaining.swap_remove(next);
        merged = merge(&merged, hole).ok_or(ErrorKind::NoBridge { hole: hole_id })?;
        debug!(
            "Merged hole {} into loop {}, now {} vertices.",
            hole_id,
            region.outer,
            merged.len()
        );
    }
    Ok(merged)
}

/// Index of the hole holding the rightmost vertex among all `holes`. Ties go to the hole with the
/// lowest loop id.
pub fn select_next_hole(holes: &[(usize, &[Pnt2d])]) -> Option<usize> {
    holes
        .iter()
        .enumerate()
        .filter_map(|(index, &(hole_id, points))| {
            rightmost(points).map(|i_point| (index, hole_id, points[i_point].x))
        })
        .min_by(|&(_, left_id, left_x), &(_, right_id, right_x)| {
            right_x
                .partial_cmp(&left_x)
                .unwrap_or(Ordering::Equal)
                .then(left_id.cmp(&right_id))
        })
        .map(|(index, _, _)| index)
}

/// Splices `hole` into `outer`, returning `None` when no vertex of `outer` is visible from the
/// hole, which happens when the hole is not inside `outer` at all. Either input may have either
/// winding; the result is counter-clockwise.
pub fn merge(outer: &[Pnt2d], hole: &[Pnt2d]) -> Option<Vec<Pnt2d>> {
    if outer.len() < 3 || hole.len() < 3 {
        return None;
    }
    let mut outer = Loop::new(outer.to_vec());
    outer.set_winding(OUTER_WINDING);
    let mut hole = Loop::new(hole.to_vec());
    hole.set_winding(OUTER_WINDING.opposite());
    let (outer, hole) = (outer.into_points(), hole.into_points());

    let i_hole = rightmost(&hole)?;
    let bridge_from = hole[i_hole];
    let i_outer = find_visible(&outer, bridge_from)?;
    let bridge_to = outer[i_outer];
    trace!("Bridge {:?} -> {:?}.", bridge_from, bridge_to);

    let mut merged = Vec::with_capacity(outer.len() + hole.len() + 2);
    merged.extend_from_slice(&outer[..=i_outer]);
    if bridge_from == bridge_to {
        // The hole touches the outer loop; a single pinch vertex joins them.
        merged.extend(hole[i_hole + 1..].iter().chain(&hole[..i_hole]));
    } else {
        merged.extend(hole[i_hole..].iter().chain(&hole[..i_hole]));
        merged.push(bridge_from);
    }
    merged.push(bridge_to);
    merged.extend_from_slice(&outer[i_outer + 1..]);
    Some(merged)
}

/// First point with the largest x coordinate.
fn rightmost(points: &[Pnt2d]) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, point)| match best {
            Some((_, best_x)) if best_x >= point.x => best,
            _ => Some((index, point.x)),
        })
        .map(|(index, _)| index)
}

/// Index of a vertex of the counter-clockwise polygon `outer` such that the segment from `from`
/// to it crosses no edge of `outer`.
fn find_visible(outer: &[Pnt2d], from: Pnt2d) -> Option<usize> {
    let len = outer.len();

    // Nearest point hit by a ray from `from` towards positive x. Vertices on the ray are hits in
    // their own right; otherwise only upward edges count, as the ray leaves the interior through
    // those.
    let mut nearest: Option<(f64, Hit)> = None;
    let mut consider = |x: f64, hit: Hit| {
        if x >= from.x && nearest.map_or(true, |(best_x, _)| x < best_x) {
            nearest = Some((x, hit));
        }
    };
    for i_vertex in 0..len {
        let (start, end) = (outer[i_vertex], outer[(i_vertex + 1) % len]);
        if start.y == from.y {
            consider(start.x, Hit::Vertex(i_vertex));
        } else if start.y < from.y && from.y < end.y {
            let x = start.x + (from.y - start.y) * (end.x - start.x) / (end.y - start.y);
            consider(x, Hit::Edge(i_vertex));
        }
    }

    let (hit_x, hit) = nearest?;
    let candidate = match hit {
        Hit::Vertex(i_vertex) => return Some(pick_duplicate(outer, i_vertex, from)),
        Hit::Edge(i_start) => {
            let i_end = (i_start + 1) % len;
            let (start, end) = (outer[i_start], outer[i_end]);
            if start.x > end.x {
                i_start
            } else if end.x > start.x {
                i_end
            } else if (end.y - from.y).abs() < (start.y - from.y).abs() {
                i_end
            } else if (start.y - from.y).abs() < (end.y - from.y).abs() {
                i_start
            } else {
                i_start.min(i_end)
            }
        }
    };
    let hit_point = Pnt2d::new(hit_x, from.y);
    let candidate_point = outer[candidate];

    // A reflex vertex inside the triangle between the ray and the candidate may block the view;
    // the one closest in angle to the ray is then visible instead.
    let blocker = (0..len)
        .filter(|&i_vertex| {
            let vertex = outer[i_vertex];
            vertex != candidate_point
                && is_reflex(outer, i_vertex)
                && point_in_triangle(vertex, from, hit_point, candidate_point)
        })
        .map(|i_vertex| {
            let offset = outer[i_vertex] - from;
            let angle = offset.y.atan2(offset.x).abs();
            (i_vertex, angle, offset.x * offset.x + offset.y * offset.y)
        })
        .min_by(|&(_, left_angle, left_dist), &(_, right_angle, right_dist)| {
            left_angle
                .partial_cmp(&right_angle)
                .unwrap_or(Ordering::Equal)
                .then(left_dist.partial_cmp(&right_dist).unwrap_or(Ordering::Equal))
        })
        .map(|(i_vertex, _, _)| i_vertex);

    Some(pick_duplicate(outer, blocker.unwrap_or(candidate), from))
}

#[derive(Copy, Clone, Debug)]
enum Hit {
    Vertex(usize),
    Edge(usize),
}

/// Collinear vertices count as reflex, so they are never skipped as blockers.
fn is_reflex(polygon: &[Pnt2d], index: usize) -> bool {
    let len = polygon.len();
    let prev = polygon[(index + len - 1) % len];
    let next = polygon[(index + 1) % len];
    orient(prev, polygon[index], next) <= 0.0
}

/// Among the copies of `outer[index]` left by earlier seams, picks the one whose interior wedge
/// contains the direction towards `target`.
fn pick_duplicate(outer: &[Pnt2d], index: usize, target: Pnt2d) -> usize {
    let point = outer[index];
    let copies = (0..outer.len())
        .filter(|&i_copy| outer[i_copy] == point)
        .collect::<Vec<_>>();
    if copies.len() < 2 {
        return index;
    }
    copies
        .into_iter()
        .find(|&i_copy| wedge_contains(outer, i_copy, target))
        .unwrap_or(index)
}

/// Whether the direction from `polygon[index]` to `target` starts inside the counter-clockwise
/// polygon.
pub(crate) fn wedge_contains(polygon: &[Pnt2d], index: usize, target: Pnt2d) -> bool {
    let len = polygon.len();
    let prev = polygon[(index + len - 1) % len];
    let vertex = polygon[index];
    let next = polygon[(index + 1) % len];
    let left_of_incoming = orient(prev, vertex, target) > 0.0;
    let left_of_outgoing = orient(vertex, next, target) > 0.0;
    if orient(prev, vertex, next) > 0.0 {
        left_of_incoming && left_of_outgoing
    } else {
        left_of_incoming || left_of_outgoing
    }
}

#[cfg(test)]
mod test {
    use super::{merge, merge_holes, select_next_hole};
    use crate::containment::Region;
    use crate::errors::ErrorKind;
    use crate::loops::Loop;
    use math::predicates::{segments_cross, signed_area};
    use math::Pnt2d;

    fn points(coords: &[(f64, f64)]) -> Vec<Pnt2d> {
        coords.iter().map(|&(x, y)| Pnt2d::new(x, y)).collect()
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<Pnt2d> {
        points(&[(x, y), (x + size, y), (x + size, y + size), (x, y + size)])
    }

    fn assert_no_crossings(polygon: &[Pnt2d]) {
        let len = polygon.len();
        for i in 0..len {
            for j in 0..len {
                let (a, b) = (polygon[i], polygon[(i + 1) % len]);
                let (c, d) = (polygon[j], polygon[(j + 1) % len]);
                assert!(
                    !segments_cross(a, b, c, d),
                    "edges {:?}-{:?} and {:?}-{:?} cross",
                    a,
                    b,
                    c,
                    d
                );
            }
        }
    }

    #[test]
    fn square_with_square_hole() {
        let outer = points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let hole = points(&[(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)]);
        let merged = merge(&outer, &hole).unwrap();
        assert_eq!(
            merged,
            points(&[
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (6.0, 6.0),
                (6.0, 4.0),
                (4.0, 4.0),
                (4.0, 6.0),
                (6.0, 6.0),
                (10.0, 10.0),
                (0.0, 10.0),
            ])
        );
        assert_eq!(signed_area(&merged), 96.0);
        assert_no_crossings(&merged);

        // Same result whatever the input windings.
        let mut reversed_outer = outer.clone();
        reversed_outer.reverse();
        let mut reversed_hole = hole.clone();
        reversed_hole.reverse();
        let merged = merge(&reversed_outer, &reversed_hole).unwrap();
        assert_eq!(merged.len(), 10);
        assert_eq!(signed_area(&merged), 96.0);
    }

    #[test]
    fn reflex_vertex_blocks_the_ray_endpoint() {
        // Spike rising from the bottom wall into the triangle between the ray and (20, 0).
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
        let merged = merge(&outer, &hole).unwrap();
        assert_eq!(merged.len(), 12);
        assert_eq!(merged[2], Pnt2d::new(11.0, 3.0));
        assert_eq!(merged[3], Pnt2d::new(4.0, 5.0));
        assert_eq!(merged[6], Pnt2d::new(4.0, 5.0));
        assert_eq!(merged[7], Pnt2d::new(11.0, 3.0));
        assert_eq!(signed_area(&merged), 394.0);
        assert_no_crossings(&merged);
    }

    #[test]
    fn ray_through_vertex_bridges_to_it() {
        let outer = points(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (20.0, 5.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ]);
        let hole = points(&[(2.0, 4.0), (4.0, 5.0), (2.0, 6.0)]);
        let merged = merge(&outer, &hole).unwrap();
        assert_eq!(merged[2], Pnt2d::new(20.0, 5.0));
        assert_eq!(merged[3], Pnt2d::new(4.0, 5.0));
        assert_eq!(merged.len(), 10);
        assert_no_crossings(&merged);
    }

    #[test]
    fn hole_touching_outer_vertex_is_pinched() {
        let outer = square(0.0, 0.0, 10.0);
        let hole = points(&[(6.0, 4.0), (10.0, 10.0), (6.0, 6.0)]);
        let merged = merge(&outer, &hole).unwrap();
        assert_eq!(merged.len(), 4 + 3);
        assert_eq!(
            merged.iter().filter(|&&p| p == Pnt2d::new(10.0, 10.0)).count(),
            2
        );
        assert_eq!(signed_area(&merged), 100.0 - 4.0);
    }

    #[test]
    fn hole_outside_has_no_bridge() {
        assert_eq!(merge(&square(0.0, 0.0, 10.0), &square(20.0, 0.0, 2.0)), None);

        let loops = vec![
            Loop::new(square(0.0, 0.0, 10.0)),
            Loop::new(square(20.0, 0.0, 2.0)),
        ];
        let region = Region {
            outer: 0,
            holes: vec![1],
        };
        match merge_holes(&loops, &region) {
            Err(error) => assert_eq!(error.kind(), &ErrorKind::NoBridge { hole: 1 }),
            Ok(merged) => panic!("merged {:?}", merged),
        }
    }

    #[test]
    fn holes_are_merged_rightmost_first() {
        let left = square(2.0, 2.0, 2.0);
        let right = square(12.0, 12.0, 2.0);
        let tied = square(10.0, 2.0, 4.0);
        assert_eq!(select_next_hole(&[(0, &left[..]), (1, &right[..])]), Some(1));
        assert_eq!(select_next_hole(&[(5, &tied[..]), (3, &right[..])]), Some(1));
        assert_eq!(select_next_hole(&[(3, &right[..]), (5, &tied[..])]), Some(0));
        assert_eq!(select_next_hole(&[]), None);
    }

    #[test]
    fn several_holes_merge_into_one_polygon() {
        let loops = vec![
            Loop::new(square(0.0, 0.0, 20.0)),
            Loop::new(square(4.0, 8.0, 2.0)),
            Loop::new(square(12.0, 8.0, 2.0)),
            Loop::new(square(2.0, 14.0, 3.0)),
        ];
        let region = Region {
            outer: 0,
            holes: vec![1, 2, 3],
        };
        let merged = merge_holes(&loops, &region).unwrap();
        assert_eq!(merged.len(), 4 + 3 * 6);
        assert_eq!(signed_area(&merged), 400.0 - 4.0 - 4.0 - 9.0);
        assert_no_crossings(&merged);
    }
}

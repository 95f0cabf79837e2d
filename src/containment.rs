use super::errors::{ErrorKind, Result};
use super::loops::Loop;
use log::{debug, trace};
use math::predicates::{point_in_polygon, point_on_boundary, segments_cross};
use math::Pnt2d;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainmentNode {
    pub loop_id: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Number of loops enclosing this one.
    pub depth: usize,
}

/// One connected piece of floor: an outer loop and the loops directly inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub outer: usize,
    pub holes: Vec<usize>,
}

/// Loops indexed by their position in the slice given to `classify`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainmentForest {
    nodes: Vec<ContainmentNode>,
}

impl ContainmentForest {
    pub fn nodes(&self) -> &[ContainmentNode] {
        &self.nodes
    }

    pub fn node(&self, loop_id: usize) -> Option<&ContainmentNode> {
        self.nodes.get(loop_id)
    }

    pub fn roots<'a>(&'a self) -> impl Iterator<Item = usize> + 'a {
        self.nodes
            .iter()
            .filter(|node| node.parent.is_none())
            .map(|node| node.loop_id)
    }

    /// Every loop at even depth is the outer boundary of a region whose holes are its children.
    /// An island inside a hole thus becomes a region of its own.
    pub fn regions(&self) -> Vec<Region> {
        self.nodes
            .iter()
            .filter(|node| node.depth % 2 == 0)
            .map(|node| Region {
                outer: node.loop_id,
                holes: node.children.clone(),
            })
            .collect()
    }
}

/// Builds the containment forest of `loops`. Loops are assumed not to cross each other; a pair
/// which does is treated as unrelated. Loops of fewer than three points neither contain nor are
/// contained by anything.
pub fn classify(loops: &[Loop]) -> Result<ContainmentForest> {
    let containers = (0..loops.len())
        .map(|inner| {
            (0..loops.len())
                .filter(|&outer| outer != inner && is_inside(&loops[inner], &loops[outer]))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut nodes = (0..loops.len())
        .map(|loop_id| ContainmentNode {
            loop_id,
            parent: None,
            children: Vec::new(),
            depth: containers[loop_id].len(),
        })
        .collect::<Vec<_>>();

    for inner in 0..loops.len() {
        let parent = match containers[inner]
            .iter()
            .cloned()
            .max_by_key(|&outer| (containers[outer].len(), std::cmp::Reverse(outer)))
        {
            Some(parent) => parent,
            None => continue,
        };
        // The immediate parent must sit inside every other container, and must not itself be
        // inside `inner`.
        if containers[parent].contains(&inner)
            || containers[inner]
                .iter()
                .any(|&outer| outer != parent && !containers[parent].contains(&outer))
        {
            return Err(ErrorKind::ContainmentCycle { loop_id: inner }.into());
        }
        trace!("Loop {} is directly inside loop {}.", inner, parent);
        nodes[inner].parent = Some(parent);
        nodes[parent].children.push(inner);
    }

    let forest = ContainmentForest { nodes };
    debug!(
        "Classified {} loops into {} roots.",
        loops.len(),
        forest.roots().count()
    );
    Ok(forest)
}

/// Whether `inner` lies inside `outer`: no edges cross and a point of `inner` away from `outer`'s
/// boundary is inside it by ray parity.
pub fn is_inside(inner: &Loop, outer: &Loop) -> bool {
    if inner.len() < 3 || outer.len() < 3 {
        return false;
    }
    let crosses = inner.edges().any(|(a, b)| {
        outer
            .edges()
            .any(|(c, d)| segments_cross(a, b, c, d))
    });
    if crosses {
        return false;
    }
    test_point(inner, outer).map_or(false, |point| point_in_polygon(point, outer.points()))
}

// A vertex of `inner` off `outer`'s boundary, else such an edge midpoint, else any vertex.
fn test_point(inner: &Loop, outer: &Loop) -> Option<Pnt2d> {
    let points = inner.points();
    points
        .iter()
        .cloned()
        .find(|&point| !point_on_boundary(point, outer.points()))
        .or_else(|| {
            inner
                .edges()
                .map(|(a, b)| Pnt2d::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5))
                .find(|&middle| !point_on_boundary(middle, outer.points()))
        })
        .or_else(|| points.first().cloned())
}

#[cfg(test)]
mod test {
    use super::{classify, is_inside, Region};
    use crate::errors::ErrorKind;
    use crate::loops::Loop;
    use math::Pnt2d;

    fn square(x: f64, y: f64, size: f64) -> Loop {
        Loop::new(vec![
            Pnt2d::new(x, y),
            Pnt2d::new(x, y + size),
            Pnt2d::new(x + size, y + size),
            Pnt2d::new(x + size, y),
        ])
    }

    #[test]
    fn room_with_pillar() {
        let loops = vec![square(4.0, 4.0, 2.0), square(0.0, 0.0, 10.0)];
        assert!(is_inside(&loops[0], &loops[1]));
        assert!(!is_inside(&loops[1], &loops[0]));

        let forest = classify(&loops).unwrap();
        assert_eq!(forest.roots().collect::<Vec<_>>(), vec![1]);
        assert_eq!(forest.node(0).unwrap().parent, Some(1));
        assert_eq!(forest.node(1).unwrap().children, vec![0]);
        assert_eq!(
            forest.regions(),
            vec![Region {
                outer: 1,
                holes: vec![0]
            }]
        );
    }

    #[test]
    fn nested_loops_keep_immediate_parents() {
        // Room, pillar inside it, an island inside the pillar, and a hole in the island.
        let loops = vec![
            square(3.0, 3.0, 2.0),
            square(0.0, 0.0, 20.0),
            square(2.0, 2.0, 6.0),
            square(1.0, 1.0, 10.0),
        ];
        let forest = classify(&loops).unwrap();
        let parents = forest
            .nodes()
            .iter()
            .map(|node| node.parent)
            .collect::<Vec<_>>();
        assert_eq!(parents, vec![Some(2), None, Some(3), Some(1)]);
        assert_eq!(
            forest.regions(),
            vec![
                Region {
                    outer: 1,
                    holes: vec![3]
                },
                Region {
                    outer: 2,
                    holes: vec![0]
                },
            ]
        );
    }

    #[test]
    fn disjoint_loops_are_separate_roots() {
        let loops = vec![square(0.0, 0.0, 10.0), square(20.0, 0.0, 10.0)];
        let forest = classify(&loops).unwrap();
        assert_eq!(forest.roots().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(forest.regions().len(), 2);
    }

    #[test]
    fn hole_touching_outer_wall_is_inside() {
        // Notch sharing two vertices with the room's left wall.
        let notch = Loop::new(vec![
            Pnt2d::new(0.0, 4.0),
            Pnt2d::new(3.0, 4.0),
            Pnt2d::new(3.0, 6.0),
            Pnt2d::new(0.0, 6.0),
        ]);
        let room = square(0.0, 0.0, 10.0);
        assert!(is_inside(&notch, &room));
        assert!(!is_inside(&room, &notch));
    }

    #[test]
    fn degenerate_loops_are_left_alone() {
        let loops = vec![
            Loop::new(vec![]),
            square(0.0, 0.0, 10.0),
            Loop::new(vec![Pnt2d::new(2.0, 2.0), Pnt2d::new(3.0, 3.0)]),
        ];
        let forest = classify(&loops).unwrap();
        assert_eq!(forest.roots().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(forest.node(1).unwrap().children.is_empty());
    }

    #[test]
    fn crossing_loops_are_unrelated() {
        let loops = vec![square(0.0, 0.0, 10.0), square(5.0, 5.0, 10.0)];
        assert!(!is_inside(&loops[0], &loops[1]));
        assert!(!is_inside(&loops[1], &loops[0]));
        assert_eq!(classify(&loops).unwrap().roots().count(), 2);
    }

    #[test]
    fn duplicate_loops_are_a_cycle() {
        let loops = vec![square(0.0, 0.0, 10.0), square(0.0, 0.0, 10.0)];
        match classify(&loops) {
            Err(error) => assert_eq!(
                error.kind(),
                &ErrorKind::ContainmentCycle { loop_id: 0 }
            ),
            Ok(forest) => panic!("accepted {:?}", forest),
        }
    }
}

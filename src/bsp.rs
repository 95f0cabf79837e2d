use super::errors::{ErrorKind, Result};
use log::{debug, info, warn};
use math::{vec2, Aabb2, Line2d, Pnt2d};
use wad::types::{WadNode, WadSubsector};
use wad::util::parse_child_id;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Child {
    Node(usize),
    Subsector(usize),
}

/// Side of a partition line. `Front` is the right hand side when looking along the partition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
}

impl Side {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Front => 0,
            Side::Back => 1,
        }
    }

    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BspNode {
    pub partition: Line2d,
    /// Advisory bounds of each child, indexed by `Side::index`.
    pub bounds: [Aabb2; 2],
    pub children: [Child; 2],
}

impl BspNode {
    /// Points strictly right of the partition are in front; points on it go to the back.
    #[inline]
    pub fn side_of(&self, point: Pnt2d) -> Side {
        if self.partition.side_value(point) < 0.0 {
            Side::Front
        } else {
            Side::Back
        }
    }

    #[inline]
    pub fn child(&self, side: Side) -> Child {
        self.children[side.index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Subsector {
    pub first_seg: usize,
    pub num_segs: usize,
}

/// Called by `BspIndex::walk` for every subsector reached.
pub trait BspVisitor {
    fn visit_subsector(&mut self, subsector: usize);

    /// Asked before descending into the far side of a node; returning `false` skips that child.
    /// The near side is always visited.
    fn check_bounds(&mut self, _bounds: &Aabb2) -> bool {
        true
    }
}

impl<F: FnMut(usize)> BspVisitor for F {
    fn visit_subsector(&mut self, subsector: usize) {
        self(subsector)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Order {
    FrontToBack,
    BackToFront,
}

/// The level's partition tree, read once from its node and subsector tables. The root is the last
/// node, or the only subsector of a level without nodes.
#[derive(Clone, Debug)]
pub struct BspIndex {
    nodes: Vec<BspNode>,
    subsectors: Vec<Subsector>,
    root: Child,
    depth: usize,
    shared_leaves: bool,
}

impl BspIndex {
    pub fn build(nodes: &[WadNode], subsectors: &[WadSubsector]) -> Result<BspIndex> {
        info!(
            "Building BSP index from {} nodes and {} subsectors...",
            nodes.len(),
            subsectors.len()
        );
        let subsectors = subsectors
            .iter()
            .map(|subsector| Subsector {
                first_seg: usize::from(subsector.first_seg),
                num_segs: usize::from(subsector.num_segs),
            })
            .collect::<Vec<_>>();

        let mut built = Vec::with_capacity(nodes.len());
        for (i_node, node) in nodes.iter().enumerate() {
            let partition = partition_line(node);
            if partition.is_degenerate() {
                return Err(ErrorKind::DegeneratePartition { node: i_node }.into());
            }
            let right = parse_child(i_node, node.right, nodes.len(), subsectors.len())?;
            let left = parse_child(i_node, node.left, nodes.len(), subsectors.len())?;
            built.push(BspNode {
                partition,
                bounds: [
                    Aabb2::from_extents(
                        f64::from(node.right_x_min),
                        f64::from(node.right_x_max),
                        f64::from(node.right_y_min),
                        f64::from(node.right_y_max),
                    ),
                    Aabb2::from_extents(
                        f64::from(node.left_x_min),
                        f64::from(node.left_x_max),
                        f64::from(node.left_y_min),
                        f64::from(node.left_y_max),
                    ),
                ],
                children: [right, left],
            });
        }

        let root = if built.is_empty() {
            if subsectors.is_empty() {
                return Err(ErrorKind::EmptyTree.into());
            }
            Child::Subsector(0)
        } else {
            Child::Node(built.len() - 1)
        };

        let mut index = BspIndex {
            nodes: built,
            subsectors,
            root,
            depth: 0,
            shared_leaves: false,
        };
        index.check_tree()?;
        info!(
            "BSP index ready: depth {}, {} nodes, {} subsectors.",
            index.depth,
            index.nodes.len(),
            index.subsectors.len()
        );
        Ok(index)
    }

    /// Walks the whole tree once, rejecting nodes reachable along two paths (which also rules out
    /// cycles) and recording the depth, so queries never need to guard against either.
    fn check_tree(&mut self) -> Result<()> {
        let mut node_seen = vec![false; self.nodes.len()];
        let mut leaf_refs = vec![0usize; self.subsectors.len()];
        let mut stack = vec![(self.root, 1)];
        let mut depth = 0;
        while let Some((child, child_depth)) = stack.pop() {
            depth = depth.max(child_depth);
            match child {
                Child::Subsector(id) => leaf_refs[id] += 1,
                Child::Node(id) => {
                    if node_seen[id] {
                        return Err(ErrorKind::NotATree { node: id }.into());
                    }
                    node_seen[id] = true;
                    for &next in &self.nodes[id].children {
                        stack.push((next, child_depth + 1));
                    }
                }
            }
        }

        let unreachable = node_seen.iter().filter(|&&seen| !seen).count();
        if unreachable > 0 {
            warn!("{} BSP nodes are unreachable from the root.", unreachable);
        }
        let unreferenced = leaf_refs.iter().filter(|&&refs| refs == 0).count();
        if unreferenced > 0 {
            warn!("{} subsectors are never referenced by a node.", unreferenced);
        }
        self.shared_leaves = leaf_refs.iter().any(|&refs| refs > 1);
        if self.shared_leaves {
            warn!("Some subsectors have more than one parent node.");
        }
        self.depth = depth;
        Ok(())
    }

    pub fn root(&self) -> Child {
        self.root
    }

    /// Number of nodes on the longest root-to-leaf path, leaf included.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> Option<&BspNode> {
        self.nodes.get(id)
    }

    pub fn subsectors(&self) -> &[Subsector] {
        &self.subsectors
    }

    pub fn subsector(&self, id: usize) -> Option<Subsector> {
        self.subsectors.get(id).cloned()
    }

    /// Id of the subsector containing `point`. Every finite point lands in exactly one leaf.
    pub fn locate(&self, point: Pnt2d) -> Result<usize> {
        check_finite(point)?;
        let mut child = self.root;
        loop {
            match child {
                Child::Subsector(id) => return Ok(id),
                Child::Node(id) => {
                    let node = &self.nodes[id];
                    child = node.child(node.side_of(point));
                }
            }
        }
    }

    /// Visits every subsector once, those nearer to `viewpoint` first.
    pub fn traverse_front_to_back<F: FnMut(usize)>(
        &self,
        viewpoint: Pnt2d,
        mut visit: F,
    ) -> Result<()> {
        self.walk(viewpoint, Order::FrontToBack, &mut visit)
    }

    /// Visits every subsector once, those farther from `viewpoint` first.
    pub fn traverse_back_to_front<F: FnMut(usize)>(
        &self,
        viewpoint: Pnt2d,
        mut visit: F,
    ) -> Result<()> {
        self.walk(viewpoint, Order::BackToFront, &mut visit)
    }

    pub fn walk<V: BspVisitor>(
        &self,
        viewpoint: Pnt2d,
        order: Order,
        visitor: &mut V,
    ) -> Result<()> {
        check_finite(viewpoint)?;
        let mut visited = if self.shared_leaves {
            vec![false; self.subsectors.len()]
        } else {
            Vec::new()
        };
        let mut stack = Vec::with_capacity(self.depth + 1);
        stack.push(self.root);
        while let Some(child) = stack.pop() {
            match child {
                Child::Subsector(id) => {
                    if let Some(seen) = visited.get_mut(id) {
                        if *seen {
                            continue;
                        }
                        *seen = true;
                    }
                    visitor.visit_subsector(id);
                }
                Child::Node(id) => {
                    let node = &self.nodes[id];
                    let near = node.side_of(viewpoint);
                    let far = near.opposite();
                    let visit_far = visitor.check_bounds(&node.bounds[far.index()]);
                    // Popped in reverse push order.
                    match order {
                        Order::FrontToBack => {
                            if visit_far {
                                stack.push(node.child(far));
                            }
                            stack.push(node.child(near));
                        }
                        Order::BackToFront => {
                            stack.push(node.child(near));
                            if visit_far {
                                stack.push(node.child(far));
                            }
                        }
                    }
                }
            }
        }
        debug!("BSP walk from {:?} done.", viewpoint);
        Ok(())
    }
}

fn check_finite(point: Pnt2d) -> Result<()> {
    if point.x.is_finite() && point.y.is_finite() {
        Ok(())
    } else {
        Err(ErrorKind::InvalidQuery.into())
    }
}

fn parse_child(node: usize, child: u16, num_nodes: usize, num_subsectors: usize) -> Result<Child> {
    let (id, is_leaf) = parse_child_id(child);
    if is_leaf && id < num_subsectors {
        Ok(Child::Subsector(id))
    } else if !is_leaf && id < num_nodes {
        Ok(Child::Node(id))
    } else {
        Err(ErrorKind::BadChild { node, child }.into())
    }
}

fn partition_line(node: &WadNode) -> Line2d {
    Line2d::from_origin_and_displace(
        Pnt2d::new(f64::from(node.line_x), f64::from(node.line_y)),
        vec2(f64::from(node.step_x), f64::from(node.step_y)),
    )
}

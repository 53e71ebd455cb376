//! In-memory scene graph.

use std::collections::HashMap;

use drawkit_core::{
    Affine2, GeometryError, GeometryResult, NodeId, NodeTransform, Point, Rect, ShapeKind,
};

use super::{NodeFlags, SceneEditor, SceneGraph, ZOrder};

/// A node stored in a [`Scene`].
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub kind: Option<ShapeKind>,
    pub flags: NodeFlags,
    pub transform: NodeTransform,
    /// Drawable content in local space; containers have none.
    pub content: Option<Rect>,
    pub text_area: Option<Rect>,
    pub corner_radius: Option<f64>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    redraws: u32,
}

impl SceneNode {
    fn new(id: NodeId, name: impl Into<String>, kind: Option<ShapeKind>, flags: NodeFlags) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            flags,
            transform: NodeTransform::default(),
            content: None,
            text_area: None,
            corner_radius: None,
            parent: None,
            children: Vec::new(),
            redraws: 0,
        }
    }

    fn own_content(&self) -> Option<Rect> {
        self.text_area.or(self.content)
    }
}

/// Detached copy of a node and its subtree.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    node: SceneNode,
    children: Vec<NodeSnapshot>,
}

/// Arena-backed scene graph.
///
/// Node ids are never reused. The root is a non-selectable layer at the
/// identity transform.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: HashMap<NodeId, SceneNode>,
    root: NodeId,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, SceneNode::new(root, "stage", None, NodeFlags::LAYER));
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    fn generate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn attach(&mut self, parent: NodeId, mut node: SceneNode) -> GeometryResult<NodeId> {
        let id = node.id;
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(GeometryError::NodeNotFound(parent))?;
        parent_node.children.push(id);
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Adds a transparent container whose children are picked individually.
    pub fn add_layer(&mut self, parent: NodeId, transform: NodeTransform) -> GeometryResult<NodeId> {
        let id = self.generate_id();
        let mut node = SceneNode::new(id, "layer", None, NodeFlags::LAYER);
        node.transform = transform;
        self.attach(parent, node)
    }

    /// Adds editor chrome that is never picked.
    pub fn add_overlay(&mut self, parent: NodeId, bounds: Rect) -> GeometryResult<NodeId> {
        let id = self.generate_id();
        let mut node = SceneNode::new(id, "overlay", None, NodeFlags::OVERLAY);
        node.content = Some(Rect::new(0.0, 0.0, bounds.width, bounds.height));
        node.transform = NodeTransform::at(bounds.x, bounds.y);
        self.attach(parent, node)
    }

    /// Adds an object whose content spans `bounds` in the parent's space.
    ///
    /// The content is stored at the local origin and the node is positioned
    /// at `bounds.x, bounds.y` with its pivot at the local origin.
    pub fn add_object(
        &mut self,
        parent: NodeId,
        kind: ShapeKind,
        bounds: Rect,
    ) -> GeometryResult<NodeId> {
        let local = Rect::new(0.0, 0.0, bounds.width, bounds.height);
        self.add_node(parent, kind, local, NodeTransform::at(bounds.x, bounds.y))
    }

    /// Adds an object with explicit local content and transform.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        kind: ShapeKind,
        content: Rect,
        transform: NodeTransform,
    ) -> GeometryResult<NodeId> {
        let id = self.generate_id();
        let mut node = SceneNode::new(id, kind.to_string(), Some(kind), NodeFlags::OBJECT);
        node.transform = transform;
        if kind.has_text_area() {
            node.text_area = Some(content);
        } else {
            node.content = Some(content);
        }
        if kind == ShapeKind::Shape {
            node.corner_radius = Some(0.0);
        }
        self.attach(parent, node)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) -> GeometryResult<()> {
        self.node_mut(id)?.flags = flags;
        Ok(())
    }

    /// Number of redraw requests the node has received.
    pub fn redraw_count(&self, id: NodeId) -> u32 {
        self.nodes.get(&id).map(|n| n.redraws).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn node_ref(&self, id: NodeId) -> GeometryResult<&SceneNode> {
        self.nodes.get(&id).ok_or(GeometryError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> GeometryResult<&mut SceneNode> {
        self.nodes.get_mut(&id).ok_or(GeometryError::NodeNotFound(id))
    }

    /// Local-to-world matrix of a node.
    pub fn world_matrix(&self, id: NodeId) -> GeometryResult<Affine2> {
        let node = self.node_ref(id)?;
        let mut matrix = node.transform.local_matrix();
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let parent = self.node_ref(parent_id)?;
            matrix = parent.transform.local_matrix() * matrix;
            current = parent.parent;
        }
        Ok(matrix)
    }

    /// Bounds of a subtree in the space described by `matrix`.
    fn subtree_bounds(&self, id: NodeId, matrix: Affine2) -> Option<Rect> {
        let node = self.nodes.get(&id)?;
        let mut bounds = node.own_content().map(|c| matrix.transform_rect(&c));
        for child_id in &node.children {
            let Some(child) = self.nodes.get(child_id) else {
                continue;
            };
            let child_matrix = matrix * child.transform.local_matrix();
            if let Some(child_bounds) = self.subtree_bounds(*child_id, child_matrix) {
                bounds = Some(match bounds {
                    Some(b) => b.union(&child_bounds),
                    None => child_bounds,
                });
            }
        }
        bounds
    }

    fn detach(&mut self, id: NodeId) -> GeometryResult<usize> {
        let parent_id = self.node_ref(id)?.parent.ok_or(GeometryError::NoParent(id))?;
        let parent = self.node_mut(parent_id)?;
        let index = parent
            .children
            .iter()
            .position(|c| *c == id)
            .ok_or(GeometryError::NodeNotFound(id))?;
        parent.children.remove(index);
        Ok(index)
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }

    fn capture(&self, id: NodeId) -> GeometryResult<NodeSnapshot> {
        let node = self.node_ref(id)?;
        let children = node
            .children
            .iter()
            .map(|c| self.capture(*c))
            .collect::<GeometryResult<Vec<_>>>()?;
        Ok(NodeSnapshot {
            node: node.clone(),
            children,
        })
    }

    fn restore(&mut self, parent: NodeId, snapshot: &NodeSnapshot) -> GeometryResult<NodeId> {
        let id = self.generate_id();
        let mut node = snapshot.node.clone();
        node.id = id;
        node.children = Vec::new();
        node.redraws = 0;
        self.attach(parent, node)?;
        for child in &snapshot.children {
            self.restore(id, child)?;
        }
        Ok(id)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph for Scene {
    fn root(&self) -> NodeId {
        self.root
    }

    fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn kind(&self, id: NodeId) -> Option<ShapeKind> {
        self.nodes.get(&id).and_then(|n| n.kind)
    }

    fn flags(&self, id: NodeId) -> NodeFlags {
        self.nodes
            .get(&id)
            .map(|n| n.flags)
            .unwrap_or(NodeFlags::OVERLAY)
    }

    fn transform(&self, id: NodeId) -> GeometryResult<NodeTransform> {
        Ok(self.node_ref(id)?.transform)
    }

    fn set_transform(&mut self, id: NodeId, transform: NodeTransform) -> GeometryResult<()> {
        self.node_mut(id)?.transform = transform;
        Ok(())
    }

    fn local_bounds(&self, id: NodeId) -> GeometryResult<Rect> {
        self.node_ref(id)?;
        self.subtree_bounds(id, Affine2::identity())
            .ok_or(GeometryError::EmptyBounds(id))
    }

    fn world_bounds(&self, id: NodeId) -> GeometryResult<Rect> {
        let matrix = self.world_matrix(id)?;
        self.subtree_bounds(id, matrix)
            .ok_or(GeometryError::EmptyBounds(id))
    }

    fn to_local(&self, id: NodeId, world: Point) -> GeometryResult<Point> {
        let inverse = self
            .world_matrix(id)?
            .inverse()
            .ok_or(GeometryError::NonInvertible(id))?;
        Ok(inverse.transform_point(world))
    }

    fn to_global(&self, id: NodeId, local: Point) -> GeometryResult<Point> {
        Ok(self.world_matrix(id)?.transform_point(local))
    }

    fn text_area(&self, id: NodeId) -> Option<Rect> {
        self.nodes.get(&id).and_then(|n| n.text_area)
    }

    fn set_text_area(&mut self, id: NodeId, area: Rect) -> GeometryResult<()> {
        let node = self.node_mut(id)?;
        if node.text_area.is_none() {
            return Err(GeometryError::Unsupported {
                node: id,
                capability: "text area",
            });
        }
        node.text_area = Some(area);
        Ok(())
    }

    fn redraw(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.redraws += 1;
        }
    }
}

impl SceneEditor for Scene {
    type Snapshot = NodeSnapshot;

    fn snapshot(&self, id: NodeId) -> GeometryResult<NodeSnapshot> {
        self.capture(id)
    }

    fn instantiate(&mut self, parent: NodeId, snapshot: &NodeSnapshot) -> GeometryResult<NodeId> {
        self.restore(parent, snapshot)
    }

    fn remove(&mut self, id: NodeId) -> GeometryResult<()> {
        if id == self.root {
            return Err(GeometryError::NoParent(id));
        }
        self.detach(id)?;
        self.remove_subtree(id);
        Ok(())
    }

    fn group(&mut self, ids: &[NodeId]) -> GeometryResult<NodeId> {
        let first = *ids.first().ok_or(GeometryError::NodeNotFound(NodeId(u64::MAX)))?;
        let parent_id = self.parent(first).ok_or(GeometryError::NoParent(first))?;
        if let Some(stray) = ids.iter().find(|id| self.parent(**id) != Some(parent_id)) {
            return Err(GeometryError::Unsupported {
                node: *stray,
                capability: "grouping across containers",
            });
        }

        // The group takes the slot of its topmost member.
        let siblings = self.children(parent_id);
        let insert_at = ids
            .iter()
            .filter_map(|id| siblings.iter().position(|s| s == id))
            .max()
            .unwrap_or(siblings.len());

        let group_id = self.generate_id();
        let mut group = SceneNode::new(group_id, "group", Some(ShapeKind::Group), NodeFlags::OBJECT);
        group.parent = Some(parent_id);

        // Members keep their draw order inside the group.
        let mut members: Vec<(usize, NodeId)> = ids
            .iter()
            .filter_map(|id| siblings.iter().position(|s| s == id).map(|i| (i, *id)))
            .collect();
        members.sort_by_key(|(i, _)| *i);
        let removed_before = members.iter().filter(|(i, _)| *i < insert_at).count();

        for (_, id) in &members {
            self.detach(*id)?;
            self.node_mut(*id)?.parent = Some(group_id);
            group.children.push(*id);
        }

        self.nodes.insert(group_id, group);
        let parent = self.node_mut(parent_id)?;
        let slot = (insert_at - removed_before).min(parent.children.len());
        parent.children.insert(slot, group_id);
        Ok(group_id)
    }

    fn ungroup(&mut self, group_id: NodeId) -> GeometryResult<Vec<NodeId>> {
        let group = self.node_ref(group_id)?.clone();
        if group.kind != Some(ShapeKind::Group) {
            return Err(GeometryError::Unsupported {
                node: group_id,
                capability: "ungrouping",
            });
        }
        let parent_id = group.parent.ok_or(GeometryError::NoParent(group_id))?;
        let index = self.detach(group_id)?;
        let group_matrix = group.transform.local_matrix();

        for child_id in &group.children {
            let child = self.node_mut(*child_id)?;
            // Bake the group's transform into the child. Exact unless the
            // group combines non-uniform scale with rotated children.
            let t = child.transform;
            child.transform = NodeTransform {
                position: group_matrix.transform_point(t.position),
                scale: Point::new(
                    t.scale.x * group.transform.scale.x,
                    t.scale.y * group.transform.scale.y,
                ),
                rotation: t.rotation + group.transform.rotation,
                pivot: t.pivot,
            };
            child.parent = Some(parent_id);
        }

        let parent = self.node_mut(parent_id)?;
        for (offset, child_id) in group.children.iter().enumerate() {
            parent.children.insert(index + offset, *child_id);
        }
        self.nodes.remove(&group_id);
        Ok(group.children)
    }

    fn reorder(&mut self, id: NodeId, order: ZOrder) -> GeometryResult<()> {
        let parent_id = self.parent(id).ok_or(GeometryError::NoParent(id))?;
        let parent = self.node_mut(parent_id)?;
        let index = parent
            .children
            .iter()
            .position(|c| *c == id)
            .ok_or(GeometryError::NodeNotFound(id))?;
        let last = parent.children.len() - 1;
        let target = match order {
            ZOrder::BringToFront => last,
            ZOrder::BringForward => (index + 1).min(last),
            ZOrder::SendBackward => index.saturating_sub(1),
            ZOrder::SendToBack => 0,
        };
        let node = parent.children.remove(index);
        parent.children.insert(target, node);
        Ok(())
    }

    fn set_locked(&mut self, id: NodeId, locked: bool) -> GeometryResult<()> {
        self.node_mut(id)?.flags.locked = locked;
        Ok(())
    }

    fn set_visible(&mut self, id: NodeId, visible: bool) -> GeometryResult<()> {
        self.node_mut(id)?.flags.visible = visible;
        Ok(())
    }

    fn corner_radius(&self, id: NodeId) -> Option<f64> {
        self.nodes.get(&id).and_then(|n| n.corner_radius)
    }

    fn set_corner_radius(&mut self, id: NodeId, radius: f64) -> GeometryResult<()> {
        let node = self.node_mut(id)?;
        if node.corner_radius.is_none() {
            return Err(GeometryError::Unsupported {
                node: id,
                capability: "corner radius",
            });
        }
        node.corner_radius = Some(radius);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_world_bounds() {
        let mut scene = Scene::new();
        let id = scene
            .add_object(scene.root(), ShapeKind::Shape, Rect::new(10.0, 20.0, 30.0, 40.0))
            .unwrap();
        assert_eq!(scene.world_bounds(id).unwrap(), Rect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(scene.local_bounds(id).unwrap(), Rect::new(0.0, 0.0, 30.0, 40.0));
    }

    #[test]
    fn test_nested_layer_coordinates() {
        let mut scene = Scene::new();
        let layer = scene
            .add_layer(
                scene.root(),
                NodeTransform {
                    position: Point::new(100.0, 50.0),
                    scale: Point::new(2.0, 2.0),
                    ..NodeTransform::default()
                },
            )
            .unwrap();
        let id = scene
            .add_object(layer, ShapeKind::Shape, Rect::new(5.0, 5.0, 10.0, 10.0))
            .unwrap();

        assert_eq!(scene.world_bounds(id).unwrap(), Rect::new(110.0, 60.0, 20.0, 20.0));
        let local = scene.to_local(layer, Point::new(110.0, 60.0)).unwrap();
        assert!(local.approx_eq(&Point::new(5.0, 5.0), 1e-9));
    }

    #[test]
    fn test_zero_scale_is_not_invertible() {
        let mut scene = Scene::new();
        let id = scene
            .add_object(scene.root(), ShapeKind::Shape, Rect::new(0.0, 0.0, 10.0, 10.0))
            .unwrap();
        let mut t = scene.transform(id).unwrap();
        t.scale = Point::new(0.0, 1.0);
        scene.set_transform(id, t).unwrap();
        assert_eq!(
            scene.to_local(id, Point::ORIGIN),
            Err(GeometryError::NonInvertible(id))
        );
    }

    #[test]
    fn test_group_and_ungroup_preserve_bounds() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = scene.add_object(root, ShapeKind::Pen, Rect::new(20.0, 0.0, 10.0, 10.0)).unwrap();
        let c = scene.add_object(root, ShapeKind::Shape, Rect::new(40.0, 0.0, 10.0, 10.0)).unwrap();

        let group = scene.group(&[a, b]).unwrap();
        assert_eq!(scene.children(root), vec![group, c]);
        assert_eq!(scene.world_bounds(group).unwrap(), Rect::new(0.0, 0.0, 30.0, 10.0));

        let mut t = scene.transform(group).unwrap();
        t.position = Point::new(5.0, 5.0);
        scene.set_transform(group, t).unwrap();

        let children = scene.ungroup(group).unwrap();
        assert_eq!(children, vec![a, b]);
        assert_eq!(scene.children(root), vec![a, b, c]);
        assert_eq!(scene.world_bounds(b).unwrap(), Rect::new(25.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_reorder() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        let b = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        let c = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();

        scene.reorder(a, ZOrder::BringToFront).unwrap();
        assert_eq!(scene.children(root), vec![b, c, a]);
        scene.reorder(a, ZOrder::SendBackward).unwrap();
        assert_eq!(scene.children(root), vec![b, a, c]);
        scene.reorder(c, ZOrder::SendToBack).unwrap();
        assert_eq!(scene.children(root), vec![c, b, a]);
    }

    #[test]
    fn test_snapshot_instantiate_copies_subtree() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.add_object(root, ShapeKind::Shape, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = scene.add_object(root, ShapeKind::Shape, Rect::new(20.0, 0.0, 10.0, 10.0)).unwrap();
        let group = scene.group(&[a, b]).unwrap();

        let snapshot = scene.snapshot(group).unwrap();
        let copy = scene.instantiate(root, &snapshot).unwrap();
        assert_ne!(copy, group);
        assert_eq!(scene.children(copy).len(), 2);
        assert_eq!(scene.world_bounds(copy).unwrap(), scene.world_bounds(group).unwrap());

        scene.remove(copy).unwrap();
        assert!(!scene.contains(copy));
        assert_eq!(scene.children(root), vec![group]);
    }
}

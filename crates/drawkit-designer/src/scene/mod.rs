//! Scene-graph capability contract.
//!
//! The selection engine never owns drawable objects. It reads their bounds
//! and mutates their position, scale, rotation and pivot through
//! [`SceneGraph`], and delegates structural edits (clipboard, grouping,
//! z-order, lock/visibility) to [`SceneEditor`].
//!
//! [`Scene`] is an in-memory implementation of both traits.

mod memory;

pub use memory::{NodeSnapshot, Scene, SceneNode};

use drawkit_core::{
    GeometryError, GeometryResult, NodeId, NodeTransform, Point, Rect, ShapeKind,
};

/// Interaction flags of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeFlags {
    /// Can be picked and transformed as a unit.
    pub selectable: bool,
    /// Locked objects (and their subtrees) ignore pointer picks.
    pub locked: bool,
    /// Hidden objects (and their subtrees) ignore pointer picks.
    pub visible: bool,
    /// A non-selectable node whose subtree is never searched (overlays,
    /// handle graphics, scene boundaries).
    pub opaque: bool,
}

impl NodeFlags {
    /// A regular user-placed object.
    pub const OBJECT: NodeFlags = NodeFlags {
        selectable: true,
        locked: false,
        visible: true,
        opaque: false,
    };

    /// A transparent container whose children are picked individually.
    pub const LAYER: NodeFlags = NodeFlags {
        selectable: false,
        locked: false,
        visible: true,
        opaque: false,
    };

    /// Editor chrome that must never be picked.
    pub const OVERLAY: NodeFlags = NodeFlags {
        selectable: false,
        locked: false,
        visible: true,
        opaque: true,
    };

    /// True when the node itself can be picked by the pointer.
    pub fn is_pickable(&self) -> bool {
        self.selectable && !self.locked && self.visible
    }

    /// True when a picker should search this node's children.
    pub fn is_searchable_container(&self) -> bool {
        !self.selectable && !self.locked && self.visible && !self.opaque
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::OBJECT
    }
}

/// Z-order moves within a node's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    BringToFront,
    BringForward,
    SendBackward,
    SendToBack,
}

/// Read and transform access to scene nodes.
///
/// Children are reported back-to-front (the last child draws on top).
pub trait SceneGraph {
    fn root(&self) -> NodeId;
    fn contains(&self, id: NodeId) -> bool;
    fn parent(&self, id: NodeId) -> Option<NodeId>;
    fn children(&self, id: NodeId) -> Vec<NodeId>;
    fn kind(&self, id: NodeId) -> Option<ShapeKind>;
    fn flags(&self, id: NodeId) -> NodeFlags;

    fn transform(&self, id: NodeId) -> GeometryResult<NodeTransform>;
    fn set_transform(&mut self, id: NodeId, transform: NodeTransform) -> GeometryResult<()>;

    /// Content bounds in the node's own coordinate space.
    fn local_bounds(&self, id: NodeId) -> GeometryResult<Rect>;
    /// Axis-aligned bounds in world space.
    fn world_bounds(&self, id: NodeId) -> GeometryResult<Rect>;

    /// Maps a world point into the node's local space.
    fn to_local(&self, id: NodeId, world: Point) -> GeometryResult<Point>;
    /// Maps a point in the node's local space to world space.
    fn to_global(&self, id: NodeId, local: Point) -> GeometryResult<Point>;

    /// Text area of text-bearing objects, in local space.
    fn text_area(&self, _id: NodeId) -> Option<Rect> {
        None
    }

    fn set_text_area(&mut self, id: NodeId, _area: Rect) -> GeometryResult<()> {
        Err(GeometryError::Unsupported {
            node: id,
            capability: "text area",
        })
    }

    /// Asks the owner to redraw the node after its geometry changed.
    fn redraw(&mut self, _id: NodeId) {}
}

/// Structural edits owned by sibling services.
pub trait SceneEditor: SceneGraph {
    /// Detached copy of a node and its subtree, used by the clipboard.
    type Snapshot: Clone + std::fmt::Debug;

    fn snapshot(&self, id: NodeId) -> GeometryResult<Self::Snapshot>;
    /// Inserts a copy of `snapshot` as the topmost child of `parent`.
    fn instantiate(&mut self, parent: NodeId, snapshot: &Self::Snapshot)
        -> GeometryResult<NodeId>;
    fn remove(&mut self, id: NodeId) -> GeometryResult<()>;

    /// Wraps the nodes in a new group; returns the group.
    fn group(&mut self, ids: &[NodeId]) -> GeometryResult<NodeId>;
    /// Dissolves a group; returns its former children.
    fn ungroup(&mut self, group: NodeId) -> GeometryResult<Vec<NodeId>>;

    fn reorder(&mut self, id: NodeId, order: ZOrder) -> GeometryResult<()>;
    fn set_locked(&mut self, id: NodeId, locked: bool) -> GeometryResult<()>;
    fn set_visible(&mut self, id: NodeId, visible: bool) -> GeometryResult<()>;

    fn corner_radius(&self, _id: NodeId) -> Option<f64> {
        None
    }

    fn set_corner_radius(&mut self, id: NodeId, _radius: f64) -> GeometryResult<()> {
        Err(GeometryError::Unsupported {
            node: id,
            capability: "corner radius",
        })
    }
}

/// Maps a world point into the node's parent space.
pub fn parent_to_local(
    scene: &dyn SceneGraph,
    id: NodeId,
    world: Point,
) -> GeometryResult<Point> {
    let parent = scene.parent(id).ok_or(GeometryError::NoParent(id))?;
    scene.to_local(parent, world)
}

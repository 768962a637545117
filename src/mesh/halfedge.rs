//! Half-edge mesh data structure.
//!
//! This module provides the element store and the traversal queries of the
//! half-edge (doubly-connected edge list) representation.
//!
//! # Structure
//!
//! - Each undirected edge is split into two **half-edges** pointing in
//!   opposite directions
//! - Each half-edge knows its **twin**, its **next** half-edge around the face
//!   on its left, its **origin** node and that **left face**
//! - Each node stores one outgoing half-edge
//! - Each face stores one half-edge on its boundary
//!
//! # Boundary Handling
//!
//! Face slot 0 is the outside face. Half-edges on the exterior side of a
//! boundary have it as their left face, and their `next` links run around
//! the boundary loop like any other face. An edge is a boundary edge when
//! either of its half-edges borders the outside face.
//!
//! All queries resolve handles through the arenas and report
//! [`MeshError::InvalidHandle`] rather than panicking on a bad handle.

use std::rc::Rc;

use crate::data::{DataId, DataInfo, DataRegistry, ElementKind, SharedData};
use crate::error::{MeshError, Result};

use super::index::{FaceId, HalfEdgeId, MeshIndex, NodeId};

/// A node (vertex) in the half-edge mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node<I: MeshIndex = u32> {
    /// One outgoing half-edge from this node.
    /// For boundary nodes built by the builder, this is a boundary half-edge.
    pub origin_edge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Node<I> {
    /// Create an isolated node.
    pub fn new() -> Self {
        Self {
            origin_edge: HalfEdgeId::invalid(),
        }
    }
}

impl<I: MeshIndex> Default for Node<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The node this half-edge starts at.
    pub origin: NodeId<I>,

    /// The next half-edge around the left face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The opposite half-edge.
    pub twin: HalfEdgeId<I>,

    /// The face on the left of this half-edge.
    /// The outside face for exterior boundary half-edges.
    pub left_face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            origin: NodeId::invalid(),
            next: HalfEdgeId::invalid(),
            twin: HalfEdgeId::invalid(),
            left_face: FaceId::invalid(),
        }
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face.
    pub edge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge.
    pub fn new(edge: HalfEdgeId<I>) -> Self {
        Self { edge }
    }
}

impl<I: MeshIndex> Default for Face<I> {
    fn default() -> Self {
        Self {
            edge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge mesh.
///
/// Stores nodes, half-edges and faces in append-only arenas, plus the
/// registry of data arrays attached to them. Handles stay valid for the
/// lifetime of the mesh.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    /// All nodes in the mesh.
    pub(crate) nodes: Vec<Node<I>>,

    /// All half-edges in the mesh.
    pub(crate) halfedges: Vec<HalfEdge<I>>,

    /// All faces in the mesh; slot 0 is the outside face.
    pub(crate) faces: Vec<Face<I>>,

    /// Attached per-element arrays.
    pub(crate) data: DataRegistry,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh holding only the outside face.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_nodes: usize, num_faces: usize) -> Self {
        // Triangles: 3 half-edges per face plus some boundary slack
        let num_halfedges = num_faces * 3 + num_faces / 2;

        let mut faces = Vec::with_capacity(num_faces + 1);
        faces.push(Face::default());

        Self {
            nodes: Vec::with_capacity(num_nodes),
            halfedges: Vec::with_capacity(num_halfedges),
            faces,
            data: DataRegistry::new(),
        }
    }

    /// The outside face sentinel.
    #[inline]
    pub fn outside_face(&self) -> FaceId<I> {
        FaceId::outside()
    }

    // ==================== Accessors ====================

    /// Get the number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of real faces (the outside face is not counted).
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len() - 1
    }

    /// Arena length for an element kind.
    ///
    /// This is the length an attached array of that kind must have. For faces
    /// it includes the outside face, so face data is indexed by
    /// [`FaceId::index`] directly.
    #[inline]
    pub fn element_count(&self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Node => self.nodes.len(),
            ElementKind::HalfEdge => self.halfedges.len(),
            ElementKind::Face => self.faces.len(),
        }
    }

    /// Get a node by ID.
    #[inline]
    pub fn node(&self, id: NodeId<I>) -> Result<&Node<I>> {
        if !id.is_valid() {
            return Err(MeshError::invalid_handle("node", id.index()));
        }
        self.nodes
            .get(id.index())
            .ok_or_else(|| MeshError::invalid_handle("node", id.index()))
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> Result<&HalfEdge<I>> {
        if !id.is_valid() {
            return Err(MeshError::invalid_handle("halfedge", id.index()));
        }
        self.halfedges
            .get(id.index())
            .ok_or_else(|| MeshError::invalid_handle("halfedge", id.index()))
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> Result<&Face<I>> {
        if !id.is_valid() {
            return Err(MeshError::invalid_handle("face", id.index()));
        }
        self.faces
            .get(id.index())
            .ok_or_else(|| MeshError::invalid_handle("face", id.index()))
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId<I>) -> Result<&mut Node<I>> {
        self.node(id)?;
        Ok(&mut self.nodes[id.index()])
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> Result<&mut HalfEdge<I>> {
        self.halfedge(id)?;
        Ok(&mut self.halfedges[id.index()])
    }

    #[inline]
    pub(crate) fn face_mut(&mut self, id: FaceId<I>) -> Result<&mut Face<I>> {
        self.face(id)?;
        Ok(&mut self.faces[id.index()])
    }

    // ==================== Construction ====================

    /// Add an isolated node and return its ID.
    ///
    /// Fails with [`MeshError::CapacityExceeded`] once every index of `I`
    /// below the sentinel is in use.
    pub fn add_node(&mut self) -> Result<NodeId<I>> {
        let id = NodeId::new(next_index::<I>(self.nodes.len(), "node")?);
        self.nodes.push(Node::new());
        Ok(id)
    }

    /// Add an unlinked half-edge and return its ID.
    pub fn add_edge(&mut self) -> Result<HalfEdgeId<I>> {
        let id = HalfEdgeId::new(next_index::<I>(self.halfedges.len(), "halfedge")?);
        self.halfedges.push(HalfEdge::new());
        Ok(id)
    }

    /// Add a face with no boundary yet and return its ID.
    pub fn add_face(&mut self) -> Result<FaceId<I>> {
        let id = FaceId::new(next_index::<I>(self.faces.len(), "face")?);
        self.faces.push(Face::default());
        Ok(id)
    }

    /// Set the origin of `he`.
    ///
    /// If `node` has no outgoing half-edge yet, `he` becomes it.
    pub fn set_origin(&mut self, he: HalfEdgeId<I>, node: NodeId<I>) -> Result<()> {
        self.halfedge(he)?;
        let n = self.node_mut(node)?;
        if !n.origin_edge.is_valid() {
            n.origin_edge = he;
        }
        self.halfedges[he.index()].origin = node;
        Ok(())
    }

    /// Make `a` and `b` each other's twin.
    pub fn link_twins(&mut self, a: HalfEdgeId<I>, b: HalfEdgeId<I>) -> Result<()> {
        self.halfedge(a)?;
        self.halfedge(b)?;
        self.halfedges[a.index()].twin = b;
        self.halfedges[b.index()].twin = a;
        Ok(())
    }

    /// Set the half-edge following `he` around its face.
    pub fn set_next(&mut self, he: HalfEdgeId<I>, next: HalfEdgeId<I>) -> Result<()> {
        self.halfedge(next)?;
        self.halfedge_mut(he)?.next = next;
        Ok(())
    }

    /// Set the left face of `he`.
    ///
    /// If `face` has no boundary half-edge yet, `he` becomes it.
    pub fn set_left_face(&mut self, he: HalfEdgeId<I>, face: FaceId<I>) -> Result<()> {
        self.halfedge(he)?;
        let f = self.face_mut(face)?;
        if !f.edge.is_valid() {
            f.edge = he;
        }
        self.halfedges[he.index()].left_face = face;
        Ok(())
    }

    /// Set the outgoing half-edge stored on `node`.
    pub fn set_node_edge(&mut self, node: NodeId<I>, he: HalfEdgeId<I>) -> Result<()> {
        self.halfedge(he)?;
        self.node_mut(node)?.origin_edge = he;
        Ok(())
    }

    /// Set the boundary half-edge stored on `face`.
    pub fn set_face_edge(&mut self, face: FaceId<I>, he: HalfEdgeId<I>) -> Result<()> {
        self.halfedge(he)?;
        self.face_mut(face)?.edge = he;
        Ok(())
    }

    // ==================== Topology Queries ====================

    /// Get the next half-edge around the left face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> Result<HalfEdgeId<I>> {
        Ok(self.halfedge(he)?.next)
    }

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> Result<HalfEdgeId<I>> {
        Ok(self.halfedge(he)?.twin)
    }

    /// Get the origin node of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> Result<NodeId<I>> {
        Ok(self.halfedge(he)?.origin)
    }

    /// Get the destination node of a half-edge, `origin(next(he))`.
    #[inline]
    pub fn destination(&self, he: HalfEdgeId<I>) -> Result<NodeId<I>> {
        self.origin(self.next(he)?)
    }

    /// Get the face on the left of a half-edge.
    #[inline]
    pub fn left_face(&self, he: HalfEdgeId<I>) -> Result<FaceId<I>> {
        Ok(self.halfedge(he)?.left_face)
    }

    /// Get the half-edge preceding `he` around its left face.
    ///
    /// `next(prev(he)) == he` for every half-edge on a closed `next` cycle.
    /// Costs one step per edge of the face.
    pub fn prev(&self, he: HalfEdgeId<I>) -> Result<HalfEdgeId<I>> {
        let mut current = he;
        for _ in 0..self.halfedges.len() {
            let next = self.next(current)?;
            if next == he {
                return Ok(current);
            }
            current = next;
        }
        Err(MeshError::OpenCycle { start: he.index() })
    }

    /// Get `twin(next(twin(he)))`.
    ///
    /// This is an incoming half-edge of `origin(he)`, one rotation step away
    /// from `twin(he)`. When `origin(he)` has valence 2 it coincides with
    /// [`prev`](Self::prev).
    #[inline]
    pub fn prev_incoming(&self, he: HalfEdgeId<I>) -> Result<HalfEdgeId<I>> {
        self.twin(self.next(self.twin(he)?)?)
    }

    /// Check if an edge (represented by one of its half-edges) is on the boundary.
    pub fn is_boundary(&self, he: HalfEdgeId<I>) -> Result<bool> {
        let outside = self.outside_face();
        Ok(self.left_face(he)? == outside || self.left_face(self.twin(he)?)? == outside)
    }

    /// Check if a node is on the boundary.
    ///
    /// Isolated nodes count as boundary nodes.
    pub fn is_boundary_node(&self, n: NodeId<I>) -> Result<bool> {
        let outside = self.outside_face();
        let mut has_edges = false;
        for he in self.node_halfedges(n)? {
            has_edges = true;
            if self.left_face(he)? == outside {
                return Ok(true);
            }
        }
        Ok(!has_edges)
    }

    /// Count the half-edges around a face.
    ///
    /// Every step of the walk is counted, including the one that closes the
    /// loop, so a triangle reports 3. A face without a boundary reports 0.
    pub fn face_edge_count(&self, f: FaceId<I>) -> Result<usize> {
        let start = self.face(f)?.edge;
        if !start.is_valid() {
            return Ok(0);
        }

        let mut count = 0;
        let mut current = start;
        loop {
            current = self.next(current)?;
            count += 1;
            if current == start {
                return Ok(count);
            }
            if count >= self.halfedges.len() {
                return Err(MeshError::OpenCycle {
                    start: start.index(),
                });
            }
        }
    }

    /// Get the three nodes of a triangular face.
    ///
    /// Fails with [`MeshError::NotTriangle`] for any other face.
    pub fn face_triangle(&self, f: FaceId<I>) -> Result<[NodeId<I>; 3]> {
        let edges = self.face_edge_count(f)?;
        if edges != 3 {
            return Err(MeshError::NotTriangle {
                face: f.index(),
                edges,
            });
        }
        let he0 = self.face(f)?.edge;
        let he1 = self.next(he0)?;
        let he2 = self.next(he1)?;
        Ok([self.origin(he0)?, self.origin(he1)?, self.origin(he2)?])
    }

    /// Find the half-edge going from `from` to `to`, if any.
    pub fn find_halfedge(&self, from: NodeId<I>, to: NodeId<I>) -> Result<Option<HalfEdgeId<I>>> {
        self.node(to)?;
        for he in self.node_halfedges(from)? {
            if self.destination(he)? == to {
                return Ok(Some(he));
            }
        }
        Ok(None)
    }

    /// Compute the valence (degree) of a node.
    pub fn valence(&self, n: NodeId<I>) -> Result<usize> {
        Ok(self.node_halfedges(n)?.count())
    }

    // ==================== Iteration ====================

    /// Iterate over all node IDs.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId<I>> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over the IDs of all real faces (the outside face is skipped).
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (1..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over outgoing half-edges around a node.
    pub fn node_halfedges(&self, n: NodeId<I>) -> Result<NodeHalfEdgeIter<'_, I>> {
        let start = self.node(n)?.origin_edge;
        Ok(NodeHalfEdgeIter::new(self, start))
    }

    /// Iterate over nodes adjacent to a node.
    pub fn node_neighbors(&self, n: NodeId<I>) -> Result<impl Iterator<Item = NodeId<I>> + '_> {
        Ok(self
            .node_halfedges(n)?
            .filter_map(move |he| self.destination(he).ok()))
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> Result<FaceHalfEdgeIter<'_, I>> {
        let start = self.face(f)?.edge;
        Ok(FaceHalfEdgeIter::new(self, start))
    }

    /// Iterate over nodes of a face.
    pub fn face_nodes(&self, f: FaceId<I>) -> Result<impl Iterator<Item = NodeId<I>> + '_> {
        Ok(self
            .face_halfedges(f)?
            .filter_map(move |he| self.origin(he).ok()))
    }

    // ==================== Attached Data ====================

    /// Attach a per-element array.
    ///
    /// `payload` must have exactly [`element_count(kind)`](Self::element_count)
    /// entries. Later topology growth does not resize it; keeping it in step is
    /// up to the caller.
    pub fn attach<T: 'static>(&mut self, payload: SharedData<T>, kind: ElementKind) -> Result<DataId> {
        let expected = self.element_count(kind);
        self.data.attach(payload, kind, expected)
    }

    /// Fetch an attached array as `T`.
    pub fn fetch<T: 'static>(&self, id: DataId) -> Result<SharedData<T>> {
        self.data.fetch(id)
    }

    /// Fetch a single entry of an attached array.
    ///
    /// An `index` past the end of the array is reported as an invalid handle
    /// of the array's element kind.
    pub fn fetch_value<T: Clone + 'static>(&self, id: DataId, index: usize) -> Result<T> {
        let kind = self.data.info(id)?.kind;
        let payload = self.data.fetch::<T>(id)?;
        let values = payload
            .try_borrow()
            .map_err(|_| MeshError::InvalidState("payload is mutably borrowed".to_string()))?;
        values
            .get(index)
            .cloned()
            .ok_or_else(|| MeshError::invalid_handle(kind.name(), index))
    }

    /// Detach an attached array.
    ///
    /// Topology is not touched. The caller's [`SharedData`] handles stay usable.
    pub fn detach(&mut self, id: DataId) -> Result<()> {
        self.data.detach(id)
    }

    /// Metadata of an attached array.
    pub fn data_info(&self, id: DataId) -> Result<DataInfo> {
        self.data.info(id)
    }

    /// Number of attached arrays.
    pub fn num_attached(&self) -> usize {
        self.data.len()
    }

    /// Check if `id` refers to the same array as `payload`.
    pub fn is_attached<T: 'static>(&self, id: DataId, payload: &SharedData<T>) -> bool {
        self.data
            .fetch::<T>(id)
            .map(|p| Rc::ptr_eq(&p, payload))
            .unwrap_or(false)
    }
}

/// Position the next element of an arena holding `len` elements will take.
fn next_index<I: MeshIndex>(len: usize, kind: &'static str) -> Result<usize> {
    let limit = I::MAX.to_usize().saturating_add(1);
    if len >= limit {
        return Err(MeshError::CapacityExceeded { kind, limit });
    }
    Ok(len)
}

/// Iterator over outgoing half-edges around a node.
///
/// Rotates with `next(twin(he))`. Stops early if a link does not resolve.
pub struct NodeHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> NodeHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, start: HalfEdgeId<I>) -> Self {
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() {
                mesh.num_halfedges()
            } else {
                0
            },
        }
    }
}

impl<'a, I: MeshIndex> Iterator for NodeHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;

        // If he goes v -> w, twin(he) goes w -> v and the half-edge after it
        // in its face leaves v again.
        match self
            .mesh
            .twin(self.current)
            .and_then(|t| self.mesh.next(t))
        {
            Ok(next) if next != self.start => self.current = next,
            _ => self.remaining = 0,
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, start: HalfEdgeId<I>) -> Self {
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() {
                mesh.num_halfedges()
            } else {
                0
            },
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;
        match self.mesh.next(self.current) {
            Ok(next) if next != self.start => self.current = next,
            _ => self.remaining = 0,
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// A lone triangle wired by hand, with its exterior loop on the outside face.
    fn hand_built_triangle() -> (HalfEdgeMesh<u32>, [HalfEdgeId<u32>; 3]) {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let n: Vec<_> = (0..3).map(|_| mesh.add_node().unwrap()).collect();
        let f = mesh.add_face().unwrap();
        let inner: Vec<_> = (0..3).map(|_| mesh.add_edge().unwrap()).collect();
        let outer: Vec<_> = (0..3).map(|_| mesh.add_edge().unwrap()).collect();
        let outside = mesh.outside_face();

        for i in 0..3 {
            let j = (i + 1) % 3;
            // inner[i]: n[i] -> n[j]; outer[i]: n[j] -> n[i]
            mesh.set_origin(inner[i], n[i]).unwrap();
            mesh.set_origin(outer[i], n[j]).unwrap();
            mesh.link_twins(inner[i], outer[i]).unwrap();
            mesh.set_next(inner[i], inner[j]).unwrap();
            mesh.set_next(outer[j], outer[i]).unwrap();
            mesh.set_left_face(inner[i], f).unwrap();
            mesh.set_left_face(outer[i], outside).unwrap();
        }

        (mesh, [inner[0], inner[1], inner[2]])
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_nodes(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.element_count(ElementKind::Face), 1);
        assert_eq!(mesh.face_ids().count(), 0);
        assert_eq!(mesh.face_edge_count(mesh.outside_face()).unwrap(), 0);
    }

    #[test]
    fn test_add_elements() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let n0 = mesh.add_node().unwrap();
        let n1 = mesh.add_node().unwrap();
        let he = mesh.add_edge().unwrap();
        let f = mesh.add_face().unwrap();

        assert_eq!(n0.index(), 0);
        assert_eq!(n1.index(), 1);
        assert_eq!(he.index(), 0);
        assert_eq!(f.index(), 1);
        assert_eq!(mesh.num_faces(), 1);
        assert!(!mesh.node(n0).unwrap().origin_edge.is_valid());
        assert!(mesh.is_boundary_node(n0).unwrap());
    }

    #[test]
    fn test_invalid_handles() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(
            mesh.next(HalfEdgeId::new(5)).unwrap_err(),
            MeshError::InvalidHandle {
                kind: "halfedge",
                index: 5
            }
        );
        assert!(mesh.node(NodeId::new(0)).unwrap_err().is_invalid_handle());
        assert!(mesh.face(FaceId::new(1)).unwrap_err().is_invalid_handle());
        assert!(mesh.twin(HalfEdgeId::invalid()).unwrap_err().is_invalid_handle());
    }

    #[test]
    fn test_setters_validate_before_mutating() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let he = mesh.add_edge().unwrap();
        assert!(mesh.link_twins(he, HalfEdgeId::new(9)).is_err());
        assert!(!mesh.halfedge(he).unwrap().twin.is_valid());

        assert!(mesh.set_origin(he, NodeId::new(0)).is_err());
        assert!(!mesh.origin(he).unwrap().is_valid());
    }

    #[test]
    fn test_hand_built_triangle() {
        let (mesh, [a, b, c]) = hand_built_triangle();
        let f = mesh.left_face(a).unwrap();

        assert_eq!(mesh.face_edge_count(f).unwrap(), 3);
        assert_eq!(mesh.face_edge_count(mesh.outside_face()).unwrap(), 3);
        assert_eq!(mesh.next(a).unwrap(), b);
        assert_eq!(mesh.next(mesh.next(mesh.next(a).unwrap()).unwrap()).unwrap(), a);
        assert_eq!(mesh.destination(a).unwrap(), mesh.origin(b).unwrap());
        assert_eq!(mesh.prev(a).unwrap(), c);
        assert!(mesh.is_boundary(a).unwrap());
        assert!(mesh.is_boundary(mesh.twin(a).unwrap()).unwrap());
    }

    #[test]
    fn test_prev_incoming_matches_prev_at_valence_two() {
        let (mesh, _) = hand_built_triangle();
        for he in mesh.halfedge_ids() {
            assert_eq!(mesh.valence(mesh.origin(he).unwrap()).unwrap(), 2);
            assert_eq!(mesh.prev_incoming(he).unwrap(), mesh.prev(he).unwrap());
        }
    }

    #[test]
    fn test_node_queries() {
        let (mesh, [a, b, _]) = hand_built_triangle();
        let n0 = mesh.origin(a).unwrap();
        let n1 = mesh.origin(b).unwrap();

        let neighbors: Vec<_> = mesh.node_neighbors(n0).unwrap().collect();
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.contains(&n1));
        assert_eq!(mesh.find_halfedge(n0, n1).unwrap(), Some(a));
        assert!(mesh.is_boundary_node(n0).unwrap());
    }

    #[test]
    fn test_face_iteration() {
        let (mesh, [a, b, c]) = hand_built_triangle();
        let f = mesh.left_face(a).unwrap();
        let hes: Vec<_> = mesh.face_halfedges(f).unwrap().collect();
        assert_eq!(hes, vec![a, b, c]);
        assert_eq!(mesh.face_nodes(f).unwrap().count(), 3);
        assert_eq!(mesh.face_ids().collect::<Vec<_>>(), vec![f]);
    }

    #[test]
    fn test_open_cycle_is_reported() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let f = mesh.add_face().unwrap();
        let a = mesh.add_edge().unwrap();
        let b = mesh.add_edge().unwrap();
        mesh.set_left_face(a, f).unwrap();
        // a -> b -> b -> ... never returns to a
        mesh.set_next(a, b).unwrap();
        mesh.set_next(b, b).unwrap();

        assert_eq!(
            mesh.face_edge_count(f).unwrap_err(),
            MeshError::OpenCycle { start: a.index() }
        );
        assert!(matches!(mesh.prev(a), Err(MeshError::OpenCycle { .. })));
        assert_eq!(mesh.face_halfedges(f).unwrap().count(), 2);
    }

    #[test]
    fn test_small_index_capacity() {
        let mut mesh = HalfEdgeMesh::<u16>::new();
        for _ in 0..u16::MAX {
            mesh.add_node().unwrap();
        }
        let last = NodeId::<u16>::new(mesh.num_nodes() - 1);
        assert!(last.is_valid());
        assert!(mesh.node(last).is_ok());

        assert_eq!(
            mesh.add_node().unwrap_err(),
            MeshError::CapacityExceeded {
                kind: "node",
                limit: u16::MAX as usize
            }
        );
        assert_eq!(mesh.num_nodes(), u16::MAX as usize);
    }

    #[test]
    fn test_face_triangle_rejects_other_faces() {
        let (mut mesh, [a, _, _]) = hand_built_triangle();
        let f = mesh.left_face(a).unwrap();
        assert_eq!(mesh.face_triangle(f).unwrap().len(), 3);

        // A face with no boundary yet
        let empty = mesh.add_face().unwrap();
        assert_eq!(
            mesh.face_triangle(empty).unwrap_err(),
            MeshError::NotTriangle {
                face: empty.index(),
                edges: 0
            }
        );
    }

    #[test]
    fn test_attach_through_mesh() {
        let (mut mesh, _) = hand_built_triangle();
        let flags = Rc::new(RefCell::new(vec![false; mesh.num_halfedges()]));
        let id = mesh.attach(Rc::clone(&flags), ElementKind::HalfEdge).unwrap();

        assert!(mesh.is_attached(id, &flags));
        assert_eq!(mesh.num_attached(), 1);
        flags.borrow_mut()[4] = true;
        assert!(mesh.fetch_value::<bool>(id, 4).unwrap());
        assert_eq!(
            mesh.fetch_value::<bool>(id, 6).unwrap_err(),
            MeshError::InvalidHandle {
                kind: "halfedge",
                index: 6
            }
        );

        // Face data covers the outside face too: two slots here
        let wrong_len = Rc::new(RefCell::new(vec![0u8; 3]));
        assert_eq!(
            mesh.attach(wrong_len, ElementKind::Face).unwrap_err(),
            MeshError::SizeMismatch {
                kind: ElementKind::Face,
                expected: 2,
                actual: 3,
            }
        );
        assert_eq!(mesh.num_attached(), 1);
    }
}

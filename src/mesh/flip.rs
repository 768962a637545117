//! Edge flip.
//!
//! Replaces the edge shared by two triangles with the other diagonal of the
//! quadrilateral they form:
//!
//! ```text
//!         C                    C
//!        / \                  /|\
//!       /   \                / | \
//!      A-----B     ==>      A  |  B
//!       \   /                \ | /
//!        \ /                  \|/
//!         D                    D
//! ```
//!
//! The operator keeps every handle: the two half-edges of the old diagonal
//! become the new diagonal, and the two faces keep their IDs. Data attached
//! by half-edge or face stays where it is; only what the handles mean
//! changes.
//!
//! A flip that cannot be applied (boundary edge, non-triangular neighbor)
//! is reported as [`FlipOutcome::Rejected`] and leaves the mesh untouched.
//!
//! # Example
//!
//! ```
//! use halfmesh::prelude::*;
//!
//! // Triangles ABC and BAD sharing edge AB
//! let mut mesh: HalfEdgeMesh = build_from_triangles(4, &[[0, 1, 2], [1, 0, 3]]).unwrap();
//! let (a, b) = (NodeId::new(0), NodeId::new(1));
//! let ab = mesh.find_halfedge(a, b).unwrap().unwrap();
//!
//! assert_eq!(mesh.flip(ab).unwrap(), FlipOutcome::Flipped);
//! assert_eq!(mesh.origin(ab).unwrap(), NodeId::new(2));
//! assert_eq!(mesh.destination(ab).unwrap(), NodeId::new(3));
//! ```

use std::fmt;

use crate::error::Result;

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, MeshIndex, NodeId};

/// Options for edge flips.
#[derive(Debug, Clone)]
pub struct FlipOptions {
    /// Reject flips whose new diagonal would duplicate an existing edge
    /// (default: true).
    ///
    /// The check walks the neighbors of one node. Callers that already know
    /// the quadrilateral is free of such edges can switch it off.
    pub check_existing_edge: bool,
}

impl Default for FlipOptions {
    fn default() -> Self {
        Self {
            check_existing_edge: true,
        }
    }
}

impl FlipOptions {
    /// Create options with the existing-edge check switched on or off.
    pub fn with_check_existing_edge(mut self, check: bool) -> Self {
        self.check_existing_edge = check;
        self
    }
}

/// Why a flip was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// One side of the edge is the outside face.
    Boundary,
    /// One of the two faces is not a triangle.
    NotTriangle {
        /// Edge count of the offending face.
        edges: usize,
    },
    /// Both sides of the edge belong to the same face, or the two opposite
    /// nodes are the same node.
    Degenerate,
    /// The opposite nodes are already joined by another edge.
    EdgeExists,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Boundary => write!(f, "boundary edge"),
            RejectReason::NotTriangle { edges } => {
                write!(f, "adjacent face has {} edges", edges)
            }
            RejectReason::Degenerate => write!(f, "opposite nodes coincide"),
            RejectReason::EdgeExists => write!(f, "opposite nodes already connected"),
        }
    }
}

/// Whether an edge can be flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flippability {
    /// The flip can be applied.
    Flippable,
    /// The flip would be a no-op.
    Rejected(RejectReason),
}

/// Result of a flip request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// The edge now joins the two previously opposite nodes.
    Flipped,
    /// Nothing was changed.
    Rejected(RejectReason),
}

impl FlipOutcome {
    /// Check if the flip was applied.
    pub fn is_flipped(self) -> bool {
        matches!(self, FlipOutcome::Flipped)
    }
}

/// The two triangles around an interior edge, captured before any rewrite.
///
/// `e0` runs A -> B inside `face_e`, `f0 = twin(e0)` runs B -> A inside
/// `face_f`; C is opposite the edge in `face_e`, D in `face_f`.
#[derive(Debug, Clone, Copy)]
struct FlipQuad<I: MeshIndex> {
    e: [HalfEdgeId<I>; 3],
    f: [HalfEdgeId<I>; 3],
    face_e: FaceId<I>,
    face_f: FaceId<I>,
    a: NodeId<I>,
    b: NodeId<I>,
    c: NodeId<I>,
    d: NodeId<I>,
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Check whether `he` can be flipped with default options.
    pub fn classify_flip(&self, he: HalfEdgeId<I>) -> Result<Flippability> {
        self.classify_flip_with(he, &FlipOptions::default())
    }

    /// Check whether `he` can be flipped.
    ///
    /// Fails only if a handle does not resolve.
    pub fn classify_flip_with(
        &self,
        he: HalfEdgeId<I>,
        options: &FlipOptions,
    ) -> Result<Flippability> {
        Ok(match self.flip_quad(he, options)? {
            Ok(_) => Flippability::Flippable,
            Err(reason) => Flippability::Rejected(reason),
        })
    }

    /// Flip `he` with default options.
    pub fn flip(&mut self, he: HalfEdgeId<I>) -> Result<FlipOutcome> {
        self.flip_with(he, &FlipOptions::default())
    }

    /// Flip `he`, replacing it by the other diagonal of its two triangles.
    ///
    /// Returns [`FlipOutcome::Rejected`] without touching the mesh when `he`
    /// is a boundary edge or a neighboring face is not a triangle. Errors are
    /// reserved for handles that do not resolve.
    ///
    /// Node, half-edge and face counts are unchanged. The half-edge `he` now
    /// runs from the node that was opposite it to the node that was opposite
    /// its twin. If either former endpoint stored `he` or its twin as its
    /// outgoing half-edge, it is moved to another outgoing half-edge.
    pub fn flip_with(&mut self, he: HalfEdgeId<I>, options: &FlipOptions) -> Result<FlipOutcome> {
        let q = match self.flip_quad(he, options)? {
            Ok(q) => q,
            Err(reason) => {
                log::trace!("flip of {:?} rejected: {}", he, reason);
                return Ok(FlipOutcome::Rejected(reason));
            }
        };

        let [e0, e1, e2] = q.e;
        let [f0, f1, f2] = q.f;

        // New diagonal C -> D and D -> C
        self.halfedges[e0.index()].origin = q.c;
        self.halfedges[f0.index()].origin = q.d;

        // face_e: e0 (C->D), f2 (D->B), e1 (B->C)
        // face_f: f0 (D->C), e2 (C->A), f1 (A->D)
        self.halfedges[e0.index()].next = f2;
        self.halfedges[f2.index()].next = e1;
        self.halfedges[e1.index()].next = e0;
        self.halfedges[f0.index()].next = e2;
        self.halfedges[e2.index()].next = f1;
        self.halfedges[f1.index()].next = f0;

        self.halfedges[f2.index()].left_face = q.face_e;
        self.halfedges[e2.index()].left_face = q.face_f;

        self.faces[q.face_e.index()].edge = e0;
        self.faces[q.face_f.index()].edge = f0;

        // A and B lose one outgoing half-edge each
        if self.nodes[q.a.index()].origin_edge == e0 {
            self.nodes[q.a.index()].origin_edge = f1;
        }
        if self.nodes[q.b.index()].origin_edge == f0 {
            self.nodes[q.b.index()].origin_edge = e1;
        }

        log::debug!(
            "flipped {:?}: ({:?}, {:?}) -> ({:?}, {:?})",
            he,
            q.a,
            q.b,
            q.c,
            q.d
        );
        Ok(FlipOutcome::Flipped)
    }

    /// Gather the quadrilateral around `he`, or the reason it cannot be flipped.
    ///
    /// The outer `Result` carries handle failures, the inner one rejections.
    fn flip_quad(
        &self,
        he: HalfEdgeId<I>,
        options: &FlipOptions,
    ) -> Result<std::result::Result<FlipQuad<I>, RejectReason>> {
        if self.is_boundary(he)? {
            return Ok(Err(RejectReason::Boundary));
        }

        let face_e = self.left_face(he)?;
        let face_f = self.left_face(self.twin(he)?)?;
        if face_e == face_f {
            return Ok(Err(RejectReason::Degenerate));
        }
        for face in [face_e, face_f] {
            let edges = self.face_edge_count(face)?;
            if edges != 3 {
                return Ok(Err(RejectReason::NotTriangle { edges }));
            }
        }

        let e0 = he;
        let e1 = self.next(e0)?;
        let e2 = self.next(e1)?;
        let f0 = self.twin(e0)?;
        let f1 = self.next(f0)?;
        let f2 = self.next(f1)?;

        let quad = FlipQuad {
            e: [e0, e1, e2],
            f: [f0, f1, f2],
            face_e,
            face_f,
            a: self.origin(e0)?,
            b: self.origin(f0)?,
            c: self.origin(e2)?,
            d: self.origin(f2)?,
        };

        for node in [quad.a, quad.b, quad.c, quad.d] {
            self.node(node)?;
        }
        if quad.c == quad.d {
            return Ok(Err(RejectReason::Degenerate));
        }
        if options.check_existing_edge && self.find_halfedge(quad.c, quad.d)?.is_some() {
            return Ok(Err(RejectReason::EdgeExists));
        }

        Ok(Ok(quad))
    }
}

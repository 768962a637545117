//! # Halfmesh
//!
//! A half-edge mesh core: topology only, with caller-owned data attached
//! per element.
//!
//! Halfmesh stores the connectivity of a polygonal 2-manifold (with or
//! without boundary) and leaves geometry and semantics to the caller.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) `next`/`twin`/`origin` queries with type-safe handles
//! - **Flexible indexing**: 16-bit, 32-bit, 64-bit or pointer-sized handles
//! - **Outside face**: a sentinel face that marks boundary edges
//! - **Attached data**: type-checked, element-indexed arrays shared with the caller
//! - **Edge flip**: diagonal swap between two triangles, refusing inapplicable edges
//!
//! ## Quick Start
//!
//! ```
//! use halfmesh::prelude::*;
//!
//! // Two triangles sharing the edge between nodes 0 and 1
//! let mut mesh: HalfEdgeMesh = build_from_triangles(4, &[[0, 1, 2], [1, 0, 3]]).unwrap();
//! assert_eq!(mesh.num_nodes(), 4);
//! assert_eq!(mesh.num_faces(), 2);
//!
//! let he = mesh.find_halfedge(NodeId::new(0), NodeId::new(1)).unwrap().unwrap();
//! assert!(!mesh.is_boundary(he).unwrap());
//! assert_eq!(mesh.twin(mesh.twin(he).unwrap()).unwrap(), he);
//!
//! for f in mesh.face_ids() {
//!     assert_eq!(mesh.face_edge_count(f).unwrap(), 3);
//! }
//!
//! assert_eq!(mesh.flip(he).unwrap(), FlipOutcome::Flipped);
//! ```
//!
//! ## Attaching Geometry
//!
//! The mesh never sees coordinates. Positions are an ordinary attached array:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use halfmesh::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut mesh: HalfEdgeMesh = build_from_triangles(3, &[[0, 1, 2]]).unwrap();
//! let positions = Rc::new(RefCell::new(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ]));
//! let id = mesh.attach(Rc::clone(&positions), ElementKind::Node).unwrap();
//!
//! let f = mesh.face_ids().next().unwrap();
//! let [a, b, c] = mesh.face_triangle(f).unwrap();
//! let p = mesh.fetch::<Point3<f64>>(id).unwrap();
//! let p = p.borrow();
//! let area = 0.5 * (p[b.index()] - p[a.index()]).cross(&(p[c.index()] - p[a.index()])).norm();
//! assert!((area - 0.5).abs() < 1e-12);
//! ```
//!
//! ## Threading
//!
//! Nothing in the crate synchronizes. A mesh with attached data holds
//! `Rc` handles and is therefore confined to one thread.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod data;
pub mod error;
pub mod mesh;

#[cfg(test)]
mod testing;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use halfmesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::data::{DataId, DataInfo, ElementKind, SharedData};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_triangles, to_face_lists, Face, FaceId, FlipOptions,
        FlipOutcome, Flippability, HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, Node, NodeId,
        RejectReason,
    };
}

//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation, the edge flip
//! operator and helpers to build meshes from index lists.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which stores the topology of a
//! polygonal surface as a half-edge (doubly-connected edge list) structure.
//! It holds no geometry; positions and other per-element values are attached
//! through the [`data`](crate::data) registry.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`NodeId`] - Identifies a node
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face; [`FaceId::outside`] is the exterior
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, `u64` or `usize` based on mesh size.
//!
//! # Construction
//!
//! Meshes can be assembled element by element with
//! [`HalfEdgeMesh::add_node`] and friends, or from face-node lists:
//!
//! ```
//! use halfmesh::mesh::{build_from_triangles, HalfEdgeMesh};
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(3, &[[0, 1, 2]]).unwrap();
//! assert_eq!(mesh.num_halfedges(), 6);
//! ```

mod builder;
mod flip;
mod halfedge;
mod index;

pub use builder::{build_from_polygons, build_from_triangles, to_face_lists};
pub use flip::{FlipOptions, FlipOutcome, Flippability, RejectReason};
pub use halfedge::{Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Node, NodeHalfEdgeIter};
pub use index::{FaceId, HalfEdgeId, MeshIndex, NodeId};

//! Mesh construction utilities.
//!
//! Builds a half-edge mesh from face-node index lists held in memory, and
//! converts a mesh back into such lists. Faces are given counter-clockwise.
//! Edges used by only one face get an exterior half-edge on the outside face,
//! and those exterior half-edges are linked into boundary loops.

use std::collections::HashMap;

use super::halfedge::HalfEdgeMesh;
use super::index::{HalfEdgeId, MeshIndex, NodeId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from triangles.
///
/// # Arguments
/// * `num_nodes` - Number of nodes; faces index into `0..num_nodes`
/// * `faces` - List of triangles, each as [n0, n1, n2] indices
///
/// # Example
/// ```
/// use halfmesh::mesh::{build_from_triangles, HalfEdgeMesh};
///
/// let mesh: HalfEdgeMesh = build_from_triangles(3, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_nodes(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    num_nodes: usize,
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(num_nodes, faces)
}

/// Build a half-edge mesh from polygons of any size (three nodes or more).
pub fn build_from_polygons<I: MeshIndex, P: AsRef<[usize]>>(
    num_nodes: usize,
    faces: &[P],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    // Validate node indices
    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if face.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        for (i, &ni) in face.iter().enumerate() {
            if ni >= num_nodes {
                return Err(MeshError::InvalidNodeIndex { face: fi, node: ni });
            }
            if face[..i].contains(&ni) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(num_nodes, faces.len());
    let node_ids = (0..num_nodes)
        .map(|_| mesh.add_node())
        .collect::<Result<Vec<NodeId<I>>>>()?;

    // Directed edge (n0, n1) -> half-edge, plus creation order for determinism
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::new();
    let mut directed: Vec<(usize, usize, HalfEdgeId<I>)> = Vec::new();

    // First pass: interior half-edges and faces
    for face in faces {
        let face = face.as_ref();
        let face_id = mesh.add_face()?;
        let hes = face
            .iter()
            .map(|_| mesh.add_edge())
            .collect::<Result<Vec<HalfEdgeId<I>>>>()?;

        for (i, &he) in hes.iter().enumerate() {
            let n0 = face[i];
            let n1 = face[(i + 1) % face.len()];

            mesh.set_origin(he, node_ids[n0])?;
            mesh.set_next(he, hes[(i + 1) % hes.len()])?;
            mesh.set_left_face(he, face_id)?;
            // Overwritten for shared nodes; boundary nodes are fixed up below
            mesh.set_node_edge(node_ids[n0], he)?;

            if edge_map.insert((n0, n1), he).is_some() {
                return Err(MeshError::NonManifoldEdge { n0, n1 });
            }
            directed.push((n0, n1, he));
        }
    }

    // Second pass: link twins
    let outside = mesh.outside_face();
    for &(n0, n1, he) in &directed {
        if mesh.twin(he)?.is_valid() {
            continue;
        }
        if let Some(&twin) = edge_map.get(&(n1, n0)) {
            mesh.link_twins(he, twin)?;
        } else {
            // Boundary edge - create exterior half-edge
            let boundary_he = mesh.add_edge()?;
            mesh.set_origin(boundary_he, node_ids[n1])?;
            mesh.set_left_face(boundary_he, outside)?;
            mesh.link_twins(he, boundary_he)?;
        }
    }

    // Third pass: link boundary half-edges into loops
    link_boundary_loops(&mut mesh)?;

    // Fourth pass: boundary nodes point to boundary half-edges
    fix_boundary_node_edges(&mut mesh)?;

    Ok(mesh)
}

/// Link exterior half-edges into loops around the outside face.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    let outside = mesh.outside_face();
    let boundary_hes: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.left_face(he).map_or(false, |f| f == outside))
        .collect();

    // Group by origin node for quick lookup; two loops may not share a node
    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::new();
    for &he in &boundary_hes {
        let node = mesh.origin(he)?.index();
        if outgoing.insert(node, he).is_some() {
            return Err(MeshError::NonManifoldVertex { node });
        }
    }

    for &he in &boundary_hes {
        // The next boundary half-edge starts where this one ends
        let dest = mesh.origin(mesh.twin(he)?)?.index();
        if let Some(&next_he) = outgoing.get(&dest) {
            mesh.set_next(he, next_he)?;
        }
    }

    Ok(())
}

/// Make boundary nodes store an exterior half-edge as their outgoing edge.
///
/// Also checks that rotating around each node reaches all of its outgoing
/// half-edges, which fails where closed fans meet at a single node.
fn fix_boundary_node_edges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    let mut outgoing = vec![0usize; mesh.num_nodes()];
    for he in mesh.halfedge_ids() {
        outgoing[mesh.origin(he)?.index()] += 1;
    }

    let outside = mesh.outside_face();
    for nid in mesh.node_ids().collect::<Vec<_>>() {
        if mesh.valence(nid)? != outgoing[nid.index()] {
            return Err(MeshError::NonManifoldVertex { node: nid.index() });
        }
        let boundary = mesh
            .node_halfedges(nid)?
            .find(|&he| mesh.left_face(he).map_or(false, |f| f == outside));
        if let Some(he) = boundary {
            mesh.set_node_edge(nid, he)?;
        }
    }
    Ok(())
}

/// Convert a half-edge mesh back to face-node index lists.
///
/// The outside face is not included.
pub fn to_face_lists<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Vec<Vec<usize>> {
    mesh.face_ids()
        .map(|f| {
            mesh.face_nodes(f)
                .map(|nodes| nodes.map(NodeId::index).collect())
                .unwrap_or_default()
        })
        .collect()
}

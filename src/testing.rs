//! Helpers shared by the unit tests.

use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Check every structural invariant of the store, panicking on the first
/// violation.
pub(crate) fn assert_invariants<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) {
    for he in mesh.halfedge_ids() {
        let twin = mesh.twin(he).unwrap();
        assert_eq!(mesh.twin(twin).unwrap(), he, "twin of twin of {:?}", he);
        assert_ne!(
            mesh.origin(he).unwrap(),
            mesh.origin(twin).unwrap(),
            "{:?} and its twin share an origin",
            he
        );

        let next = mesh.next(he).unwrap();
        let face = mesh.left_face(he).unwrap();
        assert_eq!(mesh.left_face(next).unwrap(), face, "face changes after {:?}", he);
        assert_eq!(
            mesh.destination(he).unwrap(),
            mesh.origin(twin).unwrap(),
            "{:?} does not end where its twin starts",
            he
        );

        // The next cycle through he has the face's length
        let mut steps = 1;
        let mut current = next;
        while current != he {
            current = mesh.next(current).unwrap();
            steps += 1;
            assert!(steps <= mesh.num_halfedges(), "open cycle at {:?}", he);
        }
        assert_eq!(mesh.face_edge_count(face).unwrap(), steps, "cycle length at {:?}", he);

        assert_eq!(mesh.next(mesh.prev(he).unwrap()).unwrap(), he);
        assert_eq!(mesh.prev(next).unwrap(), he);
    }

    for f in mesh.face_ids() {
        let edge = mesh.face(f).unwrap().edge;
        assert_eq!(mesh.left_face(edge).unwrap(), f, "face {:?} edge", f);
    }

    let outside = mesh.outside_face();
    let outside_edge = mesh.face(outside).unwrap().edge;
    if outside_edge.is_valid() {
        assert_eq!(mesh.left_face(outside_edge).unwrap(), outside);
    }

    for n in mesh.node_ids() {
        let edge = mesh.node(n).unwrap().origin_edge;
        let has_edges = mesh
            .halfedge_ids()
            .any(|he| mesh.origin(he).unwrap() == n);
        if has_edges {
            assert!(edge.is_valid(), "node {:?} has edges but no origin edge", n);
            assert_eq!(mesh.origin(edge).unwrap(), n, "origin edge of {:?}", n);
        }
    }
}

/// Faces rotated to start at their smallest node, then sorted, so two lists
/// describing the same faces compare equal.
pub(crate) fn canonical_faces(faces: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut out: Vec<Vec<usize>> = faces
        .iter()
        .map(|face| {
            let start = face
                .iter()
                .enumerate()
                .min_by_key(|&(_, n)| *n)
                .map_or(0, |(i, _)| i);
            let mut rotated = face.clone();
            rotated.rotate_left(start);
            rotated
        })
        .collect();
    out.sort();
    out
}

/// Route `log` output through the test harness. Safe to call repeatedly.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

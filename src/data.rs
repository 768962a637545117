//! Per-element data attached to a mesh.
//!
//! The mesh itself only stores topology. Anything else (positions, colors,
//! flags) lives in caller-owned arrays that are registered with the mesh and
//! indexed by the same handles as the elements they describe.
//!
//! Payloads are shared: the caller keeps one [`SharedData`] handle and the
//! registry keeps another. Each registration records the payload's element
//! type, and every fetch checks it, so asking for the wrong type yields
//! [`MeshError::TypeMismatch`] instead of a reinterpreted buffer.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use halfmesh::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut mesh: HalfEdgeMesh = build_from_triangles(3, &[[0, 1, 2]]).unwrap();
//!
//! let positions = Rc::new(RefCell::new(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ]));
//! let id = mesh.attach(Rc::clone(&positions), ElementKind::Node).unwrap();
//!
//! let fetched = mesh.fetch::<Point3<f64>>(id).unwrap();
//! assert_eq!(fetched.borrow()[1].x, 1.0);
//! assert!(mesh.fetch::<f32>(id).is_err());
//!
//! mesh.detach(id).unwrap();
//! assert!(mesh.fetch::<Point3<f64>>(id).is_err());
//! ```

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::fmt::{self, Debug, Display};
use std::mem::size_of;
use std::rc::Rc;

use crate::error::{MeshError, Result};

/// A caller-shared, element-indexed array.
pub type SharedData<T> = Rc<RefCell<Vec<T>>>;

/// The kind of element an attached array is indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Indexed by [`NodeId`](crate::mesh::NodeId).
    Node,
    /// Indexed by [`HalfEdgeId`](crate::mesh::HalfEdgeId).
    HalfEdge,
    /// Indexed by [`FaceId`](crate::mesh::FaceId), outside face included.
    Face,
}

impl ElementKind {
    /// Lowercase name, as used in handle errors.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::HalfEdge => "halfedge",
            ElementKind::Face => "face",
        }
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to an attached array.
///
/// A handle carries the generation of its slot, so once detached it stays
/// dead even after the slot is handed out again. A slot whose generation
/// reaches `u32::MAX` is retired rather than reused.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct DataId {
    slot: u32,
    generation: u32,
}

impl DataId {
    /// The slot position of this handle.
    #[inline]
    pub fn index(self) -> usize {
        self.slot as usize
    }
}

impl Debug for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D({}#{})", self.slot, self.generation)
    }
}

/// Metadata recorded when an array is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataInfo {
    /// Element kind the array is indexed by.
    pub kind: ElementKind,
    /// Number of entries at attach time.
    pub len: usize,
    /// Size in bytes of one entry.
    pub stride: usize,
    /// Name of the entry type.
    pub type_name: &'static str,
}

#[derive(Clone)]
struct Entry {
    info: DataInfo,
    type_id: TypeId,
    payload: Rc<dyn Any>,
}

#[derive(Clone)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Registry of attached arrays.
///
/// Cloning a registry clones the handles, not the arrays: both copies refer
/// to the same payloads.
#[derive(Clone, Default)]
pub struct DataRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl DataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live attachments.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    /// Check if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register `payload` as `kind` data, given the current element count.
    ///
    /// Nothing is registered if the payload length differs from `expected`.
    pub fn attach<T: 'static>(
        &mut self,
        payload: SharedData<T>,
        kind: ElementKind,
        expected: usize,
    ) -> Result<DataId> {
        let actual = payload
            .try_borrow()
            .map_err(|_| {
                MeshError::InvalidState("payload is mutably borrowed during attach".to_string())
            })?
            .len();
        if actual != expected {
            return Err(MeshError::SizeMismatch {
                kind,
                expected,
                actual,
            });
        }

        let entry = Entry {
            info: DataInfo {
                kind,
                len: actual,
                stride: size_of::<T>(),
                type_name: type_name::<T>(),
            },
            type_id: TypeId::of::<T>(),
            payload,
        };

        let id = match self.free.pop() {
            Some(slot) => {
                let s = &mut self.slots[slot as usize];
                s.generation += 1;
                s.entry = Some(entry);
                DataId {
                    slot,
                    generation: s.generation,
                }
            }
            None => {
                let slot = u32::try_from(self.slots.len()).map_err(|_| {
                    MeshError::InvalidState("too many data attachments".to_string())
                })?;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                DataId {
                    slot,
                    generation: 0,
                }
            }
        };

        log::debug!(
            "attached {:?}: {} x {} as {} data",
            id,
            actual,
            type_name::<T>(),
            kind
        );
        Ok(id)
    }

    /// Get a shared handle to the payload behind `id`.
    pub fn fetch<T: 'static>(&self, id: DataId) -> Result<SharedData<T>> {
        let entry = self.entry(id)?;
        let mismatch = || MeshError::TypeMismatch {
            stored: entry.info.type_name,
            requested: type_name::<T>(),
        };
        if entry.type_id != TypeId::of::<T>() {
            return Err(mismatch());
        }
        Rc::clone(&entry.payload)
            .downcast::<RefCell<Vec<T>>>()
            .map_err(|_| mismatch())
    }

    /// Metadata of the payload behind `id`.
    pub fn info(&self, id: DataId) -> Result<DataInfo> {
        self.entry(id).map(|e| e.info)
    }

    /// Release the registry's reference to the payload behind `id`.
    ///
    /// The handle is dead as soon as this returns. The array itself lives on
    /// for as long as the caller holds a [`SharedData`] to it.
    pub fn detach(&mut self, id: DataId) -> Result<()> {
        self.entry(id)?;
        let slot = &mut self.slots[id.index()];
        slot.entry = None;
        if slot.generation < u32::MAX {
            self.free.push(id.slot);
        } else {
            log::debug!("retiring data slot {}", id.slot);
        }
        log::debug!("detached {:?}", id);
        Ok(())
    }

    /// Iterate over live handles in slot order.
    pub fn ids(&self) -> impl Iterator<Item = DataId> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.entry.as_ref().map(|_| DataId {
                slot: i as u32,
                generation: s.generation,
            })
        })
    }

    fn entry(&self, id: DataId) -> Result<&Entry> {
        self.slots
            .get(id.index())
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.entry.as_ref())
            .ok_or_else(|| MeshError::invalid_handle("data", id.index()))
    }
}

impl Debug for DataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.ids()
                    .filter_map(|id| self.info(id).ok().map(|info| (id, info))),
            )
            .finish()
    }
}

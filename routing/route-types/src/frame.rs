//! Parent-relative poses.
//!
//! Route nodes are usually placed relative to some other object (a rigid
//! body, a winch drum). That object is represented by a shared
//! [`ParentTransform`]; nodes hold a [`Frame`] with a weak reference to it,
//! so a node never keeps its parent alive. When the parent is dropped the
//! frame falls back to its local pose in world coordinates.
//!
//! ```text
//! world = parent.pose * local          (parent alive)
//! world = local                        (no parent / parent dropped)
//! ```

use std::cell::Cell;
use std::rc::{Rc, Weak};

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named pose that route nodes can be placed relative to.
///
/// The pose has interior mutability so the owner can move it while nodes
/// keep referring to it.
///
/// # Example
///
/// ```
/// use route_types::{Frame, ParentTransform};
/// use nalgebra::{Isometry3, Point3, UnitQuaternion};
///
/// let body = ParentTransform::new("drum", Isometry3::translation(0.0, 1.0, 0.0));
/// let frame = Frame::with_parent(&body, Point3::new(1.0, 0.0, 0.0), UnitQuaternion::identity());
/// assert_eq!(frame.position(), Point3::new(1.0, 1.0, 0.0));
///
/// body.set_pose(Isometry3::translation(0.0, 2.0, 0.0));
/// assert_eq!(frame.position(), Point3::new(1.0, 2.0, 0.0));
/// ```
#[derive(Debug)]
pub struct ParentTransform {
    name: String,
    pose: Cell<Isometry3<f64>>,
}

impl ParentTransform {
    /// Create a shared parent transform.
    #[must_use]
    pub fn new(name: impl Into<String>, pose: Isometry3<f64>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            pose: Cell::new(pose),
        })
    }

    /// Name of the parent.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current world pose.
    #[must_use]
    pub fn pose(&self) -> Isometry3<f64> {
        self.pose.get()
    }

    /// Move the parent.
    pub fn set_pose(&self, pose: Isometry3<f64>) {
        self.pose.set(pose);
    }

    /// World position of the parent.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        Point3::from(self.pose.get().translation.vector)
    }

    /// World rotation of the parent.
    #[must_use]
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.pose.get().rotation
    }
}

/// Local pose with an optional, non-owning parent.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    #[cfg_attr(feature = "serde", serde(skip))]
    parent: Option<Weak<ParentTransform>>,
    local_position: Point3<f64>,
    local_rotation: UnitQuaternion<f64>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new(Point3::origin(), UnitQuaternion::identity())
    }
}

impl Frame {
    /// Frame without parent at the given world pose.
    #[must_use]
    pub fn new(position: Point3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            parent: None,
            local_position: position,
            local_rotation: rotation,
        }
    }

    /// Frame at a local pose relative to `parent`.
    #[must_use]
    pub fn with_parent(
        parent: &Rc<ParentTransform>,
        local_position: Point3<f64>,
        local_rotation: UnitQuaternion<f64>,
    ) -> Self {
        Self {
            parent: Some(Rc::downgrade(parent)),
            local_position,
            local_rotation,
        }
    }

    /// The parent, if one is set and still alive.
    #[must_use]
    pub fn parent(&self) -> Option<Rc<ParentTransform>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Returns `true` if the frame has a live parent.
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    /// Position relative to the parent.
    #[must_use]
    pub const fn local_position(&self) -> Point3<f64> {
        self.local_position
    }

    /// Rotation relative to the parent.
    #[must_use]
    pub const fn local_rotation(&self) -> UnitQuaternion<f64> {
        self.local_rotation
    }

    /// Set the position relative to the parent.
    pub fn set_local_position(&mut self, position: Point3<f64>) {
        self.local_position = position;
    }

    /// Set the rotation relative to the parent.
    pub fn set_local_rotation(&mut self, rotation: UnitQuaternion<f64>) {
        self.local_rotation = rotation;
    }

    /// World pose of the frame.
    #[must_use]
    pub fn pose(&self) -> Isometry3<f64> {
        let local = Isometry3::from_parts(
            Translation3::from(self.local_position.coords),
            self.local_rotation,
        );
        self.parent().map_or(local, |parent| parent.pose() * local)
    }

    /// World position.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        self.parent()
            .map_or(self.local_position, |parent| parent.pose() * self.local_position)
    }

    /// World rotation.
    #[must_use]
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.parent()
            .map_or(self.local_rotation, |parent| parent.rotation() * self.local_rotation)
    }

    /// Set the world position, keeping the parent.
    pub fn set_position(&mut self, position: Point3<f64>) {
        self.local_position = self.local_position_in(self.parent().as_deref(), position);
    }

    /// Set the world rotation, keeping the parent.
    pub fn set_rotation(&mut self, rotation: UnitQuaternion<f64>) {
        self.local_rotation = self.local_rotation_in(self.parent().as_deref(), rotation);
    }

    /// Change the parent.
    ///
    /// With `inherit_world_transform` the world pose is kept and the local
    /// pose recomputed for the new parent. Otherwise the local pose is kept
    /// and the frame moves with the new parent.
    pub fn set_parent(&mut self, parent: Option<&Rc<ParentTransform>>, inherit_world_transform: bool) {
        let position = self.position();
        let rotation = self.rotation();

        self.parent = parent.map(Rc::downgrade);

        if inherit_world_transform {
            self.local_position = self.local_position_in(parent.map(Rc::as_ref), position);
            self.local_rotation = self.local_rotation_in(parent.map(Rc::as_ref), rotation);
        }
    }

    /// `position` (world) expressed relative to `parent`.
    #[must_use]
    pub fn local_position_in(
        &self,
        parent: Option<&ParentTransform>,
        position: Point3<f64>,
    ) -> Point3<f64> {
        parent.map_or(position, |parent| parent.pose().inverse_transform_point(&position))
    }

    /// `rotation` (world) expressed relative to `parent`.
    #[must_use]
    pub fn local_rotation_in(
        &self,
        parent: Option<&ParentTransform>,
        rotation: UnitQuaternion<f64>,
    ) -> UnitQuaternion<f64> {
        parent.map_or(rotation, |parent| parent.rotation().inverse() * rotation)
    }
}

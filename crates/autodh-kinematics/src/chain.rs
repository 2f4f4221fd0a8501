//! Kinematic chain as an ordered list of world-frame joint axes.
//!
//! A [`KinematicChain`] is what a model loader hands to the extractor: one
//! [`AxisLine`] per actuated joint, base to end, all measured at a single
//! reference configuration. How the loader got there (URDF, OpenRAVE, a
//! hand-written table) is not this crate's concern; [`LocalJoint`] covers the
//! common case of parent-relative joint origins.

use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use autodh_core::{ChainError, LineConfig, LineError};
use autodh_geometry::AxisLine;

/// Joint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointType {
    /// Rotation about the axis; the joint variable adds to theta.
    Revolute,
    /// Translation along the axis; the joint variable adds to d.
    Prismatic,
}

impl JointType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Revolute => "revolute",
            Self::Prismatic => "prismatic",
        }
    }
}

/// A single joint in the kinematic chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainJoint {
    /// Name of this joint (from the robot description).
    pub name: String,
    pub joint_type: JointType,
    /// Joint axis in the world frame at the reference configuration.
    pub axis: AxisLine,
}

/// A joint described relative to its predecessor, the way robot descriptions
/// list them.
#[derive(Debug, Clone)]
pub struct LocalJoint {
    pub name: String,
    pub joint_type: JointType,
    /// Static transform from the previous joint frame (the world, for the
    /// first joint) to this joint frame.
    pub origin: Isometry3<f64>,
    /// Joint axis in the joint's own frame.
    pub axis: Vector3<f64>,
}

/// An ordered serial chain from a base link to an end link.
///
/// Deserialization goes through [`KinematicChain::new`], so a chain read
/// from JSON or TOML has at least two joints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawChain")]
pub struct KinematicChain {
    base_link: String,
    end_link: String,
    joints: Vec<ChainJoint>,
    /// Preferred x-axis for the first link frame, world coordinates.
    base_x_hint: Option<Vector3<f64>>,
}

/// Unchecked serialized form of [`KinematicChain`].
#[derive(Deserialize)]
struct RawChain {
    base_link: String,
    end_link: String,
    joints: Vec<ChainJoint>,
    #[serde(default)]
    base_x_hint: Option<Vector3<f64>>,
}

impl TryFrom<RawChain> for KinematicChain {
    type Error = ChainError;

    fn try_from(raw: RawChain) -> Result<Self, Self::Error> {
        let mut chain = Self::new(raw.base_link, raw.end_link, raw.joints)?;
        chain.base_x_hint = raw.base_x_hint;
        Ok(chain)
    }
}

impl KinematicChain {
    /// Build a chain from joints already expressed as world-frame lines.
    ///
    /// # Errors
    ///
    /// [`ChainError::InsufficientChain`] when fewer than two joints are given.
    pub fn new(
        base_link: impl Into<String>,
        end_link: impl Into<String>,
        joints: Vec<ChainJoint>,
    ) -> Result<Self, ChainError> {
        if joints.len() < 2 {
            return Err(ChainError::InsufficientChain {
                joints: joints.len(),
            });
        }
        Ok(Self {
            base_link: base_link.into(),
            end_link: end_link.into(),
            joints,
            base_x_hint: None,
        })
    }

    /// Build a chain from `(name, type, point on axis, axis direction)` tuples.
    ///
    /// # Errors
    ///
    /// [`ChainError::DegenerateAxis`] naming the first joint whose direction
    /// is shorter than `config.direction_epsilon`, or
    /// [`ChainError::InsufficientChain`].
    pub fn from_axes<I, S>(
        base_link: impl Into<String>,
        end_link: impl Into<String>,
        axes: I,
        config: &LineConfig,
    ) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = (S, JointType, Point3<f64>, Vector3<f64>)>,
        S: Into<String>,
    {
        let joints = axes
            .into_iter()
            .enumerate()
            .map(|(index, (name, joint_type, point, direction))| {
                let name = name.into();
                let line =
                    AxisLine::from_point_direction_eps(point, direction, config.direction_epsilon);
                match line {
                    Ok(axis) => Ok(ChainJoint {
                        name,
                        joint_type,
                        axis,
                    }),
                    Err(source) => Err(degenerate_axis(index, name, source)),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(base_link, end_link, joints)
    }

    /// Build a chain from parent-relative joints at the zero configuration.
    ///
    /// # Errors
    ///
    /// [`ChainError::DegenerateAxis`] for a joint with a zero-length axis, or
    /// [`ChainError::InsufficientChain`].
    pub fn from_local_joints(
        base_link: impl Into<String>,
        end_link: impl Into<String>,
        joints: &[LocalJoint],
        config: &LineConfig,
    ) -> Result<Self, ChainError> {
        let zeros = vec![0.0; joints.len()];
        Self::from_local_joints_at(base_link, end_link, joints, &zeros, config)
    }

    /// Build a chain from parent-relative joints at configuration `q`.
    ///
    /// Origins are composed from the world frame outward; joint `i`'s axis is
    /// recorded before its own motion `q[i]` is applied.
    ///
    /// # Errors
    ///
    /// [`ChainError::JointCountMismatch`] if `q.len() != joints.len()`, plus
    /// the errors of [`KinematicChain::from_axes`].
    pub fn from_local_joints_at(
        base_link: impl Into<String>,
        end_link: impl Into<String>,
        joints: &[LocalJoint],
        q: &[f64],
        config: &LineConfig,
    ) -> Result<Self, ChainError> {
        if q.len() != joints.len() {
            return Err(ChainError::JointCountMismatch {
                expected: joints.len(),
                got: q.len(),
            });
        }

        let mut transform = Isometry3::identity();
        let mut axes = Vec::with_capacity(joints.len());
        for (index, (joint, &position)) in joints.iter().zip(q).enumerate() {
            transform *= joint.origin;
            let direction = transform.rotation * joint.axis;
            axes.push((
                joint.name.clone(),
                joint.joint_type,
                Point3::from(transform.translation.vector),
                direction,
            ));
            let Some(unit) = Unit::try_new(joint.axis, config.direction_epsilon) else {
                return Err(degenerate_axis(
                    index,
                    joint.name.clone(),
                    LineError::Degenerate {
                        magnitude: joint.axis.norm(),
                        epsilon: config.direction_epsilon,
                    },
                ));
            };
            transform *= joint_motion(&unit, joint.joint_type, position);
        }
        Self::from_axes(base_link, end_link, axes, config)
    }

    /// Attach a preferred x-axis for the first link frame.
    ///
    /// It is projected onto the plane normal to the first axis; a hint parallel
    /// to that axis is ignored.
    #[must_use]
    pub fn with_base_x_hint(mut self, hint: Vector3<f64>) -> Self {
        self.base_x_hint = Some(hint);
        self
    }

    /// Number of joints.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn base_link(&self) -> &str {
        &self.base_link
    }

    pub fn end_link(&self) -> &str {
        &self.end_link
    }

    /// Access the joint definitions.
    pub fn joints(&self) -> &[ChainJoint] {
        &self.joints
    }

    /// Joint names in chain order.
    pub fn joint_names(&self) -> Vec<&str> {
        self.joints.iter().map(|j| j.name.as_str()).collect()
    }

    pub const fn base_x_hint(&self) -> Option<&Vector3<f64>> {
        self.base_x_hint.as_ref()
    }
}

fn degenerate_axis(index: usize, name: String, source: LineError) -> ChainError {
    ChainError::DegenerateAxis {
        index,
        name,
        source,
    }
}

/// Compute the transform for a single joint at a given position.
pub(crate) fn joint_motion(
    axis: &Unit<Vector3<f64>>,
    joint_type: JointType,
    position: f64,
) -> Isometry3<f64> {
    match joint_type {
        JointType::Prismatic => Isometry3::from_parts(
            Translation3::from(axis.into_inner() * position),
            UnitQuaternion::identity(),
        ),
        JointType::Revolute => Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(axis, position),
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Canned serial arms, described the way a robot description lists joints:
//! each joint's origin relative to the previous joint frame plus its axis in
//! its own frame. All arms are at their zero configuration.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

/// One actuated joint of a fixture arm.
#[derive(Debug, Clone)]
pub struct JointFixture {
    pub name: &'static str,
    /// Transform from the previous joint frame (or the world for the first joint).
    pub origin: Isometry3<f64>,
    /// Joint axis in the joint's own frame.
    pub axis: Vector3<f64>,
    pub prismatic: bool,
}

fn revolute(name: &'static str, xyz: [f64; 3], axis: [f64; 3]) -> JointFixture {
    JointFixture {
        name,
        origin: Isometry3::from_parts(
            Translation3::new(xyz[0], xyz[1], xyz[2]),
            UnitQuaternion::identity(),
        ),
        axis: Vector3::from(axis),
        prismatic: false,
    }
}

fn with_rpy(mut joint: JointFixture, rpy: [f64; 3]) -> JointFixture {
    joint.origin.rotation = UnitQuaternion::from_euler_angles(rpy[0], rpy[1], rpy[2]);
    joint
}

/// Two z-axis joints stacked along z: their axes coincide.
pub fn stacked_two_link() -> Vec<JointFixture> {
    vec![
        revolute("shoulder", [0.0, 0.0, 0.05], [0.0, 0.0, 1.0]),
        revolute("elbow", [0.0, 0.0, 0.3], [0.0, 0.0, 1.0]),
    ]
}

/// Planar 2R arm: two parallel z axes 0.3 apart.
pub fn planar_two_link() -> Vec<JointFixture> {
    vec![
        revolute("shoulder", [0.0, 0.0, 0.1], [0.0, 0.0, 1.0]),
        revolute("elbow", [0.3, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ]
}

/// SCARA: three parallel vertical revolute axes and a vertical prismatic
/// quill that coincides with the last one.
pub fn scara() -> Vec<JointFixture> {
    vec![
        revolute("j1", [0.0, 0.0, 0.4], [0.0, 0.0, 1.0]),
        revolute("j2", [0.35, 0.0, 0.0], [0.0, 0.0, 1.0]),
        JointFixture {
            prismatic: true,
            ..revolute("j3_quill", [0.3, 0.0, 0.0], [0.0, 0.0, -1.0])
        },
        revolute("j4_tool", [0.0, 0.0, -0.1], [0.0, 0.0, 1.0]),
    ]
}

/// Six-axis arm with a yaw base, three pitch joints and two roll joints.
///
/// Contains intersecting (yaw/pitch), parallel (pitch/pitch) and coincident
/// (roll/roll through the wrist) axis pairs.
pub fn six_dof_arm() -> Vec<JointFixture> {
    vec![
        revolute("j1_base_yaw", [0.0, 0.0, 0.05], [0.0, 0.0, 1.0]),
        revolute("j2_shoulder_pitch", [0.0, 0.0, 0.2], [0.0, 1.0, 0.0]),
        revolute("j3_elbow_pitch", [0.0, 0.0, 0.3], [0.0, 1.0, 0.0]),
        revolute("j4_forearm_roll", [0.0, 0.0, 0.1], [0.0, 0.0, 1.0]),
        revolute("j5_wrist_pitch", [0.0, 0.0, 0.2], [0.0, 1.0, 0.0]),
        revolute("j6_wrist_roll", [0.0, 0.0, 0.06], [0.0, 0.0, 1.0]),
    ]
}

/// Three joints with tilted origins: every consecutive pair is skew.
pub fn skewed_three_link() -> Vec<JointFixture> {
    vec![
        with_rpy(revolute("a", [0.1, -0.2, 0.3], [0.0, 0.0, 1.0]), [0.2, -0.1, 0.4]),
        with_rpy(revolute("b", [0.25, 0.1, 0.15], [0.0, 1.0, 0.0]), [0.5, 0.3, -0.2]),
        JointFixture {
            prismatic: true,
            ..with_rpy(revolute("c", [0.05, 0.3, -0.1], [1.0, 0.0, 0.0]), [-0.3, 0.7, 0.1])
        },
    ]
}

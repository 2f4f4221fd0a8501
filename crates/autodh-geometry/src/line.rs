//! Oriented 3-D lines in Plücker coordinates.
//!
//! An [`AxisLine`] stores a unit direction `d` and a moment `m = p x d` for any
//! point `p` on the line. The pair is normalised on construction so that
//! `|d| = 1` and `d . m = 0`; after that the value never changes.

use nalgebra::{Isometry3, Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use autodh_core::LineError;

/// Default lower bound on the magnitude of a supplied direction.
pub const DEFAULT_DIRECTION_EPSILON: f64 = 1e-9;

/// Below this `|d1 x d2|` the skew-distance formula is replaced by the
/// point-to-line distance in [`AxisLine::distance_to`].
pub const PARALLEL_EPSILON: f64 = 1e-12;

/// An oriented line: a joint's rotation or translation axis in the world frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PluckerCoordinates", into = "PluckerCoordinates")]
pub struct AxisLine {
    direction: Unit<Vector3<f64>>,
    moment: Vector3<f64>,
}

/// Raw serialized form of an [`AxisLine`]; validated on the way in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PluckerCoordinates {
    direction: [f64; 3],
    moment: [f64; 3],
}

impl TryFrom<PluckerCoordinates> for AxisLine {
    type Error = LineError;

    fn try_from(raw: PluckerCoordinates) -> Result<Self, Self::Error> {
        Self::from_plucker(Vector3::from(raw.direction), Vector3::from(raw.moment))
    }
}

impl From<AxisLine> for PluckerCoordinates {
    fn from(line: AxisLine) -> Self {
        Self {
            direction: line.direction.into_inner().into(),
            moment: line.moment.into(),
        }
    }
}

impl AxisLine {
    /// Line through `point` along `direction`, using [`DEFAULT_DIRECTION_EPSILON`].
    ///
    /// # Errors
    ///
    /// [`LineError::Degenerate`] if `|direction|` is below the epsilon,
    /// [`LineError::NonFinite`] on NaN or infinite input.
    pub fn from_point_direction(
        point: Point3<f64>,
        direction: Vector3<f64>,
    ) -> Result<Self, LineError> {
        Self::from_point_direction_eps(point, direction, DEFAULT_DIRECTION_EPSILON)
    }

    /// Line through `point` along `direction` with an explicit degeneracy epsilon.
    ///
    /// # Errors
    ///
    /// [`LineError::Degenerate`] if `|direction| < epsilon`,
    /// [`LineError::NonFinite`] on NaN or infinite input.
    pub fn from_point_direction_eps(
        point: Point3<f64>,
        direction: Vector3<f64>,
        epsilon: f64,
    ) -> Result<Self, LineError> {
        if !point.coords.iter().all(|c| c.is_finite()) {
            return Err(LineError::NonFinite);
        }
        let direction = unit_direction(direction, epsilon)?;
        Ok(Self {
            direction,
            moment: point.coords.cross(&direction.into_inner()),
        })
    }

    /// Line from raw Plücker coordinates, using [`DEFAULT_DIRECTION_EPSILON`].
    ///
    /// # Errors
    ///
    /// As [`AxisLine::from_plucker_eps`].
    pub fn from_plucker(direction: Vector3<f64>, moment: Vector3<f64>) -> Result<Self, LineError> {
        Self::from_plucker_eps(direction, moment, DEFAULT_DIRECTION_EPSILON)
    }

    /// Line from raw Plücker coordinates with an explicit degeneracy epsilon.
    ///
    /// Both vectors are divided by `|direction|` (Plücker coordinates are
    /// homogeneous). Any component of the moment along the direction is
    /// dropped so that `d . m = 0` holds exactly.
    ///
    /// # Errors
    ///
    /// [`LineError::Degenerate`] if `|direction| < epsilon`,
    /// [`LineError::NonFinite`] if either vector has a NaN or infinite component.
    pub fn from_plucker_eps(
        direction: Vector3<f64>,
        moment: Vector3<f64>,
        epsilon: f64,
    ) -> Result<Self, LineError> {
        if !moment.iter().all(|c| c.is_finite()) {
            return Err(LineError::NonFinite);
        }
        let magnitude = direction.norm();
        let unit = unit_direction(direction, epsilon)?;
        let moment = moment / magnitude;
        let moment = moment - unit.into_inner() * unit.dot(&moment);
        Ok(Self {
            direction: unit,
            moment,
        })
    }

    /// Unit direction.
    pub const fn direction(&self) -> &Unit<Vector3<f64>> {
        &self.direction
    }

    /// Moment vector `p x d`.
    pub const fn moment(&self) -> &Vector3<f64> {
        &self.moment
    }

    /// The point of the line closest to the world origin, `d x m`.
    pub fn point(&self) -> Point3<f64> {
        Point3::from(self.direction.cross(&self.moment))
    }

    /// `point() + t * direction`.
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.point() + self.direction.into_inner() * t
    }

    /// Same line, opposite orientation.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            direction: -self.direction,
            moment: -self.moment,
        }
    }

    /// The line mapped by a rigid transform.
    #[must_use]
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        let point = transform * self.point();
        let direction = transform.rotation * self.direction;
        Self {
            direction,
            moment: point.coords.cross(&direction.into_inner()),
        }
    }

    /// Reciprocal product `d1 . m2 + d2 . m1`.
    ///
    /// Zero exactly when the two lines are coplanar. For non-parallel lines it
    /// equals `-(signed distance) * |d1 x d2|`.
    pub fn reciprocal_product(&self, other: &Self) -> f64 {
        self.direction.dot(&other.moment) + other.direction.dot(&self.moment)
    }

    /// Shortest distance between the two lines.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let sin = self.direction.cross(&other.direction.into_inner()).norm();
        if sin > PARALLEL_EPSILON {
            self.reciprocal_product(other).abs() / sin
        } else {
            self.distance_to_point(&other.point())
        }
    }

    /// Unsigned angle between the two directions, in `[0, pi]`.
    pub fn angle_to(&self, other: &Self) -> f64 {
        let other_direction = other.direction.into_inner();
        let cross = self.direction.cross(&other_direction).norm();
        cross.atan2(self.direction.dot(&other_direction))
    }

    /// Whether the lines are parallel or anti-parallel: `|d1 x d2| < angle_tolerance`.
    pub fn is_parallel_to(&self, other: &Self, angle_tolerance: f64) -> bool {
        self.direction.cross(&other.direction.into_inner()).norm() < angle_tolerance
    }

    /// Whether the lines meet: distance below `distance_tolerance`.
    ///
    /// Coincident lines intersect; distinct parallel lines do not.
    pub fn intersects(&self, other: &Self, distance_tolerance: f64) -> bool {
        self.distance_to(other) < distance_tolerance
    }

    /// Same oriented line within tolerance.
    pub fn approx_eq(&self, other: &Self, angle_tolerance: f64, distance_tolerance: f64) -> bool {
        self.direction.dot(&other.direction.into_inner()) > 0.0
            && self.is_parallel_to(other, angle_tolerance)
            && self.distance_to_point(&other.point()) < distance_tolerance
    }

    /// Orthogonal projection of `point` onto the line.
    pub fn closest_point_on_line(&self, point: &Point3<f64>) -> Point3<f64> {
        let base = self.point();
        let t = (point - base).dot(&self.direction.into_inner());
        base + self.direction.into_inner() * t
    }

    /// Distance from `point` to the line.
    pub fn distance_to_point(&self, point: &Point3<f64>) -> f64 {
        (point - self.point()).cross(&self.direction.into_inner()).norm()
    }

    /// Whether `point` lies on the line within `distance_tolerance`.
    pub fn contains_point(&self, point: &Point3<f64>, distance_tolerance: f64) -> bool {
        self.distance_to_point(point) < distance_tolerance
    }
}

fn unit_direction(direction: Vector3<f64>, epsilon: f64) -> Result<Unit<Vector3<f64>>, LineError> {
    if !direction.iter().all(|c| c.is_finite()) {
        return Err(LineError::NonFinite);
    }
    let magnitude = direction.norm();
    if magnitude < epsilon {
        return Err(LineError::Degenerate { magnitude, epsilon });
    }
    Ok(Unit::new_unchecked(direction / magnitude))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! World-space distance and world-to-screen projection.
//!
//! The external world is Z-up with +X forward at zero rotation. Screen space
//! has its origin in the bottom-left corner with Y pointing up, matching the
//! overlay's render backend.
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::MIN_PROJECTION_DEPTH;

/// Orientation of the viewer's camera in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Rotation about the right axis; positive looks up.
    pub pitch: f32,
    /// Rotation about the up axis; positive turns towards +Y.
    pub yaw: f32,
    /// Rotation about the forward axis.
    pub roll: f32,
}

impl Rotation {
    /// Creates a rotation from pitch, yaw and roll in degrees.
    #[must_use]
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Returns the camera's forward, right and up axes in world space.
    #[must_use]
    pub fn axes(self) -> (Vec3, Vec3, Vec3) {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let (sr, cr) = self.roll.to_radians().sin_cos();

        let forward = Vec3::new(cp * cy, cp * sy, sp);
        let right = Vec3::new(sr * sp * cy - cr * sy, sr * sp * sy + cr * cy, -sr * cp);
        let up = Vec3::new(-(cr * sp * cy + sr * sy), cy * sr - cr * sp * sy, cr * cp);
        (forward, right, up)
    }
}

/// The local viewer's camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewerCoords {
    /// Camera location in world units.
    pub location: Vec3,
    /// Camera orientation.
    pub rotation: Rotation,
    /// Horizontal field of view in degrees.
    pub fov: f32,
    /// Viewport size in pixels.
    pub screen: Vec2,
}

impl ViewerCoords {
    /// Creates a viewer at `location` looking along +X.
    ///
    /// # Examples
    /// ```
    /// use glam::{Vec2, Vec3};
    /// use ship_overlay::geometry::ViewerCoords;
    /// let viewer = ViewerCoords::looking_forward(Vec3::ZERO, 90.0, Vec2::new(1920.0, 1080.0));
    /// assert_eq!(viewer.rotation.yaw, 0.0);
    /// ```
    #[must_use]
    pub fn looking_forward(location: Vec3, fov: f32, screen: Vec2) -> Self {
        Self {
            location,
            rotation: Rotation::default(),
            fov,
            screen,
        }
    }
}

/// Straight-line distance between two world positions.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use ship_overlay::geometry::world_distance;
/// let d = world_distance(Vec3::new(3.0, 4.0, 12.0), Vec3::ZERO);
/// assert!((d - 13.0).abs() < f32::EPSILON);
/// ```
#[must_use]
pub fn world_distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Projects `world` onto the viewer's screen.
///
/// Returns `None` when the point is behind the camera, too close to its
/// plane, or lands outside the viewport.
///
/// # Examples
/// ```
/// use glam::{Vec2, Vec3};
/// use ship_overlay::geometry::{project_to_screen, ViewerCoords};
/// let viewer = ViewerCoords::looking_forward(Vec3::ZERO, 90.0, Vec2::new(1000.0, 800.0));
/// assert_eq!(project_to_screen(&viewer, Vec3::new(500.0, 0.0, 0.0)), Some(Vec2::new(500.0, 400.0)));
/// assert_eq!(project_to_screen(&viewer, Vec3::new(-500.0, 0.0, 0.0)), None);
/// ```
#[must_use]
pub fn project_to_screen(viewer: &ViewerCoords, world: Vec3) -> Option<Vec2> {
    let (forward, right, up) = viewer.rotation.axes();
    let delta = world - viewer.location;
    let depth = delta.dot(forward);
    if !depth.is_finite() || depth < MIN_PROJECTION_DEPTH {
        return None;
    }

    let centre = viewer.screen * 0.5;
    let focal = centre.x / (viewer.fov.to_radians() * 0.5).tan();
    let point = Vec2::new(
        centre.x + delta.dot(right) * focal / depth,
        centre.y + delta.dot(up) * focal / depth,
    );

    let on_screen = point.x >= 0.0
        && point.y >= 0.0
        && point.x <= viewer.screen.x
        && point.y <= viewer.screen.y;
    on_screen.then_some(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn viewer() -> ViewerCoords {
        ViewerCoords::looking_forward(Vec3::ZERO, 90.0, Vec2::new(1000.0, 800.0))
    }

    #[test]
    fn zero_rotation_axes_are_world_axes() {
        let (forward, right, up) = Rotation::default().axes();
        assert_relative_eq!(forward.x, 1.0);
        assert_relative_eq!(right.y, 1.0);
        assert_relative_eq!(up.z, 1.0);
    }

    #[test]
    fn point_ahead_projects_to_centre() {
        let screen = project_to_screen(&viewer(), Vec3::new(1200.0, 0.0, 0.0))
            .expect("point ahead should be visible");
        assert_relative_eq!(screen.x, 500.0);
        assert_relative_eq!(screen.y, 400.0);
    }

    #[test]
    fn right_and_up_move_towards_top_right() {
        let screen = project_to_screen(&viewer(), Vec3::new(1000.0, 100.0, 50.0))
            .expect("point should be visible");
        // fov 90 puts the focal length at half the screen width.
        assert_relative_eq!(screen.x, 550.0, epsilon = 1e-3);
        assert_relative_eq!(screen.y, 425.0, epsilon = 1e-3);
    }

    #[rstest]
    #[case::behind(Vec3::new(-10.0, 0.0, 0.0))]
    #[case::behind_and_far(Vec3::new(-5000.0, 20.0, 3.0))]
    #[case::on_camera_plane(Vec3::new(0.0, 300.0, 0.0))]
    #[case::beyond_left_edge(Vec3::new(100.0, -150.0, 0.0))]
    #[case::beyond_top_edge(Vec3::new(100.0, 0.0, 90.0))]
    fn points_outside_frustum_do_not_project(#[case] world: Vec3) {
        assert_eq!(project_to_screen(&viewer(), world), None);
    }

    #[test]
    fn yaw_turns_the_view() {
        let mut turned = viewer();
        turned.rotation = Rotation::new(0.0, 90.0, 0.0);

        assert!(project_to_screen(&turned, Vec3::new(1000.0, 0.0, 0.0)).is_none());
        let screen = project_to_screen(&turned, Vec3::new(0.0, 1000.0, 0.0))
            .expect("point along +Y should be ahead after turning");
        assert_relative_eq!(screen.x, 500.0, epsilon = 1e-2);
    }

    #[test]
    fn projection_is_repeatable() {
        let world = Vec3::new(2000.0, -321.5, 77.0);
        assert_eq!(
            project_to_screen(&viewer(), world),
            project_to_screen(&viewer(), world)
        );
    }
}

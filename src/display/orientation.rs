//! # Orientation View
//!
//! Rotates a cylinder standing in for the payload body and projects it for
//! drawing.
//!
//! The pose comes straight from the latest angular-rate reading, read as
//! angles in degrees. There is no time integration, so the view tracks rate,
//! not true attitude.

use nalgebra::{Point3, Rotation3, Vector3};

use crate::telemetry::Orientation;

/// Cylinder radius
pub const CYLINDER_RADIUS: f64 = 0.4;

/// Cylinder half height (the body spans z = -0.5..=0.5)
pub const CYLINDER_HALF_HEIGHT: f64 = 0.5;

/// Grid resolution along both the height and the circumference
pub const CYLINDER_RESOLUTION: usize = 50;

/// Half extent of the visible cube
pub const VIEW_LIMIT: f64 = 0.6;

/// Camera elevation of the 3D view, degrees
const VIEW_ELEVATION_DEG: f64 = 30.0;

/// Camera azimuth of the 3D view, degrees
const VIEW_AZIMUTH_DEG: f64 = -60.0;

fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (end - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| start + step * i as f64)
}

/// Vertex grid of a cylinder centred on the origin
///
/// Rows run around the circumference, columns along the height.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    rows: usize,
    cols: usize,
    vertices: Vec<Point3<f64>>,
}

impl Cylinder {
    /// Cylinder with `resolution` steps around and along the body
    pub fn new(radius: f64, half_height: f64, resolution: usize) -> Self {
        let resolution = resolution.max(2);
        let heights: Vec<f64> = linspace(-half_height, half_height, resolution).collect();

        let vertices = linspace(0.0, std::f64::consts::TAU, resolution)
            .flat_map(|theta| {
                heights
                    .iter()
                    .map(move |&z| Point3::new(radius * theta.cos(), radius * theta.sin(), z))
            })
            .collect();

        Self {
            rows: resolution,
            cols: resolution,
            vertices,
        }
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The same grid with every vertex rotated
    pub fn rotated(&self, rotation: &Rotation3<f64>) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            vertices: self.vertices.iter().map(|p| rotation * p).collect(),
        }
    }

    /// Vertex at circumference step `row`, height step `col`
    pub fn vertex(&self, row: usize, col: usize) -> Point3<f64> {
        self.vertices[row * self.cols + col]
    }
}

impl Default for Cylinder {
    fn default() -> Self {
        Self::new(CYLINDER_RADIUS, CYLINDER_HALF_HEIGHT, CYLINDER_RESOLUTION)
    }
}

/// Intrinsic X-then-Y-then-Z rotation, `R = Rz·Ry·Rx`
pub fn rotation_from(orientation: Orientation) -> Rotation3<f64> {
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), orientation.x_deg.to_radians());
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), orientation.y_deg.to_radians());
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), orientation.z_deg.to_radians());
    rz * ry * rx
}

/// Fixed orthographic camera for the 3D view
#[derive(Debug, Clone, Copy)]
pub struct ViewProjection {
    right: Vector3<f64>,
    up: Vector3<f64>,
}

impl ViewProjection {
    pub fn new(elevation_deg: f64, azimuth_deg: f64) -> Self {
        let (el, az) = (elevation_deg.to_radians(), azimuth_deg.to_radians());
        Self {
            right: Vector3::new(-az.sin(), az.cos(), 0.0),
            up: Vector3::new(-el.sin() * az.cos(), -el.sin() * az.sin(), el.cos()),
        }
    }

    /// Screen-plane coordinates, `y` pointing up
    pub fn project(&self, p: &Point3<f64>) -> [f64; 2] {
        [p.coords.dot(&self.right), p.coords.dot(&self.up)]
    }
}

impl Default for ViewProjection {
    fn default() -> Self {
        Self::new(VIEW_ELEVATION_DEG, VIEW_AZIMUTH_DEG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: Point3<f64>, b: Point3<f64>) {
        assert!((a - b).norm() < EPS, "{:?} != {:?}", a, b);
    }

    fn pose(x_deg: f64, y_deg: f64, z_deg: f64) -> Orientation {
        Orientation { x_deg, y_deg, z_deg }
    }

    #[test]
    fn test_cylinder_grid() {
        let cylinder = Cylinder::default();
        assert_eq!(cylinder.vertices().len(), 50 * 50);

        for p in cylinder.vertices() {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - CYLINDER_RADIUS).abs() < EPS);
            assert!(p.z.abs() <= CYLINDER_HALF_HEIGHT + EPS);
        }

        assert_close(cylinder.vertex(0, 0), Point3::new(0.4, 0.0, -0.5));
        assert_close(cylinder.vertex(0, 49), Point3::new(0.4, 0.0, 0.5));
        assert_close(cylinder.vertex(49, 0), Point3::new(0.4, 0.0, -0.5));
    }

    #[test]
    fn test_zero_angles_leave_vertices_unchanged() {
        let cylinder = Cylinder::default();
        let rotated = cylinder.rotated(&rotation_from(Orientation::default()));

        for (a, b) in cylinder.vertices().iter().zip(rotated.vertices()) {
            assert_close(*a, *b);
        }
    }

    #[test]
    fn test_quarter_turn_about_each_axis() {
        let rz = rotation_from(pose(0.0, 0.0, 90.0));
        assert_close(rz * Point3::new(0.4, 0.0, 0.5), Point3::new(0.0, 0.4, 0.5));

        let rx = rotation_from(pose(90.0, 0.0, 0.0));
        assert_close(rx * Point3::new(0.0, 0.4, 0.0), Point3::new(0.0, 0.0, 0.4));
        assert_close(rx * Point3::new(0.0, 0.0, 0.5), Point3::new(0.0, -0.5, 0.0));

        let ry = rotation_from(pose(0.0, 90.0, 0.0));
        assert_close(ry * Point3::new(0.4, 0.0, 0.0), Point3::new(0.0, 0.0, -0.4));
    }

    #[test]
    fn test_x_rotation_applies_before_z() {
        let r = rotation_from(pose(90.0, 0.0, 90.0));
        // Rx leaves the x axis alone, then Rz carries it to y.
        assert_close(r * Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        assert_close(r * Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_matches_euler_composition() {
        let (x, y, z) = (12.0_f64, -33.0_f64, 71.0_f64);
        let expected =
            Rotation3::from_euler_angles(x.to_radians(), y.to_radians(), z.to_radians());
        let r = rotation_from(pose(x, y, z));
        assert!((r.matrix() - expected.matrix()).norm() < EPS);
    }

    #[test]
    fn test_projection_keeps_vertical_axis_up() {
        let view = ViewProjection::default();
        let top = view.project(&Point3::new(0.0, 0.0, 1.0));
        assert_eq!(top[0], 0.0);
        assert!(top[1] > 0.0);

        let origin = view.project(&Point3::origin());
        assert_eq!(origin, [0.0, 0.0]);
    }
}

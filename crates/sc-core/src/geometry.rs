//! Bounding-box geometry: projecting a host node's absolute, axis-aligned
//! bounds back into its parent's local, unrotated coordinate space.
//!
//! The host reports every node as an absolute axis-aligned bounding box.
//! For a node rotated by θ the box is the rotated rect's AABB, so its
//! extents are inflated: `W = w·|cos θ| + h·|sin θ|`,
//! `H = w·|sin θ| + h·|cos θ|`. [`project_rectangle`] inverts that system
//! to recover the unrotated `w`, `h` and re-centers the rect on the box
//! center, which rotation preserves.

use serde::{Deserialize, Serialize};

/// An absolute, axis-aligned bounding box as exported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A rectangle in a parent's local, unrotated coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Convert the host's radian rotation into the normalized degree convention.
///
/// The host measures positive rotation counter-clockwise; the normalized
/// tree uses clockwise-positive degrees, hence the sign flip.
#[must_use]
pub fn degrees_from_host_radians(radians: f32) -> f32 {
    -radians * (180.0 / std::f32::consts::PI)
}

/// Recover the unrotated rectangle whose axis-aligned bounds under
/// `rotation_degrees` equal `bounds`.
///
/// `bounds` must already be translated into the parent's space (absolute
/// box minus parent origin). The rotation argument is the node's total
/// effective rotation, own plus cumulative, negated — see the normalizer.
///
/// At a total rotation of exactly ±45° the linear system is singular
/// (`cos²θ = sin²θ`); the box extents are used as-is in that case.
#[must_use]
pub fn project_rectangle(bounds: &BoundingBox, rotation_degrees: f32) -> Rect {
    if rotation_degrees == 0.0 {
        return Rect {
            left: bounds.x,
            top: bounds.y,
            width: bounds.width,
            height: bounds.height,
        };
    }

    let theta = rotation_degrees.to_radians();
    let cos = theta.cos().abs();
    let sin = theta.sin().abs();
    let det = cos * cos - sin * sin; // cos 2θ

    if det.abs() < 1e-6 {
        return Rect {
            left: bounds.x,
            top: bounds.y,
            width: bounds.width,
            height: bounds.height,
        };
    }

    let width = (bounds.width * cos - bounds.height * sin) / det;
    let height = (bounds.height * cos - bounds.width * sin) / det;

    // Rotation about the rect center never moves the center, so the box
    // center and the rect center coincide.
    let center_x = bounds.x + bounds.width / 2.0;
    let center_y = bounds.y + bounds.height / 2.0;

    Rect {
        left: center_x - width / 2.0,
        top: center_y - height / 2.0,
        width,
        height,
    }
}

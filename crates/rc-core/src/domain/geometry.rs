//! Coordinate mapping from the local mirror view onto device pixels.
//!
//! The mirror view shows the device screen scaled to fit a desktop window.
//! A pointer position inside that view is normalised to `[0, 1]` on each axis
//! and then scaled by the device's reported screen size.
//!
//! # Orientation (for beginners)
//!
//! The device reports its screen size in its *natural* orientation, but the
//! mirror may show it rotated.  When the view and the device disagree on
//! orientation (one portrait, the other landscape) the device size is applied
//! with its axes swapped.  A square on either side never counts as agreeing,
//! so it also takes the swapped path.

use serde::{Deserialize, Serialize};

/// A width/height pair in points or pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns `true` if taller than wide.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Returns `true` if wider than tall.
    pub fn is_landscape(&self) -> bool {
        self.height < self.width
    }

    /// Returns `true` if both dimensions are finite and strictly positive.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A pointer position in the local view's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An integer position in device pixels, as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DevicePoint {
    pub x: i32,
    pub y: i32,
}

/// Maps a local pointer position to device pixels.
///
/// Points outside the view are clamped to its edge, so the result always lies
/// within `[0, max(remote.width, remote.height)]` on each axis.
///
/// Returns `None` when either `view` or `remote` has a zero, negative or
/// non-finite dimension.
///
/// # Examples
///
/// ```rust
/// use rc_core::domain::geometry::{map_to_device, DevicePoint, Point, Size};
///
/// let device = map_to_device(
///     Point::new(150.0, 300.0),
///     Size::new(300.0, 600.0),
///     Size::new(1080.0, 1920.0),
/// );
/// assert_eq!(device, Some(DevicePoint { x: 540, y: 960 }));
/// ```
pub fn map_to_device(local: Point, view: Size, remote: Size) -> Option<DevicePoint> {
    if !view.is_usable() || !remote.is_usable() {
        return None;
    }

    let nx = normalize(local.x, view.width);
    let ny = normalize(local.y, view.height);

    let same_orientation = (view.is_portrait() && remote.is_portrait())
        || (view.is_landscape() && remote.is_landscape());

    let (sx, sy) = if same_orientation {
        (remote.width, remote.height)
    } else {
        (remote.height, remote.width)
    };

    // `as` truncates toward zero, which is the rounding the device expects.
    Some(DevicePoint {
        x: (nx * sx) as i32,
        y: (ny * sy) as i32,
    })
}

/// Divides by `extent` and clamps into `[0, 1]`; NaN collapses to 0.
fn normalize(value: f64, extent: f64) -> f64 {
    let n = value / extent;
    if n.is_nan() {
        0.0
    } else {
        n.clamp(0.0, 1.0)
    }
}

//! Display surface value types

use cabinet_util::{DeviceId, SurfaceId};
use serde::{Deserialize, Serialize};

/// A monitor's rectangle in virtual-screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl MonitorRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// True when the two rectangles share interior area. Rectangles that only
    /// touch along an edge do not overlap.
    pub fn overlaps(&self, other: &MonitorRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Offset that centers an image inside a surface. Negative when the image is
/// larger than the surface, in which case it is cropped evenly on both sides.
pub fn centered_origin(surface: (i32, i32), image: (i32, i32)) -> (i32, i32) {
    ((surface.0 - image.0) / 2, (surface.1 - image.1) / 2)
}

/// Everything the orchestrator knows about one splash surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceInfo {
    pub id: SurfaceId,

    /// Display device the surface covers
    pub device: DeviceId,

    /// Exact monitor rectangle the surface was created over
    pub rect: MonitorRect,
}

/// Stacking position for the splash surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZOrder {
    /// Below everything, so the focused game window is visible
    Back,
    /// Topmost, restored and foreground, covering everything
    Front,
}

//! Host adapter traits

use cabinet_util::{DeviceId, ProcessId, SurfaceId};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::{SurfaceInfo, ZOrder};

/// Errors from host adapter operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Display enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("Surface {0} not found")]
    SurfaceNotFound(SurfaceId),

    #[error("Failed to load image {}", .0.display())]
    ImageLoad(PathBuf),

    #[error("Paint failed: {0}")]
    PaintFailed(String),

    #[error("Display mode change on {device} rejected: {message}")]
    DisplayMode { device: DeviceId, message: String },

    #[error("Process {0} has no visible window")]
    NoVisibleWindow(ProcessId),

    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// What the external launcher invocation runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    /// Shell verb (e.g. "open")
    pub verb: String,

    /// Script or program handed to the shell, run hidden
    pub script: String,
}

/// Splash surfaces and display configuration.
///
/// Every method is called from the single thread that owns the host message
/// queue, so implementations may hold thread-affine OS handles.
pub trait DisplayHost {
    /// Create one topmost, borderless window per active monitor, each covering
    /// its monitor rectangle exactly. Surfaces are returned in enumeration
    /// order with ids starting at 1.
    fn create_surfaces(&self) -> HostResult<Vec<SurfaceInfo>>;

    /// Load the bitmap at `image` and paint it centered over black on the
    /// surface, replacing (and releasing) whatever the surface held before.
    fn paint(&self, surface: SurfaceId, image: &Path) -> HostResult<()>;

    /// Move the surface to the back or to the topmost foreground position
    fn set_z_order(&self, surface: SurfaceId, order: ZOrder) -> HostResult<()>;

    /// Rotate the display to portrait: read the current mode, swap width and
    /// height, set 90 degree orientation, test the change, then apply it
    fn rotate_to_portrait(&self, device: &DeviceId) -> HostResult<()>;

    /// Dispatch every pending message on the host queue without blocking
    fn pump_messages(&self);

    /// Release every surface's image and window
    fn destroy_surfaces(&self);
}

/// Process table, window queries, and the external launcher
pub trait ProcessHost {
    /// First process whose executable base name matches `executable`,
    /// compared case-insensitively
    fn find_process(&self, executable: &str) -> Option<ProcessId>;

    /// Whether the process owns at least one visible top-level window
    fn has_visible_window(&self, pid: ProcessId) -> bool;

    /// Whether the process can be opened for query and has no exit code yet.
    /// Any failure to open it reads as not alive.
    fn is_alive(&self, pid: ProcessId) -> bool;

    /// Restore, focus and raise the process's first visible top-level window
    /// without moving or resizing it
    fn bring_to_front(&self, pid: ProcessId) -> HostResult<()>;

    /// Run the external launcher
    fn launch(&self, target: &LaunchTarget) -> HostResult<()>;
}

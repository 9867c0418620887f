//! Splash surface management

use cabinet_host_api::{DisplayHost, SurfaceInfo, ZOrder};
use cabinet_util::{CabinetError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One full-screen splash window per physical monitor
#[derive(Debug, Clone)]
pub struct DisplaySurface {
    pub info: SurfaceInfo,

    /// Image currently painted, replaced only by a successful paint
    pub image: Option<PathBuf>,

    pub z_order: ZOrder,
}

/// The fixed set of splash surfaces created at startup.
///
/// Monitors added or removed later are never picked up.
#[derive(Debug)]
pub struct SurfaceManager {
    surfaces: Vec<DisplaySurface>,
}

impl SurfaceManager {
    /// Create one surface per active monitor
    pub fn create<D: DisplayHost + ?Sized>(display: &D) -> Result<Self> {
        let infos = display.create_surfaces().map_err(|e| {
            warn!(error = %e, "Display enumeration failed");
            CabinetError::NoDisplays
        })?;

        if infos.is_empty() {
            warn!("No monitors enumerated");
            return Err(CabinetError::NoDisplays);
        }

        for info in &infos {
            info!(
                surface = %info.id,
                device = %info.device,
                x = info.rect.x,
                y = info.rect.y,
                width = info.rect.width,
                height = info.rect.height,
                "Splash surface created"
            );
        }

        Ok(Self {
            surfaces: infos
                .into_iter()
                .map(|info| DisplaySurface {
                    info,
                    image: None,
                    z_order: ZOrder::Front,
                })
                .collect(),
        })
    }

    pub fn surfaces(&self) -> &[DisplaySurface] {
        &self.surfaces
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Paint `image` on every surface.
    ///
    /// Returns true only if every surface painted. A failure on one surface
    /// does not stop the others, and nothing is rolled back.
    pub fn paint_all<D: DisplayHost + ?Sized>(&mut self, display: &D, image: &Path) -> bool {
        let mut all_ok = true;

        for surface in &mut self.surfaces {
            match display.paint(surface.info.id, image) {
                Ok(()) => surface.image = Some(image.to_path_buf()),
                Err(e) => {
                    warn!(surface = %surface.info.id, image = %image.display(), error = %e, "Paint failed");
                    all_ok = false;
                }
            }
        }

        debug!(image = %image.display(), all_ok, "Painted imagery");
        all_ok
    }

    /// Send every surface to the back, or raise every surface to the
    /// topmost foreground position
    pub fn set_z_order<D: DisplayHost + ?Sized>(&mut self, display: &D, order: ZOrder) {
        for surface in &mut self.surfaces {
            match display.set_z_order(surface.info.id, order) {
                Ok(()) => surface.z_order = order,
                Err(e) => warn!(surface = %surface.info.id, ?order, error = %e, "Z-order change failed"),
            }
        }
        debug!(?order, "Surfaces restacked");
    }

    /// Release every image and window. Only meaningful once, at shutdown.
    pub fn release<D: DisplayHost + ?Sized>(&mut self, display: &D) {
        if self.surfaces.is_empty() {
            return;
        }
        display.destroy_surfaces();
        info!(count = self.surfaces.len(), "Splash surfaces released");
        self.surfaces.clear();
    }
}

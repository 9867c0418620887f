//! Display orientation

use cabinet_host_api::DisplayHost;
use std::time::Duration;
use tracing::{info, warn};

use crate::{DisplaySurface, Pump};

/// Forces every display into portrait orientation
#[derive(Debug, Clone)]
pub struct OrientationController {
    /// Pause after each display
    pub settle: Duration,
    /// Pause after all displays
    pub final_settle: Duration,
}

impl OrientationController {
    pub fn new(settle: Duration, final_settle: Duration) -> Self {
        Self {
            settle,
            final_settle,
        }
    }

    /// Rotate the display behind every surface.
    ///
    /// Every display is attempted even after a failure; the result is false if
    /// any rotation was rejected.
    pub async fn rotate_all<D: DisplayHost + ?Sized>(
        &self,
        display: &D,
        pump: &Pump,
        surfaces: &[DisplaySurface],
    ) -> bool {
        let mut all_ok = true;

        for surface in surfaces {
            let device = &surface.info.device;
            match display.rotate_to_portrait(device) {
                Ok(()) => info!(surface = %surface.info.id, device = %device, "Display rotated to portrait"),
                Err(e) => {
                    warn!(surface = %surface.info.id, device = %device, error = %e, "Portrait rotation failed");
                    all_ok = false;
                }
            }
            pump.wait(display, self.settle).await;
        }

        pump.wait(display, self.final_settle).await;
        all_ok
    }
}

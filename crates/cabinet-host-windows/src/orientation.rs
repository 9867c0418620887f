//! Display mode changes

use cabinet_host_api::{HostError, HostResult};
use cabinet_util::DeviceId;
use std::mem;
use tracing::debug;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    CDS_TEST, CDS_TYPE, ChangeDisplaySettingsExW, DEVMODEW, DISP_CHANGE, DISP_CHANGE_SUCCESSFUL,
    DM_DISPLAYORIENTATION, DM_PELSHEIGHT, DM_PELSWIDTH, DMDO_90, ENUM_CURRENT_SETTINGS,
    EnumDisplaySettingsW,
};
use windows::core::PCWSTR;

use crate::wide;

/// Rotate `device` to portrait (90 degrees), swapping its resolution.
///
/// The new mode is validated with a test-only change before it is applied.
pub fn set_portrait(device: &DeviceId) -> HostResult<()> {
    let name = wide(device.as_str());
    let mut mode = DEVMODEW {
        dmSize: mem::size_of::<DEVMODEW>() as u16,
        ..Default::default()
    };

    let read =
        unsafe { EnumDisplaySettingsW(PCWSTR(name.as_ptr()), ENUM_CURRENT_SETTINGS, &mut mode) };
    if !read.as_bool() {
        return Err(HostError::DisplayMode {
            device: device.clone(),
            message: "Current mode could not be read".into(),
        });
    }

    mem::swap(&mut mode.dmPelsWidth, &mut mode.dmPelsHeight);
    mode.Anonymous1.Anonymous2.dmDisplayOrientation = DMDO_90;
    mode.dmFields = DM_PELSWIDTH | DM_PELSHEIGHT | DM_DISPLAYORIENTATION;

    let change = |flags: CDS_TYPE| -> DISP_CHANGE {
        unsafe {
            ChangeDisplaySettingsExW(
                PCWSTR(name.as_ptr()),
                Some(&mode),
                HWND::default(),
                flags,
                None,
            )
        }
    };

    let tested = change(CDS_TEST);
    if tested != DISP_CHANGE_SUCCESSFUL {
        return Err(HostError::DisplayMode {
            device: device.clone(),
            message: format!("Portrait mode rejected by test change ({})", tested.0),
        });
    }

    let applied = change(CDS_TYPE(0));
    if applied != DISP_CHANGE_SUCCESSFUL {
        return Err(HostError::DisplayMode {
            device: device.clone(),
            message: format!("Portrait mode rejected ({})", applied.0),
        });
    }

    debug!(
        device = %device,
        width = mode.dmPelsWidth,
        height = mode.dmPelsHeight,
        "Display rotated to portrait"
    );
    Ok(())
}

//! Splash windows, one per monitor

use cabinet_host_api::{
    DisplayHost, HostError, HostResult, MonitorRect, SurfaceInfo, ZOrder, centered_origin,
};
use cabinet_util::{DeviceId, SurfaceId};
use std::cell::RefCell;
use std::mem;
use std::path::Path;
use std::sync::Once;
use tracing::{debug, info, warn};
use windows::Win32::Foundation::{BOOL, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BITMAP, BLACK_BRUSH, BeginPaint, BitBlt, CreateCompatibleDC, DeleteDC, DeleteObject,
    EndPaint, EnumDisplayMonitors, FillRect, GetMonitorInfoW, GetObjectW, GetStockObject,
    HBITMAP, HBRUSH, HDC, HMONITOR, InvalidateRect, MONITORINFOEXW, PAINTSTRUCT, SRCCOPY,
    SelectObject, UpdateWindow,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GWLP_USERDATA,
    GetClientRect, GetWindowLongPtrW, HWND_BOTTOM, HWND_TOPMOST, IMAGE_BITMAP, LR_LOADFROMFILE,
    LoadImageW, MSG, PM_REMOVE, PeekMessageW, RegisterClassW, SW_RESTORE, SW_SHOW, SWP_NOACTIVATE, SWP_NOMOVE,
    SWP_NOSIZE, SetForegroundWindow, SetWindowLongPtrW, SetWindowPos, ShowWindow,
    TranslateMessage, WM_ERASEBKGND, WM_PAINT, WNDCLASSW, WS_EX_TOPMOST, WS_POPUP, WS_VISIBLE,
};
use windows::core::PCWSTR;

use crate::{from_wide, orientation, wide};

const CLASS_NAME: &str = "CabinetSplash";

struct Monitor {
    device: DeviceId,
    rect: MonitorRect,
}

struct SplashWindow {
    id: SurfaceId,
    hwnd: HWND,
    bitmap: Option<HBITMAP>,
}

impl SplashWindow {
    fn release(&mut self) {
        unsafe {
            let _ = SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            if let Some(bitmap) = self.bitmap.take() {
                let _ = DeleteObject(bitmap);
            }
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

/// Win32 display host.
///
/// Owns the splash windows and their bitmaps. Not `Send`: every call must
/// come from the thread that created the windows.
pub struct WindowsDisplay {
    windows: RefCell<Vec<SplashWindow>>,
}

impl WindowsDisplay {
    pub fn new() -> Self {
        Self {
            windows: RefCell::new(Vec::new()),
        }
    }

    fn hwnd(&self, surface: SurfaceId) -> HostResult<HWND> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.id == surface)
            .map(|w| w.hwnd)
            .ok_or(HostError::SurfaceNotFound(surface))
    }
}

impl Default for WindowsDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WindowsDisplay {
    fn drop(&mut self) {
        self.destroy_surfaces();
    }
}

impl DisplayHost for WindowsDisplay {
    fn create_surfaces(&self) -> HostResult<Vec<SurfaceInfo>> {
        self.destroy_surfaces();

        let monitors = enumerate_monitors()?;
        let hinstance: HINSTANCE = unsafe { GetModuleHandleW(PCWSTR::null()) }
            .map_err(|e| HostError::Internal(e.to_string()))?
            .into();
        let class_name = wide(CLASS_NAME);
        register_class(hinstance, &class_name);

        let mut windows = self.windows.borrow_mut();
        let mut infos = Vec::with_capacity(monitors.len());

        for monitor in monitors {
            let hwnd = unsafe {
                CreateWindowExW(
                    WS_EX_TOPMOST,
                    PCWSTR(class_name.as_ptr()),
                    PCWSTR::null(),
                    WS_POPUP | WS_VISIBLE,
                    monitor.rect.x,
                    monitor.rect.y,
                    monitor.rect.width,
                    monitor.rect.height,
                    None,
                    None,
                    hinstance,
                    None,
                )
            };
            let hwnd = match hwnd {
                Ok(hwnd) => hwnd,
                Err(e) => {
                    warn!(device = %monitor.device, error = %e, "Could not create splash window");
                    continue;
                }
            };

            unsafe {
                let _ = ShowWindow(hwnd, SW_SHOW);
                let _ = UpdateWindow(hwnd);
            }

            let id = SurfaceId::new(windows.len() as u32 + 1);
            debug!(surface = %id, device = %monitor.device, "Splash window shown");
            windows.push(SplashWindow {
                id,
                hwnd,
                bitmap: None,
            });
            infos.push(SurfaceInfo {
                id,
                device: monitor.device,
                rect: monitor.rect,
            });
        }

        Ok(infos)
    }

    fn paint(&self, surface: SurfaceId, image: &Path) -> HostResult<()> {
        let path = wide(image);
        let loaded = unsafe {
            LoadImageW(
                HINSTANCE::default(),
                PCWSTR(path.as_ptr()),
                IMAGE_BITMAP,
                0,
                0,
                LR_LOADFROMFILE,
            )
        };
        let bitmap = match loaded {
            Ok(handle) if !handle.is_invalid() => HBITMAP(handle.0),
            _ => return Err(HostError::ImageLoad(image.to_path_buf())),
        };

        let mut windows = self.windows.borrow_mut();
        let Some(window) = windows.iter_mut().find(|w| w.id == surface) else {
            unsafe {
                let _ = DeleteObject(bitmap);
            }
            return Err(HostError::SurfaceNotFound(surface));
        };

        unsafe {
            let _ = SetWindowLongPtrW(window.hwnd, GWLP_USERDATA, bitmap.0 as isize);
            if let Some(previous) = window.bitmap.replace(bitmap) {
                let _ = DeleteObject(previous);
            }
            // The bitmap is installed either way; the next WM_PAINT draws it
            if !InvalidateRect(window.hwnd, None, false).as_bool()
                || !UpdateWindow(window.hwnd).as_bool()
            {
                debug!(surface = %surface, "Immediate repaint failed, deferring to WM_PAINT");
            }
        }
        Ok(())
    }

    fn set_z_order(&self, surface: SurfaceId, order: ZOrder) -> HostResult<()> {
        let hwnd = self.hwnd(surface)?;
        let flags = SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE;

        unsafe {
            match order {
                ZOrder::Back => SetWindowPos(hwnd, HWND_BOTTOM, 0, 0, 0, 0, flags),
                ZOrder::Front => {
                    let placed = SetWindowPos(hwnd, HWND_TOPMOST, 0, 0, 0, 0, flags);
                    let _ = ShowWindow(hwnd, SW_RESTORE);
                    let _ = SetForegroundWindow(hwnd);
                    placed
                }
            }
        }
        .map_err(|e| HostError::Internal(e.to_string()))
    }

    fn rotate_to_portrait(&self, device: &DeviceId) -> HostResult<()> {
        orientation::set_portrait(device)
    }

    fn pump_messages(&self) {
        let mut msg = MSG::default();
        unsafe {
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).into() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn destroy_surfaces(&self) {
        let mut windows = self.windows.borrow_mut();
        if windows.is_empty() {
            return;
        }
        for window in windows.iter_mut() {
            window.release();
        }
        info!(count = windows.len(), "Splash windows destroyed");
        windows.clear();
    }
}

fn register_class(hinstance: HINSTANCE, class_name: &[u16]) {
    static REGISTER_CLASS: Once = Once::new();

    REGISTER_CLASS.call_once(|| unsafe {
        let wc = WNDCLASSW {
            hInstance: hinstance,
            lpszClassName: PCWSTR(class_name.as_ptr()),
            lpfnWndProc: Some(splash_wndproc),
            hbrBackground: HBRUSH(GetStockObject(BLACK_BRUSH).0),
            ..Default::default()
        };
        let _ = RegisterClassW(&wc);
    });
}

fn enumerate_monitors() -> HostResult<Vec<Monitor>> {
    unsafe extern "system" fn enum_proc(
        monitor: HMONITOR,
        _hdc: HDC,
        _rect: *mut RECT,
        data: LPARAM,
    ) -> BOOL {
        let monitors = unsafe { &mut *(data.0 as *mut Vec<Monitor>) };
        let mut info = MONITORINFOEXW::default();
        info.monitorInfo.cbSize = mem::size_of::<MONITORINFOEXW>() as u32;

        if unsafe { GetMonitorInfoW(monitor, &mut info.monitorInfo as *mut _ as *mut _) }.as_bool()
        {
            let rc = info.monitorInfo.rcMonitor;
            monitors.push(Monitor {
                device: DeviceId::new(from_wide(&info.szDevice)),
                rect: MonitorRect::new(rc.left, rc.top, rc.right - rc.left, rc.bottom - rc.top),
            });
        }
        BOOL(1)
    }

    let mut monitors: Vec<Monitor> = Vec::new();
    let ok = unsafe {
        EnumDisplayMonitors(
            HDC::default(),
            None,
            Some(enum_proc),
            LPARAM(&mut monitors as *mut Vec<Monitor> as isize),
        )
    };

    if !ok.as_bool() {
        return Err(HostError::EnumerationFailed(
            "EnumDisplayMonitors failed".into(),
        ));
    }
    Ok(monitors)
}

/// Fill black, then blit the window's bitmap centered in its client area
unsafe fn paint_bitmap(hwnd: HWND, hdc: HDC) {
    let mut client = RECT::default();
    if unsafe { GetClientRect(hwnd, &mut client) }.is_err() {
        return;
    }
    unsafe {
        FillRect(hdc, &client, HBRUSH(GetStockObject(BLACK_BRUSH).0));
    }

    let bitmap = HBITMAP(unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut _);
    if bitmap.0.is_null() {
        return;
    }

    let mut bm = BITMAP::default();
    let read = unsafe {
        GetObjectW(
            bitmap,
            mem::size_of::<BITMAP>() as i32,
            Some(&mut bm as *mut BITMAP as *mut _),
        )
    };
    if read == 0 {
        return;
    }

    let (x, y) = centered_origin(
        (client.right - client.left, client.bottom - client.top),
        (bm.bmWidth, bm.bmHeight),
    );

    unsafe {
        let mem_dc = CreateCompatibleDC(hdc);
        if mem_dc.0.is_null() {
            return;
        }
        let old = SelectObject(mem_dc, bitmap);
        let _ = BitBlt(hdc, x, y, bm.bmWidth, bm.bmHeight, mem_dc, 0, 0, SRCCOPY);
        SelectObject(mem_dc, old);
        let _ = DeleteDC(mem_dc);
    }
}

unsafe extern "system" fn splash_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            let hdc = unsafe { BeginPaint(hwnd, &mut ps) };
            if !hdc.0.is_null() {
                unsafe { paint_bitmap(hwnd, hdc) };
            }
            unsafe {
                let _ = EndPaint(hwnd, &ps);
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

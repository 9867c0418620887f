//! Game process discovery, liveness and launcher invocation

use cabinet_host_api::{HostError, HostResult, LaunchTarget, ProcessHost};
use cabinet_util::ProcessId;
use std::mem;
use tracing::{debug, warn};
use windows::Win32::Foundation::{BOOL, CloseHandle, HWND, LPARAM, STILL_ACTIVE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, PROCESS_QUERY_INFORMATION,
};
use windows::Win32::UI::Shell::ShellExecuteW;
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowThreadProcessId, HWND_TOP, IsWindowVisible, SW_HIDE, SW_RESTORE,
    SWP_NOMOVE, SWP_NOSIZE, SetForegroundWindow, SetWindowPos, ShowWindow,
};
use windows::core::PCWSTR;

use crate::{from_wide, wide};

/// Win32 process host
#[derive(Debug, Default)]
pub struct WindowsProcessHost;

impl WindowsProcessHost {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessHost for WindowsProcessHost {
    fn find_process(&self, executable: &str) -> Option<ProcessId> {
        let snapshot = match unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) } {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(error = %e, "Process snapshot failed");
                return None;
            }
        };

        let mut entry = PROCESSENTRY32W {
            dwSize: mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        let mut found = None;
        unsafe {
            if Process32FirstW(snapshot, &mut entry).is_ok() {
                loop {
                    if from_wide(&entry.szExeFile).eq_ignore_ascii_case(executable) {
                        found = Some(ProcessId::new(entry.th32ProcessID));
                        break;
                    }
                    if Process32NextW(snapshot, &mut entry).is_err() {
                        break;
                    }
                }
            }
            let _ = CloseHandle(snapshot);
        }
        found
    }

    fn has_visible_window(&self, pid: ProcessId) -> bool {
        first_visible_window(pid).is_some()
    }

    fn is_alive(&self, pid: ProcessId) -> bool {
        let Ok(handle) = (unsafe { OpenProcess(PROCESS_QUERY_INFORMATION, false, pid.as_u32()) })
        else {
            return false;
        };

        let mut exit_code = 0u32;
        let alive = unsafe { GetExitCodeProcess(handle, &mut exit_code) }.is_ok()
            && exit_code == STILL_ACTIVE.0 as u32;
        unsafe {
            let _ = CloseHandle(handle);
        }
        alive
    }

    fn bring_to_front(&self, pid: ProcessId) -> HostResult<()> {
        let hwnd = first_visible_window(pid).ok_or(HostError::NoVisibleWindow(pid))?;

        unsafe {
            let _ = ShowWindow(hwnd, SW_RESTORE);
            let _ = SetForegroundWindow(hwnd);
            SetWindowPos(hwnd, HWND_TOP, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE)
        }
        .map_err(|e| HostError::Internal(e.to_string()))
    }

    fn launch(&self, target: &LaunchTarget) -> HostResult<()> {
        let verb = wide(&target.verb);
        let script = wide(&target.script);

        let instance = unsafe {
            ShellExecuteW(
                HWND::default(),
                PCWSTR(verb.as_ptr()),
                PCWSTR(script.as_ptr()),
                PCWSTR::null(),
                PCWSTR::null(),
                SW_HIDE,
            )
        };

        // Values up to 32 are shell error codes
        let code = instance.0 as isize;
        if code <= 32 {
            warn!(script = %target.script, code, "Shell refused the launcher");
            return Err(HostError::LaunchFailed(format!(
                "ShellExecute returned {code}"
            )));
        }
        Ok(())
    }
}

/// First visible top-level window owned by `pid`, in enumeration order
fn first_visible_window(pid: ProcessId) -> Option<HWND> {
    struct Search {
        pid: u32,
        found: Option<HWND>,
    }

    unsafe extern "system" fn enum_proc(hwnd: HWND, data: LPARAM) -> BOOL {
        let search = unsafe { &mut *(data.0 as *mut Search) };
        let mut owner = 0u32;
        unsafe { GetWindowThreadProcessId(hwnd, Some(&mut owner)) };

        if owner == search.pid && unsafe { IsWindowVisible(hwnd) }.as_bool() {
            search.found = Some(hwnd);
            return BOOL(0);
        }
        BOOL(1)
    }

    let mut search = Search {
        pid: pid.as_u32(),
        found: None,
    };
    unsafe {
        // Stopping early reports an error; the search result is what matters
        let _ = EnumWindows(Some(enum_proc), LPARAM(&mut search as *mut Search as isize));
    }
    search.found
}

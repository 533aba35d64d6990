//! Win32 host adapter.
//!
//! Window-class registration is left to the embedding application; use
//! [`container_wnd_proc`] as the class's window procedure (with `DLGWINDOWEXTRA` extra bytes,
//! since unhandled messages go to `DefDlgProcW`) and [`attach`] each window to a dispatcher.

use crate::dispatcher::Dispatcher;
use crate::host::Host;
use crate::message::{LVN_ITEMACTIVATE, LVN_ITEMCHANGED, Notification, RawMessage, WM_NOTIFY};
use bridge_queue::Handle;
use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::UI::Controls::{NMHDR, NMITEMACTIVATE, NMLISTVIEW};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    DefDlgProcW, GWLP_USERDATA, GetWindowLongPtrW, PostMessageW, SetWindowLongPtrW,
};

/// Posts through `PostMessageW` and falls back to `DefDlgProcW`.
pub struct Win32Host;

impl Host for Win32Host {
    fn post_message(&self, target: Handle, code: u32, wparam: usize, lparam: isize) -> bool {
        unsafe { PostMessageW(target.0 as HWND, code, wparam, lparam) != 0 }
    }

    fn default_proc(&self, target: Handle, code: u32, wparam: usize, lparam: isize) -> isize {
        unsafe { DefDlgProcW(target.0 as HWND, code, wparam, lparam) }
    }
}

/// Copy a window-procedure call into an owned [`RawMessage`], decoding notify payloads.
///
/// # Safety
///
/// For `WM_NOTIFY`, a non-zero `lparam` must point to a valid `NMHDR` (and to the full
/// list-view structure its code implies), as the system guarantees inside a window procedure.
pub unsafe fn decode_message(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> RawMessage {
    let notification = if msg == WM_NOTIFY && lparam != 0 {
        Some(unsafe { decode_notify(lparam) })
    } else {
        None
    };

    RawMessage {
        target: Handle(hwnd as usize),
        code: msg,
        wparam,
        lparam,
        notification,
    }
}

unsafe fn decode_notify(lparam: LPARAM) -> Notification {
    let header = unsafe { &*(lparam as *const NMHDR) };
    let source = Handle(header.hwndFrom as usize);

    match header.code {
        LVN_ITEMCHANGED => {
            let list_view = unsafe { &*(lparam as *const NMLISTVIEW) };
            Notification::ItemChanged {
                source,
                item: list_view.iItem,
            }
        }
        LVN_ITEMACTIVATE => {
            let activate = unsafe { &*(lparam as *const NMITEMACTIVATE) };
            Notification::ItemActivated {
                source,
                item: activate.iItem,
            }
        }
        code => Notification::Other { source, code },
    }
}

/// Route `hwnd`'s messages through `dispatcher`.
///
/// # Safety
///
/// `hwnd` must use [`container_wnd_proc`], and `dispatcher` must outlive the window or be
/// removed with [`detach`] before it is dropped.
pub unsafe fn attach(hwnd: HWND, dispatcher: &Dispatcher<Win32Host>) {
    unsafe {
        SetWindowLongPtrW(
            hwnd,
            GWLP_USERDATA,
            dispatcher as *const Dispatcher<Win32Host> as isize,
        )
    };
}

/// Stop routing `hwnd` through a dispatcher; its messages go straight to `DefDlgProcW`.
///
/// # Safety
///
/// `hwnd` must be a valid window handle.
pub unsafe fn detach(hwnd: HWND) {
    unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) };
}

/// Window procedure for container windows.
///
/// # Safety
///
/// Only to be called by the system as a window procedure.
pub unsafe extern "system" fn container_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let dispatcher =
        unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const Dispatcher<Win32Host>;

    if dispatcher.is_null() {
        return unsafe { DefDlgProcW(hwnd, msg, wparam, lparam) };
    }

    let raw = unsafe { decode_message(hwnd, msg, wparam, lparam) };
    unsafe { &*dispatcher }.dispatch(raw)
}

//! Registration through `RegisterWindowMessageW`.

use crate::registrar::Registrar;
use windows_sys::Win32::UI::WindowsAndMessaging::RegisterWindowMessageW;

/// Registers names in the system-wide message table.
/// Thread-safe and idempotent per name, as the cache requires.
pub struct Win32Registrar;

impl Registrar for Win32Registrar {
    fn register(&self, name: &str) -> u32 {
        let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        unsafe { RegisterWindowMessageW(wide.as_ptr()) }
    }
}

//! Logical event kinds forwarded by the dispatcher.

use std::fmt;

/// Event kinds with a registered id. The discriminant is the dense cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EventKind {
    Resize = 0,
    Command = 1,
    ContextMenu = 2,
    ItemChanged = 3,
    ItemActivate = 4,
    Close = 5,
}

impl EventKind {
    /// Number of registered kinds (valid keys are `0..COUNT`).
    pub const COUNT: usize = 6;

    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::Resize,
        EventKind::Command,
        EventKind::ContextMenu,
        EventKind::ItemChanged,
        EventKind::ItemActivate,
        EventKind::Close,
    ];

    pub fn key(self) -> u32 {
        self as u32
    }

    pub fn from_key(key: u32) -> Option<Self> {
        Self::ALL.get(key as usize).copied()
    }

    /// Name registered with the host. Suffixed so it cannot clash with other applications.
    pub fn registration_name(self) -> &'static str {
        match self {
            EventKind::Resize => "wndbridge.resize.6f3c1d8e-2a47-4b90-9e15-c4d7a8b03f21",
            EventKind::Command => "wndbridge.command.b82e4f10-7c39-4d6a-a5e2-19f0c3d67b84",
            EventKind::ContextMenu => "wndbridge.contextmenu.3d9a7e52-e8c1-4f07-8b6d-52a1f4e90c37",
            EventKind::ItemChanged => "wndbridge.itemchanged.c1f05b93-46de-4a28-9c71-8e3b2d6f5a10",
            EventKind::ItemActivate => "wndbridge.itemactivate.94e2a6c7-1b58-4e3f-b0d9-7a6c5e14f829",
            EventKind::Close => "wndbridge.close.0a7d3f6b-95c2-4e81-a4f3-d2b86e1c7059",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Resize => write!(f, "resize"),
            EventKind::Command => write!(f, "command"),
            EventKind::ContextMenu => write!(f, "context-menu"),
            EventKind::ItemChanged => write!(f, "item-changed"),
            EventKind::ItemActivate => write!(f, "item-activate"),
            EventKind::Close => write!(f, "close"),
        }
    }
}

//! Raw host messages and their classification.

use bridge_queue::Handle;

pub const WM_SIZE: u32 = 0x0005;
pub const WM_CLOSE: u32 = 0x0010;
pub const WM_NOTIFY: u32 = 0x004E;
pub const WM_CONTEXTMENU: u32 = 0x007B;
pub const WM_COMMAND: u32 = 0x0111;
pub const WM_SIZING: u32 = 0x0214;

/// List-view notification codes (negative values carried in an unsigned field).
pub const LVN_ITEMCHANGED: u32 = -101i32 as u32;
pub const LVN_ITEMACTIVATE: u32 = -114i32 as u32;

/// Payload of a notify message, decoded once by the host adapter.
/// Holds no reference into host memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    ItemChanged { source: Handle, item: i32 },
    ItemActivated { source: Handle, item: i32 },
    Other { source: Handle, code: u32 },
}

/// One message as delivered to the window procedure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawMessage {
    pub target: Handle,
    pub code: u32,
    pub wparam: usize,
    pub lparam: isize,
    /// Present for `WM_NOTIFY` when the payload could be decoded.
    pub notification: Option<Notification>,
}

impl RawMessage {
    pub fn new(target: Handle, code: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            target,
            code,
            wparam,
            lparam,
            notification: None,
        }
    }

    pub fn notify(target: Handle, notification: Notification) -> Self {
        Self {
            target,
            code: WM_NOTIFY,
            wparam: 0,
            lparam: 0,
            notification: Some(notification),
        }
    }
}

/// Dispatcher's view of a raw message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostMessage {
    Close,
    ContextMenu,
    Command,
    Notify(Option<Notification>),
    /// `WM_SIZE` or `WM_SIZING`.
    Resize,
    Unhandled,
}

impl HostMessage {
    pub fn classify(raw: &RawMessage) -> Self {
        match raw.code {
            WM_CLOSE => HostMessage::Close,
            WM_CONTEXTMENU => HostMessage::ContextMenu,
            WM_COMMAND => HostMessage::Command,
            WM_NOTIFY => HostMessage::Notify(raw.notification),
            WM_SIZE | WM_SIZING => HostMessage::Resize,
            _ => HostMessage::Unhandled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let msg = |code| HostMessage::classify(&RawMessage::new(Handle(1), code, 0, 0));

        assert_eq!(msg(WM_CLOSE), HostMessage::Close);
        assert_eq!(msg(WM_CONTEXTMENU), HostMessage::ContextMenu);
        assert_eq!(msg(WM_COMMAND), HostMessage::Command);
        assert_eq!(msg(WM_SIZE), HostMessage::Resize);
        assert_eq!(msg(WM_SIZING), HostMessage::Resize);
        assert_eq!(msg(WM_NOTIFY), HostMessage::Notify(None));
        assert_eq!(msg(0x0200), HostMessage::Unhandled);
    }

    #[test]
    fn test_notification_codes() {
        assert_eq!(LVN_ITEMCHANGED, 0xFFFF_FF9B);
        assert_eq!(LVN_ITEMACTIVATE, 0xFFFF_FF8E);
    }
}

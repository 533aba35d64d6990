//! Scripted host event loop.
//!
//! A script is a JSON list of host messages. [`ScriptHost`] stands in for the windowing
//! system: it records every re-posted message and answers default-procedure calls, so a
//! whole session can be replayed through the real dispatcher without a window.

use bridge_dispatch::{
    Bridge, Handle, Host, Notification, RawMessage, WM_CLOSE, WM_COMMAND, WM_CONTEXTMENU,
    WM_SIZE, WM_SIZING,
};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// Script errors
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Script parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Script {
    /// Pause between messages, to let the consumer interleave.
    #[serde(default)]
    pub delay_ms: u64,
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// One host message, in the shape the windowing system would deliver it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    Close {
        target: usize,
    },
    ContextMenu {
        target: usize,
        #[serde(default)]
        source: usize,
        #[serde(default)]
        x: i16,
        #[serde(default)]
        y: i16,
    },
    Command {
        target: usize,
        id: u16,
        #[serde(default)]
        notify_code: u16,
        #[serde(default)]
        control: usize,
    },
    ItemChanged {
        target: usize,
        source: usize,
        item: i32,
    },
    ItemActivated {
        target: usize,
        source: usize,
        item: i32,
    },
    Resize {
        target: usize,
        width: u16,
        height: u16,
    },
    Sizing {
        target: usize,
        edge: usize,
    },
    Raw {
        target: usize,
        code: u32,
        #[serde(default)]
        wparam: usize,
        #[serde(default)]
        lparam: isize,
    },
}

impl ScriptEvent {
    /// Encode as the window procedure would receive it.
    pub fn to_raw(&self) -> RawMessage {
        match *self {
            ScriptEvent::Close { target } => RawMessage::new(Handle(target), WM_CLOSE, 0, 0),
            ScriptEvent::ContextMenu { target, source, x, y } => RawMessage::new(
                Handle(target),
                WM_CONTEXTMENU,
                source,
                make_long(x as u16, y as u16),
            ),
            ScriptEvent::Command {
                target,
                id,
                notify_code,
                control,
            } => RawMessage::new(
                Handle(target),
                WM_COMMAND,
                make_long(id, notify_code) as usize,
                control as isize,
            ),
            ScriptEvent::ItemChanged {
                target,
                source,
                item,
            } => RawMessage::notify(
                Handle(target),
                Notification::ItemChanged {
                    source: Handle(source),
                    item,
                },
            ),
            ScriptEvent::ItemActivated {
                target,
                source,
                item,
            } => RawMessage::notify(
                Handle(target),
                Notification::ItemActivated {
                    source: Handle(source),
                    item,
                },
            ),
            ScriptEvent::Resize {
                target,
                width,
                height,
            } => RawMessage::new(Handle(target), WM_SIZE, 0, make_long(width, height)),
            ScriptEvent::Sizing { target, edge } => {
                RawMessage::new(Handle(target), WM_SIZING, edge, 0)
            }
            ScriptEvent::Raw {
                target,
                code,
                wparam,
                lparam,
            } => RawMessage::new(Handle(target), code, wparam, lparam),
        }
    }
}

/// Low word / high word packing used by window messages.
fn make_long(low: u16, high: u16) -> isize {
    ((low as u32) | ((high as u32) << 16)) as isize
}

/// A message the dispatcher re-posted to the host loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostedMessage {
    pub target: Handle,
    pub code: u32,
    pub wparam: usize,
    pub lparam: isize,
}

/// Simulated windowing system.
pub struct ScriptHost {
    posted: Mutex<Vec<PostedMessage>>,
    default_calls: AtomicU64,
}

impl ScriptHost {
    pub fn new() -> Self {
        Self {
            posted: Mutex::new(Vec::new()),
            default_calls: AtomicU64::new(0),
        }
    }

    /// Everything posted so far, oldest first.
    pub fn posted(&self) -> Vec<PostedMessage> {
        self.posted
            .lock()
            .map(|posted| posted.clone())
            .unwrap_or_default()
    }

    pub fn default_calls(&self) -> u64 {
        self.default_calls.load(Ordering::Relaxed)
    }
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for ScriptHost {
    fn post_message(&self, target: Handle, code: u32, wparam: usize, lparam: isize) -> bool {
        debug!("Posted {:#06x} to {}", code, target);
        match self.posted.lock() {
            Ok(mut posted) => {
                posted.push(PostedMessage {
                    target,
                    code,
                    wparam,
                    lparam,
                });
                true
            }
            Err(_) => false,
        }
    }

    fn default_proc(&self, _target: Handle, _code: u32, _wparam: usize, _lparam: isize) -> isize {
        self.default_calls.fetch_add(1, Ordering::Relaxed);
        0
    }
}

/// Feed every scripted message through the bridge's dispatcher, in order.
/// Returns the number of messages dispatched.
pub fn replay(bridge: &Bridge<ScriptHost>, script: &Script) -> usize {
    info!("Replaying {} host messages", script.events.len());
    let delay = Duration::from_millis(script.delay_ms);

    for event in &script.events {
        bridge.dispatcher().dispatch(event.to_raw());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    script.events.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_dispatch::{BridgeOptions, EventKind};
    use bridge_kinds::AtomTable;

    const SCRIPT: &str = r#"{
        "events": [
            { "type": "item_changed", "target": 1, "source": 2, "item": 0 },
            { "type": "context_menu", "target": 1, "source": 2, "x": 10, "y": 20 },
            { "type": "resize", "target": 1, "width": 640, "height": 480 },
            { "type": "item_activated", "target": 1, "source": 2, "item": 5 },
            { "type": "raw", "target": 1, "code": 512 },
            { "type": "close", "target": 1 }
        ]
    }"#;

    #[test]
    fn test_parse_script() {
        let script: Script = serde_json::from_str(SCRIPT).unwrap();

        assert_eq!(script.delay_ms, 0);
        assert_eq!(script.events.len(), 6);
        assert_eq!(
            script.events[1],
            ScriptEvent::ContextMenu {
                target: 1,
                source: 2,
                x: 10,
                y: 20
            }
        );
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let result: Result<Script, _> =
            serde_json::from_str(r#"{ "events": [ { "type": "paint", "target": 1 } ] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_word_packing() {
        let raw = ScriptEvent::Command {
            target: 1,
            id: 0x42,
            notify_code: 1,
            control: 9,
        }
        .to_raw();
        assert_eq!(raw.code, WM_COMMAND);
        assert_eq!(raw.wparam, 0x0001_0042);
        assert_eq!(raw.lparam, 9);

        let raw = ScriptEvent::ContextMenu {
            target: 1,
            source: 2,
            x: -1,
            y: 3,
        }
        .to_raw();
        assert_eq!(raw.wparam, 2);
        assert_eq!(raw.lparam, 0x0003_FFFF);
    }

    #[test]
    fn test_replay_routes_messages() {
        let script: Script = serde_json::from_str(SCRIPT).unwrap();
        let bridge = Bridge::init(
            ScriptHost::new(),
            Box::new(AtomTable::new()),
            BridgeOptions::default(),
        );

        assert_eq!(replay(&bridge, &script), 6);

        let kinds = bridge.kinds();
        let posted: Vec<u32> = bridge
            .dispatcher()
            .host()
            .posted()
            .iter()
            .map(|m| m.code)
            .collect();
        assert_eq!(
            posted,
            vec![
                kinds.id(EventKind::ContextMenu),
                kinds.id(EventKind::Command),
                kinds.id(EventKind::Resize),
                kinds.id(EventKind::Close),
            ]
        );
        // resize and the raw message both reach the default procedure
        assert_eq!(bridge.dispatcher().host().default_calls(), 2);

        let queued: Vec<_> = std::iter::from_fn(|| bridge.queue().try_dequeue().1).collect();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].kind, kinds.id(EventKind::ItemChanged));
        assert_eq!(queued[1].kind, kinds.id(EventKind::ItemActivate));
        assert_eq!(queued[1].param2, 5);
    }
}

//! Window-procedure classification table.

use crate::host::Host;
use crate::message::{HostMessage, Notification, RawMessage};
use bridge_kinds::{EventKind, KindRegistry, UNAVAILABLE};
use bridge_queue::{EventQueue, EventRecord, Handle};
use std::sync::Arc;

/// Dispatcher behavior switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchOptions {
    /// A context-menu message is also re-posted as a command.
    ///
    /// This has always been the observable behavior and consumers may rely on it, though it
    /// looks like a missing `break` rather than intent. Turn it off to post only the
    /// context-menu kind.
    pub context_menu_also_commands: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            context_menu_also_commands: true,
        }
    }
}

/// Turns raw host messages into re-posted registered messages or queued records.
///
/// `dispatch` takes `&self` and holds no lock across host calls, so the host may re-enter it
/// from inside `default_proc`. Kinds should be resolved before the first message (see
/// [`KindRegistry::preload`]) so that the hot path is a cached lookup.
pub struct Dispatcher<H: Host> {
    host: H,
    queue: Arc<EventQueue>,
    kinds: Arc<KindRegistry>,
    options: DispatchOptions,
}

impl<H: Host> Dispatcher<H> {
    pub fn new(
        host: H,
        queue: Arc<EventQueue>,
        kinds: Arc<KindRegistry>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            host,
            queue,
            kinds,
            options,
        }
    }

    /// Handle one message and return the window-procedure result.
    pub fn dispatch(&self, raw: RawMessage) -> isize {
        match HostMessage::classify(&raw) {
            HostMessage::Close => {
                self.post(raw.target, EventKind::Close, raw.wparam, raw.lparam);
                0
            }
            HostMessage::ContextMenu => {
                self.post(raw.target, EventKind::ContextMenu, raw.wparam, raw.lparam);
                if self.options.context_menu_also_commands {
                    self.post(raw.target, EventKind::Command, raw.wparam, raw.lparam);
                }
                0
            }
            HostMessage::Command => {
                self.post(raw.target, EventKind::Command, raw.wparam, raw.lparam);
                0
            }
            HostMessage::Notify(notification) => {
                match notification {
                    Some(Notification::ItemChanged { source, item }) => {
                        self.enqueue(source, EventKind::ItemChanged, item);
                    }
                    Some(Notification::ItemActivated { source, item }) => {
                        self.enqueue(source, EventKind::ItemActivate, item);
                    }
                    Some(Notification::Other { .. }) | None => {}
                }
                0
            }
            HostMessage::Resize => {
                let result = self
                    .host
                    .default_proc(raw.target, raw.code, raw.wparam, raw.lparam);
                self.post(raw.target, EventKind::Resize, 0, 0);
                result
            }
            HostMessage::Unhandled => {
                self.host
                    .default_proc(raw.target, raw.code, raw.wparam, raw.lparam)
            }
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Re-post under the registered id. Unavailable kinds are skipped.
    fn post(&self, target: Handle, kind: EventKind, wparam: usize, lparam: isize) -> bool {
        match self.kinds.id(kind) {
            UNAVAILABLE => false,
            id => self.host.post_message(target, id, wparam, lparam),
        }
    }

    /// Queue an item notification. A full queue drops it; the queue counts the drop.
    fn enqueue(&self, source: Handle, kind: EventKind, item: i32) -> bool {
        match self.kinds.id(kind) {
            UNAVAILABLE => false,
            id => self
                .queue
                .enqueue(EventRecord::new(source, id, 0, item as isize)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::*;
    use crate::testing::{Call, RecordingHost};
    use bridge_kinds::{AtomTable, Registrar};
    use std::num::NonZeroUsize;

    const WINDOW: Handle = Handle(0x100);
    const LIST: Handle = Handle(0x200);

    struct Fixture {
        dispatcher: Dispatcher<RecordingHost>,
        queue: Arc<EventQueue>,
        kinds: Arc<KindRegistry>,
    }

    fn fixture_with(capacity: usize, options: DispatchOptions) -> Fixture {
        let queue = Arc::new(EventQueue::with_capacity(
            NonZeroUsize::new(capacity).unwrap(),
        ));
        let kinds = Arc::new(KindRegistry::new(Box::new(AtomTable::new())));
        kinds.preload();
        Fixture {
            dispatcher: Dispatcher::new(
                RecordingHost::new(77),
                queue.clone(),
                kinds.clone(),
                options,
            ),
            queue,
            kinds,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(8, DispatchOptions::default())
    }

    #[test]
    fn test_close_is_reposted_not_queued() {
        let f = fixture();

        let result = f
            .dispatcher
            .dispatch(RawMessage::new(WINDOW, WM_CLOSE, 3, 4));

        assert_eq!(result, 0);
        assert_eq!(
            f.dispatcher.host().calls(),
            vec![Call::Post {
                target: WINDOW,
                code: f.kinds.id(EventKind::Close),
                wparam: 3,
                lparam: 4,
            }]
        );
        assert!(f.queue.is_empty());
    }

    #[test]
    fn test_context_menu_also_posts_command() {
        let f = fixture();

        let result = f
            .dispatcher
            .dispatch(RawMessage::new(WINDOW, WM_CONTEXTMENU, 0x300, 0x0050_0040));

        assert_eq!(result, 0);
        assert_eq!(
            f.dispatcher.host().posted_codes(),
            vec![
                f.kinds.id(EventKind::ContextMenu),
                f.kinds.id(EventKind::Command)
            ]
        );
    }

    #[test]
    fn test_context_menu_alone_when_disabled() {
        let f = fixture_with(
            8,
            DispatchOptions {
                context_menu_also_commands: false,
            },
        );

        f.dispatcher
            .dispatch(RawMessage::new(WINDOW, WM_CONTEXTMENU, 0x300, 0));

        assert_eq!(
            f.dispatcher.host().posted_codes(),
            vec![f.kinds.id(EventKind::ContextMenu)]
        );
    }

    #[test]
    fn test_command_is_reposted() {
        let f = fixture();

        assert_eq!(
            f.dispatcher
                .dispatch(RawMessage::new(WINDOW, WM_COMMAND, 0x0000_0042, 0)),
            0
        );
        assert_eq!(
            f.dispatcher.host().calls(),
            vec![Call::Post {
                target: WINDOW,
                code: f.kinds.id(EventKind::Command),
                wparam: 0x42,
                lparam: 0,
            }]
        );
    }

    #[test]
    fn test_item_notifications_are_queued() {
        let f = fixture();

        let changed = f.dispatcher.dispatch(RawMessage::notify(
            WINDOW,
            Notification::ItemChanged {
                source: LIST,
                item: 4,
            },
        ));
        let activated = f.dispatcher.dispatch(RawMessage::notify(
            WINDOW,
            Notification::ItemActivated {
                source: LIST,
                item: -1,
            },
        ));

        assert_eq!((changed, activated), (0, 0));
        assert!(f.dispatcher.host().calls().is_empty());
        assert_eq!(
            f.queue.try_dequeue(),
            (
                2,
                Some(EventRecord::new(
                    LIST,
                    f.kinds.id(EventKind::ItemChanged),
                    0,
                    4
                ))
            )
        );
        assert_eq!(
            f.queue.try_dequeue(),
            (
                1,
                Some(EventRecord::new(
                    LIST,
                    f.kinds.id(EventKind::ItemActivate),
                    0,
                    -1
                ))
            )
        );
    }

    #[test]
    fn test_other_notifications_are_swallowed() {
        let f = fixture();

        let other = f.dispatcher.dispatch(RawMessage::notify(
            WINDOW,
            Notification::Other {
                source: LIST,
                code: -2i32 as u32,
            },
        ));
        let undecoded = f
            .dispatcher
            .dispatch(RawMessage::new(WINDOW, WM_NOTIFY, 0, 0));

        assert_eq!((other, undecoded), (0, 0));
        assert!(f.dispatcher.host().calls().is_empty());
        assert!(f.queue.is_empty());
    }

    #[test]
    fn test_resize_runs_default_first() {
        for code in [WM_SIZE, WM_SIZING] {
            let f = fixture();

            let result = f.dispatcher.dispatch(RawMessage::new(WINDOW, code, 1, 2));

            assert_eq!(result, 77);
            assert_eq!(
                f.dispatcher.host().calls(),
                vec![
                    Call::Default {
                        target: WINDOW,
                        code,
                    },
                    Call::Post {
                        target: WINDOW,
                        code: f.kinds.id(EventKind::Resize),
                        wparam: 0,
                        lparam: 0,
                    },
                ]
            );
        }
    }

    #[test]
    fn test_unhandled_goes_to_default_proc() {
        let f = fixture();

        assert_eq!(
            f.dispatcher.dispatch(RawMessage::new(WINDOW, 0x0201, 1, 2)),
            77
        );
        assert_eq!(
            f.dispatcher.host().calls(),
            vec![Call::Default {
                target: WINDOW,
                code: 0x0201,
            }]
        );
    }

    #[test]
    fn test_full_queue_drops_silently() {
        let f = fixture_with(1, DispatchOptions::default());
        let msg = |item| {
            RawMessage::notify(
                WINDOW,
                Notification::ItemChanged { source: LIST, item },
            )
        };

        assert_eq!(f.dispatcher.dispatch(msg(1)), 0);
        assert_eq!(f.dispatcher.dispatch(msg(2)), 0);

        assert_eq!(f.queue.dropped(), 1);
        assert_eq!(f.queue.try_dequeue().1.map(|r| r.param2), Some(1));
    }

    struct NoIds;

    impl Registrar for NoIds {
        fn register(&self, _name: &str) -> u32 {
            0
        }
    }

    #[test]
    fn test_unavailable_kinds_are_skipped() {
        let queue = Arc::new(EventQueue::new());
        let dispatcher = Dispatcher::new(
            RecordingHost::new(0),
            queue.clone(),
            Arc::new(KindRegistry::new(Box::new(NoIds))),
            DispatchOptions::default(),
        );

        dispatcher.dispatch(RawMessage::new(WINDOW, WM_CLOSE, 0, 0));
        dispatcher.dispatch(RawMessage::notify(
            WINDOW,
            Notification::ItemChanged {
                source: LIST,
                item: 0,
            },
        ));

        assert!(dispatcher.host().calls().is_empty());
        assert!(queue.is_empty());
    }
}

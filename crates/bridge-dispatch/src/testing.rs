//! Host double shared by the unit tests.

use crate::host::Host;
use bridge_queue::Handle;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Post {
        target: Handle,
        code: u32,
        wparam: usize,
        lparam: isize,
    },
    Default {
        target: Handle,
        code: u32,
    },
}

/// Records every host call; the default procedure answers with `default_result`.
pub struct RecordingHost {
    calls: Mutex<Vec<Call>>,
    default_result: isize,
}

impl RecordingHost {
    pub fn new(default_result: isize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            default_result,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn posted_codes(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Post { code, .. } => Some(code),
                Call::Default { .. } => None,
            })
            .collect()
    }
}

impl Host for RecordingHost {
    fn post_message(&self, target: Handle, code: u32, wparam: usize, lparam: isize) -> bool {
        self.calls.lock().unwrap().push(Call::Post {
            target,
            code,
            wparam,
            lparam,
        });
        true
    }

    fn default_proc(&self, target: Handle, code: u32, _wparam: usize, _lparam: isize) -> isize {
        self.calls.lock().unwrap().push(Call::Default { target, code });
        self.default_result
    }
}

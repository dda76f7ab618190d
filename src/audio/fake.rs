//! Recording audio backend for tests. Tracks how many handles are alive.

use std::{cell::RefCell, rc::Rc};

use super::{AudioBackend, AudioError, PlaybackHandle};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Create(u32, String),
    Loop(u32, bool),
    Volume(u32, f32),
    Play(u32),
    Pause(u32),
    Release(u32),
}

#[derive(Default)]
pub(crate) struct Log {
    pub(crate) events: Vec<Event>,
    pub(crate) next_id: u32,
    pub(crate) live: u32,
    pub(crate) max_live: u32,
}

#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    pub(crate) log: Rc<RefCell<Log>>,
    pub(crate) fail_locator: Option<String>,
}

pub(crate) struct FakeHandle {
    id: u32,
    locator: String,
    fail_play: bool,
    log: Rc<RefCell<Log>>,
}

impl AudioBackend for FakeBackend {
    type Handle = FakeHandle;

    fn validate(&self, locator: &str) -> Result<(), AudioError> {
        if locator.contains("://") {
            return Err(AudioError::UnsupportedLocator(locator.to_string()));
        }
        Ok(())
    }

    fn create_handle(&mut self, locator: &str) -> Result<FakeHandle, AudioError> {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        log.live += 1;
        log.max_live = log.max_live.max(log.live);
        let id = log.next_id;
        log.events.push(Event::Create(id, locator.to_string()));
        Ok(FakeHandle {
            id,
            locator: locator.to_string(),
            fail_play: self.fail_locator.as_deref() == Some(locator),
            log: self.log.clone(),
        })
    }
}

impl PlaybackHandle for FakeHandle {
    fn set_loop(&mut self, looping: bool) {
        self.log.borrow_mut().events.push(Event::Loop(self.id, looping));
    }

    fn set_volume(&mut self, volume: f32) {
        self.log
            .borrow_mut()
            .events
            .push(Event::Volume(self.id, volume));
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if self.fail_play {
            return Err(AudioError::Decode(format!("cannot decode {}", self.locator)));
        }
        self.log.borrow_mut().events.push(Event::Play(self.id));
        Ok(())
    }

    fn pause(&mut self) {
        self.log.borrow_mut().events.push(Event::Pause(self.id));
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        let mut log = self.log.borrow_mut();
        log.live -= 1;
        log.events.push(Event::Release(self.id));
    }
}


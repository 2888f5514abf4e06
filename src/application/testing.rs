//! Fake backends and factories shared by the application tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::notification::NotifyOptions;

use super::ports::{Backend, BackendError, BackendFactory};

/// Ordered log of backend calls, shared by every fake of one test
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub struct FakeBackend {
    title: &'static str,
    options: NotifyOptions,
    log: CallLog,
    fail_notify: bool,
    fail_turn_on: bool,
    fail_turn_off: bool,
}

#[async_trait]
impl Backend for FakeBackend {
    fn title(&self) -> &str {
        self.title
    }

    fn reconfigure(&mut self, options: NotifyOptions) {
        self.log.push(format!("{}:reconfigure", self.name()));
        self.options = options;
    }

    async fn notify(&self, message: &str, options: &NotifyOptions) -> Result<(), BackendError> {
        let merged = self.options.merge(options);
        let color = merged.get_text("color").unwrap_or_default();
        self.log
            .push(format!("{}:notify:{}:{}", self.name(), message, color));
        if self.fail_notify {
            return Err(BackendError::NotifyFailed("boom".to_string()));
        }
        Ok(())
    }

    async fn turn_on(&mut self) -> Result<(), BackendError> {
        self.log.push(format!("{}:turn_on", self.name()));
        if self.fail_turn_on {
            return Err(BackendError::AlreadyOn);
        }
        Ok(())
    }

    async fn turn_off(&mut self) -> Result<(), BackendError> {
        self.log.push(format!("{}:turn_off", self.name()));
        if self.fail_turn_off {
            return Err(BackendError::AlreadyOff);
        }
        Ok(())
    }
}

/// Factory whose availability and failure modes are fixed per test
pub struct FakeFactory {
    name: &'static str,
    title: &'static str,
    outcome: Option<BackendError>,
    fail_notify: bool,
    fail_turn_on: bool,
    fail_turn_off: bool,
    log: CallLog,
    created: Arc<AtomicUsize>,
}

impl FakeFactory {
    pub fn new(title: &'static str, name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            title,
            outcome: None,
            fail_notify: false,
            fail_turn_on: false,
            fail_turn_off: false,
            log: log.clone(),
            created: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(mut self, error: BackendError) -> Self {
        self.outcome = Some(error);
        self
    }

    pub fn failing_notify(mut self) -> Self {
        self.fail_notify = true;
        self
    }

    pub fn failing_turn_on(mut self) -> Self {
        self.fail_turn_on = true;
        self
    }

    pub fn failing_turn_off(mut self) -> Self {
        self.fail_turn_off = true;
        self
    }

    /// Counter of successful constructions
    pub fn created(&self) -> Arc<AtomicUsize> {
        self.created.clone()
    }

    pub fn arc(self) -> Arc<dyn BackendFactory> {
        Arc::new(self)
    }
}

#[async_trait]
impl BackendFactory for FakeFactory {
    fn name(&self) -> &str {
        self.name
    }

    async fn create(&self, options: &NotifyOptions) -> Result<Box<dyn Backend>, BackendError> {
        if let Some(err) = &self.outcome {
            return Err(err.clone());
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeBackend {
            title: self.title,
            options: options.clone(),
            log: self.log.clone(),
            fail_notify: self.fail_notify,
            fail_turn_on: self.fail_turn_on,
            fail_turn_off: self.fail_turn_off,
        }))
    }
}

#![cfg(test)]

use crate::models::{Event, Organization};
use crate::pagination::cursor::Page;
use crate::pagination::traits::{ChildFetcher, ErrorSink, FetchErrorScope, ParentFetcher};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub(crate) fn org(id: &str) -> Organization {
    Organization::new(id, format!("{id}-name"))
}

pub(crate) fn ev(id: &str) -> Event {
    Event::new(id, format!("Event {id}"))
}

#[derive(Clone)]
enum Scripted<T> {
    Page(Page<T>),
    Fail(String),
}

impl<T: Clone> Scripted<T> {
    fn resolve(&self) -> Result<Page<T>> {
        match self {
            Scripted::Page(page) => Ok(page.clone()),
            Scripted::Fail(msg) => Err(Error::FetchMessage(msg.clone())),
        }
    }
}

#[derive(Clone)]
struct Gate {
    source_id: String,
    cursor: Option<String>,
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

/// In-memory fetcher answering from scripted pages and recording every call
/// as `parents:<cursor>` or `children:<source>:<cursor>` (`-` for no cursor).
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    parent_pages: Mutex<HashMap<Option<String>, Scripted<Organization>>>,
    child_pages: Mutex<HashMap<(String, Option<String>), Scripted<Event>>>,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<Gate>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn parents(&self, cursor: Option<&str>, page: Page<Organization>) {
        self.parent_pages
            .lock()
            .unwrap()
            .insert(cursor.map(str::to_string), Scripted::Page(page));
    }

    pub(crate) fn parents_fail(&self, cursor: Option<&str>, msg: &str) {
        self.parent_pages
            .lock()
            .unwrap()
            .insert(cursor.map(str::to_string), Scripted::Fail(msg.to_string()));
    }

    pub(crate) fn children(&self, source_id: &str, cursor: Option<&str>, page: Page<Event>) {
        self.child_pages.lock().unwrap().insert(
            (source_id.to_string(), cursor.map(str::to_string)),
            Scripted::Page(page),
        );
    }

    pub(crate) fn children_fail(&self, source_id: &str, cursor: Option<&str>, msg: &str) {
        self.child_pages.lock().unwrap().insert(
            (source_id.to_string(), cursor.map(str::to_string)),
            Scripted::Fail(msg.to_string()),
        );
    }

    /// Blocks the matching child fetch until `release` is notified.
    /// `entered` is notified once the fetch has started.
    pub(crate) fn gate(&self, source_id: &str, cursor: Option<&str>) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Gate {
            source_id: source_id.to_string(),
            cursor: cursor.map(str::to_string),
            entered: entered.clone(),
            release: release.clone(),
        });
        (entered, release)
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ParentFetcher<Organization> for ScriptedFetcher {
    async fn fetch_parents_page(&self, cursor: Option<&str>) -> Result<Page<Organization>> {
        self.record(format!("parents:{}", cursor.unwrap_or("-")));
        let scripted = self
            .parent_pages
            .lock()
            .unwrap()
            .get(&cursor.map(str::to_string))
            .cloned();
        match scripted {
            Some(s) => s.resolve(),
            None => Err(Error::NotFound(format!("unscripted parent page {cursor:?}"))),
        }
    }
}

#[async_trait]
impl ChildFetcher<Organization, Event> for ScriptedFetcher {
    async fn fetch_children_page(
        &self,
        source: &Organization,
        cursor: Option<&str>,
    ) -> Result<Page<Event>> {
        self.record(format!("children:{}:{}", source.id, cursor.unwrap_or("-")));
        let key = (source.id.clone(), cursor.map(str::to_string));

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            if gate.source_id == key.0 && gate.cursor == key.1 {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
        }

        let scripted = self.child_pages.lock().unwrap().get(&key).cloned();
        match scripted {
            Some(s) => s.resolve(),
            None => Err(Error::NotFound(format!("unscripted child page {key:?}"))),
        }
    }
}

/// Error sink remembering every report.
#[derive(Default)]
pub(crate) struct RecordingSink {
    reports: Mutex<Vec<(FetchErrorScope, String)>>,
}

impl RecordingSink {
    pub(crate) fn reports(&self) -> Vec<(FetchErrorScope, String)> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorSink for RecordingSink {
    fn report_error(&self, scope: FetchErrorScope, detail: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((scope, detail.to_string()));
    }
}

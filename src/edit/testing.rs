//! In-memory stand-ins for the control plane and the editor

use anyhow::{Result, anyhow};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use crate::k8s::{ResourceRef, ResourceStore, StaleResource};

/// How [`RecordingStore::submit`] answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBehavior {
    Accept,
    Reject(String),
    Conflict,
}

/// A [`ResourceStore`] holding at most one object and recording every call
pub struct RecordingStore<K> {
    object: Option<K>,
    on_submit: SubmitBehavior,
    fetches: Mutex<Vec<ResourceRef>>,
    submits: Mutex<Vec<(ResourceRef, K)>>,
}

impl<K: Clone> RecordingStore<K> {
    /// A store whose fetch returns `object`
    pub fn with_object(object: K) -> Self {
        Self {
            object: Some(object),
            on_submit: SubmitBehavior::Accept,
            fetches: Mutex::new(Vec::new()),
            submits: Mutex::new(Vec::new()),
        }
    }

    /// A store whose fetch always fails with "not found"
    pub fn empty() -> Self {
        Self {
            object: None,
            on_submit: SubmitBehavior::Accept,
            fetches: Mutex::new(Vec::new()),
            submits: Mutex::new(Vec::new()),
        }
    }

    pub fn on_submit(mut self, behavior: SubmitBehavior) -> Self {
        self.on_submit = behavior;
        self
    }

    pub fn fetches(&self) -> Vec<ResourceRef> {
        self.fetches.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// Every submit call, accepted or not, in order
    pub fn submits(&self) -> Vec<(ResourceRef, K)> {
        self.submits.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl<K: Clone> ResourceStore<K> for RecordingStore<K> {
    async fn fetch(&self, reference: &ResourceRef) -> Result<K> {
        if let Ok(mut fetches) = self.fetches.lock() {
            fetches.push(reference.clone());
        }

        self.object
            .clone()
            .ok_or_else(|| anyhow!("{} \"{}\" not found", reference.kind, reference.name))
    }

    async fn submit(&self, reference: &ResourceRef, object: &K) -> Result<K> {
        if let Ok(mut submits) = self.submits.lock() {
            submits.push((reference.clone(), object.clone()));
        }

        match &self.on_submit {
            SubmitBehavior::Accept => Ok(object.clone()),
            SubmitBehavior::Reject(message) => Err(anyhow!("{}", message)),
            SubmitBehavior::Conflict => Err(anyhow!("the object has been modified").context(
                StaleResource {
                    reference: reference.clone(),
                },
            )),
        }
    }
}

/// Give a closure the exact signature [`Editor`](super::Editor) expects
pub fn scripted<F>(f: F) -> F
where
    F: Fn(&Path) -> io::Result<Option<i32>>,
{
    f
}

/// An editor that leaves the file alone and exits cleanly
pub fn untouched(_: &Path) -> io::Result<Option<i32>> {
    Ok(Some(0))
}

/// An editor that rewrites the file with `f(contents)` and exits cleanly
pub fn rewriting<F>(f: F) -> impl Fn(&Path) -> io::Result<Option<i32>>
where
    F: Fn(&str) -> String,
{
    move |path: &Path| {
        let contents = std::fs::read_to_string(path)?;
        std::fs::write(path, f(&contents))?;
        Ok(Some(0))
    }
}

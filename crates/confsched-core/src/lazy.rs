//! Lazy loading of secondary entity fields
//!
//! Entities come back from the schedule endpoint with only their core
//! fields populated. Expensive fields (speaker bios, talk summaries,
//! tags) live behind a per-entity detail URI and are fetched on first
//! read through [`Lazy`].
//!
//! The fetch/merge algorithm is identical for every entity shape; only
//! the field table differs. Entities therefore declare their lazy
//! fields as data — an ordered list of [`LazyFieldSpec`] entries mapping
//! a field to its remote JSON path and a setter — instead of each entity
//! hand-rolling its own detail parser.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::LazyLoadError;
use crate::http::HttpClient;

/// Declared type of a lazily-loaded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    TextSet,
}

/// A value parsed out of a detail payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    TextSet(BTreeSet<String>),
}

impl FieldValue {
    pub fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_int(self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_text_set(self) -> Option<BTreeSet<String>> {
        match self {
            FieldValue::TextSet(values) => Some(values),
            _ => None,
        }
    }
}

/// One entry of an entity's lazy-field table.
///
/// `path` is either a top-level key of the detail object, or
/// `"collection/sub"` meaning: read `collection` as an array of objects
/// and collect the `sub` string of every element into a set.
pub struct LazyFieldSpec<D> {
    pub name: &'static str,
    pub path: &'static str,
    pub kind: FieldKind,
    pub set: fn(&mut D, FieldValue),
}

/// Capability contract for entities with a remote detail resource.
pub trait LazyFields {
    /// Holder for the lazily-populated fields, all unset initially.
    type Details: Default + Send + Sync + 'static;

    /// URI of the detail resource, or `None` if this instance has no
    /// details to load (lazy access is then a permanent no-op).
    fn detail_uri(&self) -> Option<&str>;

    /// The entity's lazy-field dispatch table.
    fn fields() -> &'static [LazyFieldSpec<Self::Details>];
}

/// Per-entity load state.
///
/// The in-flight state is implicit: the state mutex is held across the
/// fetch, so concurrent readers of the same entity wait for it while
/// loads of different entities proceed independently.
enum LoadState {
    /// No fetch attempted yet (or the last attempt hit a transport
    /// error and is eligible for retry on next access).
    Unloaded,
    /// Fetch done; the declared fields hold whatever the payload had.
    Loaded,
    /// The detail resource answered 404. Terminal: fields stay unset
    /// and no further fetch is attempted for this instance.
    Missing,
}

/// An entity plus the state of its lazily-loaded details.
///
/// Core fields are reachable without any I/O through `Deref`; the
/// detail fields are read through [`Lazy::details`], which triggers the
/// fetch on first access. Equality, hashing and `Debug` all delegate to
/// the entity alone, so an instance read before lazy enrichment stays
/// equal to one read after it.
pub struct Lazy<T: LazyFields> {
    entity: T,
    details: RwLock<T::Details>,
    state: Mutex<LoadState>,
    http: Arc<dyn HttpClient>,
}

impl<T: LazyFields> Lazy<T> {
    pub fn new(entity: T, http: Arc<dyn HttpClient>) -> Self {
        Self {
            entity,
            details: RwLock::new(T::Details::default()),
            state: Mutex::new(LoadState::Unloaded),
            http,
        }
    }

    /// The wrapped entity's core fields (never fetches).
    pub fn entity(&self) -> &T {
        &self.entity
    }

    /// Read the lazily-loaded details, fetching them first if needed.
    pub async fn details<R>(&self, read: impl FnOnce(&T::Details) -> R) -> Result<R, LazyLoadError> {
        self.ensure_loaded().await?;
        let details = self.details.read().unwrap();
        Ok(read(&details))
    }

    async fn ensure_loaded(&self) -> Result<(), LazyLoadError> {
        let mut state = self.state.lock().await;
        if !matches!(*state, LoadState::Unloaded) {
            return Ok(());
        }

        let Some(uri) = self.entity.detail_uri().map(str::to_owned) else {
            // Nothing to load for this instance, ever.
            *state = LoadState::Loaded;
            return Ok(());
        };

        debug!("lazy loading entity details from {}", uri);
        let response = self.http.get(&uri).await?;
        if response.status == 404 {
            warn!("detail resource {} returned 404, not retrying", uri);
            *state = LoadState::Missing;
            return Ok(());
        }

        let json: Value = serde_json::from_str(&response.body)
            .map_err(|e| LazyLoadError::Parse(e.to_string()))?;
        let Some(object) = json.as_object() else {
            return Err(LazyLoadError::Parse(format!(
                "expected a JSON object from {uri}"
            )));
        };

        let mut details = self.details.write().unwrap();
        for spec in T::fields() {
            match extract_field(object, spec) {
                Some(value) => (spec.set)(&mut details, value),
                None => warn!("no usable field {} ({}) in {}", spec.name, spec.path, uri),
            }
        }
        drop(details);

        *state = LoadState::Loaded;
        Ok(())
    }
}

/// Pull one declared field out of a detail payload.
///
/// Absent or wrongly-typed fields yield `None`; the caller logs and
/// leaves the field unset, which is not an error for the whole fetch.
fn extract_field<D>(object: &Map<String, Value>, spec: &LazyFieldSpec<D>) -> Option<FieldValue> {
    match spec.path.split_once('/') {
        Some((collection, sub)) => {
            let array = object.get(collection)?.as_array()?;
            let values = array
                .iter()
                .filter_map(|element| element.get(sub).and_then(Value::as_str))
                .map(str::to_owned)
                .collect();
            Some(FieldValue::TextSet(values))
        }
        None => {
            let value = object.get(spec.path)?;
            match spec.kind {
                FieldKind::Text => value.as_str().map(|s| FieldValue::Text(s.to_owned())),
                FieldKind::Int => value.as_i64().map(FieldValue::Int),
                // Sets always come from a collection path.
                FieldKind::TextSet => None,
            }
        }
    }
}

impl<T: LazyFields> Deref for Lazy<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.entity
    }
}

impl<T: LazyFields + PartialEq> PartialEq for Lazy<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl<T: LazyFields + Eq> Eq for Lazy<T> {}

impl<T: LazyFields + Hash> Hash for Lazy<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity.hash(state);
    }
}

impl<T: LazyFields + fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

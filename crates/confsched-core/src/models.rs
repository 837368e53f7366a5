//! Domain model for the conference schedule
//!
//! Entities are plain data holders: no network or parsing logic lives
//! here. Each entity declares its own detail URI and lazy-field table
//! through [`LazyFields`]; the fetch/merge machinery is in
//! [`crate::lazy`].

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::lazy::{FieldKind, FieldValue, Lazy, LazyFieldSpec, LazyFields};

/// Kind of a schedule slot, as enumerated by the REST service.
///
/// The wire value is free text ("Coffee Break"); it is normalized by
/// uppercasing and replacing spaces with underscores before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresentationKind {
    Registration,
    Breakfast,
    Break,
    CoffeeBreak,
    Lunch,
    Keynote,
    Talk,
    University,
    HandsOnLab,
    Quickie,
    Bof,
}

impl PresentationKind {
    /// Parse the wire representation. Unknown kinds are `None`; callers
    /// treat that as a fatal parse failure for the element.
    pub fn from_wire(raw: &str) -> Option<Self> {
        let normalized = raw.to_uppercase().replace(' ', "_");
        let kind = match normalized.as_str() {
            "REGISTRATION" => Self::Registration,
            "BREAKFAST" => Self::Breakfast,
            "BREAK" => Self::Break,
            "COFFEE_BREAK" => Self::CoffeeBreak,
            "LUNCH" => Self::Lunch,
            "KEYNOTE" => Self::Keynote,
            "TALK" => Self::Talk,
            "UNIVERSITY" => Self::University,
            "HANDS_ON_LAB" => Self::HandsOnLab,
            "QUICKIE" => Self::Quickie,
            "BOF" => Self::Bof,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether slots of this kind have somebody on stage. Speaking
    /// kinds carry a real (or "TBA") title; the rest title to their code.
    pub fn is_speaking(self) -> bool {
        matches!(
            self,
            Self::Keynote
                | Self::Talk
                | Self::University
                | Self::HandsOnLab
                | Self::Quickie
                | Self::Bof
        )
    }
}

/// A speaker reference as it appears in a schedule slot.
///
/// Only id, display name and detail URI come with the schedule payload;
/// image and bio are fetched lazily from the detail resource.
#[derive(Debug, Clone)]
pub struct Speaker {
    pub id: i32,
    pub name: String,
    pub speaker_uri: String,
}

/// Lazily-populated speaker fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerDetails {
    pub image_uri: Option<String>,
    pub bio: Option<String>,
}

impl Speaker {
    pub fn new(id: i32, name: impl Into<String>, speaker_uri: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            speaker_uri: speaker_uri.into(),
        }
    }
}

// Speaker identity is the id alone.
impl PartialEq for Speaker {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Speaker {}

impl Hash for Speaker {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

fn set_image_uri(details: &mut SpeakerDetails, value: FieldValue) {
    details.image_uri = value.into_text();
}

fn set_bio(details: &mut SpeakerDetails, value: FieldValue) {
    details.bio = value.into_text();
}

static SPEAKER_FIELDS: [LazyFieldSpec<SpeakerDetails>; 2] = [
    LazyFieldSpec { name: "image_uri", path: "imageURI", kind: FieldKind::Text, set: set_image_uri },
    LazyFieldSpec { name: "bio", path: "bio", kind: FieldKind::Text, set: set_bio },
];

impl LazyFields for Speaker {
    type Details = SpeakerDetails;

    fn detail_uri(&self) -> Option<&str> {
        Some(&self.speaker_uri)
    }

    fn fields() -> &'static [LazyFieldSpec<SpeakerDetails>] {
        &SPEAKER_FIELDS
    }
}

impl Lazy<Speaker> {
    pub async fn image_uri(&self) -> crate::error::Result<Option<String>> {
        self.details(|d| d.image_uri.clone()).await
    }

    pub async fn bio(&self) -> crate::error::Result<Option<String>> {
        self.details(|d| d.bio.clone()).await
    }
}

/// A schedule slot: a talk, keynote, break, lunch and so on.
///
/// The core fields are immutable once parsed. Summary, track, experience
/// level and tags live behind the detail resource and are loaded on
/// first read.
#[derive(Debug, Clone)]
pub struct Presentation {
    /// 0 for slots without a detail resource (breaks, registration...).
    pub id: i32,
    pub from_time: NaiveDateTime,
    pub to_time: NaiveDateTime,
    pub code: String,
    pub type_name: String,
    pub kind: PresentationKind,
    pub title: String,
    pub speakers: Vec<Arc<Lazy<Speaker>>>,
    pub room: String,
    pub partner_slot: bool,
    pub presentation_uri: Option<String>,
}

/// Lazily-populated presentation fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationDetails {
    pub summary: Option<String>,
    pub track: Option<String>,
    pub experience: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

impl Presentation {
    /// Slots shorter than this render differently in calendar UIs.
    const SHORT_EVENT_THRESHOLD_MINUTES: i64 = 30;

    /// Whether the slot lasts under half an hour.
    pub fn is_short_event(&self) -> bool {
        (self.to_time - self.from_time).num_minutes() < Self::SHORT_EVENT_THRESHOLD_MINUTES
    }
}

// Identity can't be the id alone: slots without a detail resource all
// have id == 0. Lazily-loaded fields are deliberately excluded so that
// an instance read before enrichment stays equal to one read after.
impl PartialEq for Presentation {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.from_time == other.from_time
            && self.code == other.code
            && self.kind == other.kind
            && self.partner_slot == other.partner_slot
            && self.room == other.room
            && self.speakers == other.speakers
            && self.title == other.title
            && self.to_time == other.to_time
            && self.type_name == other.type_name
    }
}

impl Eq for Presentation {}

impl Hash for Presentation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.from_time.hash(state);
        self.code.hash(state);
        self.kind.hash(state);
        self.partner_slot.hash(state);
        self.room.hash(state);
        for speaker in &self.speakers {
            speaker.hash(state);
        }
        self.title.hash(state);
        self.to_time.hash(state);
        self.type_name.hash(state);
    }
}

fn set_summary(details: &mut PresentationDetails, value: FieldValue) {
    details.summary = value.into_text();
}

fn set_track(details: &mut PresentationDetails, value: FieldValue) {
    details.track = value.into_text();
}

fn set_experience(details: &mut PresentationDetails, value: FieldValue) {
    details.experience = value.into_text();
}

fn set_tags(details: &mut PresentationDetails, value: FieldValue) {
    details.tags = value.into_text_set();
}

static PRESENTATION_FIELDS: [LazyFieldSpec<PresentationDetails>; 4] = [
    LazyFieldSpec { name: "summary", path: "summary", kind: FieldKind::Text, set: set_summary },
    LazyFieldSpec { name: "track", path: "track", kind: FieldKind::Text, set: set_track },
    LazyFieldSpec { name: "experience", path: "experience", kind: FieldKind::Text, set: set_experience },
    LazyFieldSpec { name: "tags", path: "tags/name", kind: FieldKind::TextSet, set: set_tags },
];

impl LazyFields for Presentation {
    type Details = PresentationDetails;

    fn detail_uri(&self) -> Option<&str> {
        self.presentation_uri.as_deref()
    }

    fn fields() -> &'static [LazyFieldSpec<PresentationDetails>] {
        &PRESENTATION_FIELDS
    }
}

impl Lazy<Presentation> {
    pub async fn summary(&self) -> crate::error::Result<Option<String>> {
        self.details(|d| d.summary.clone()).await
    }

    pub async fn track(&self) -> crate::error::Result<Option<String>> {
        self.details(|d| d.track.clone()).await
    }

    pub async fn experience(&self) -> crate::error::Result<Option<String>> {
        self.details(|d| d.experience.clone()).await
    }

    pub async fn tags(&self) -> crate::error::Result<Option<BTreeSet<String>>> {
        self.details(|d| d.tags.clone()).await
    }
}

/// A MySchedule user: identity plus the set of favourited slot ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MyScheduleUser {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Granted by the activation endpoint; cleared again when the
    /// service rejects it.
    #[serde(default)]
    pub activation_code: Option<String>,
    /// `None` until fetched from the service.
    #[serde(default)]
    pub favourites: Option<BTreeSet<i32>>,
}

impl MyScheduleUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn with_activation_code(mut self, code: impl Into<String>) -> Self {
        self.activation_code = Some(code.into());
        self
    }

    pub fn has_favourited(&self, presentation: &Presentation) -> bool {
        self.favourites
            .as_ref()
            .is_some_and(|ids| ids.contains(&presentation.id))
    }
}

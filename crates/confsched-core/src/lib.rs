//! confsched-core: domain model and lazy loading for confsched
//!
//! This crate holds the pieces of the data-access layer that do no
//! network I/O themselves:
//!
//! - The domain entities (`Presentation`, `Speaker`, `MyScheduleUser`)
//!   with their identity and equality rules
//! - The generic lazy-loading mechanism (`Lazy`, `LazyFields`) that
//!   fetches an entity's secondary fields on first read, driven by a
//!   declarative per-entity field table
//! - The `HttpClient` collaborator contract the REST facade and the
//!   lazy loader both require
//!
//! The actual REST facade lives in `confsched-rest`.

pub mod error;
pub mod http;
pub mod lazy;
pub mod models;

pub use error::LazyLoadError;
pub use http::{HttpClient, HttpResponse, TransportError};
pub use lazy::{FieldKind, FieldValue, Lazy, LazyFieldSpec, LazyFields};
pub use models::{
    MyScheduleUser, Presentation, PresentationDetails, PresentationKind, Speaker, SpeakerDetails,
};

/// Re-export models for easy use
pub mod prelude {
    pub use super::{Lazy, MyScheduleUser, Presentation, PresentationKind, Speaker};
}

//! REST facade for the conference schedule API
//!
//! Issues the HTTP calls, parses the JSON payloads into domain entities
//! wrapped for lazy loading, and performs the MySchedule read/write
//! operations. You can inject your own `HttpClient` implementation with
//! [`ScheduleClient::with_http_client`]; [`ScheduleClient::new`] uses
//! the reqwest-backed default.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use confsched_core::{HttpClient, Lazy, MyScheduleUser, Presentation, PresentationKind, Speaker};
use serde_json::{Map, Value};
use tracing::{debug, error, info};
use urlencoding::encode;

use crate::config::ScheduleConfig;
use crate::error::{Result, ScheduleError};
use crate::http::ReqwestHttpClient;

/// Wire format of schedule timestamps: naive local time, millisecond
/// precision, no timezone.
const JSON_DATE_PATTERN: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Facade for the conference REST API.
pub struct ScheduleClient {
    config: ScheduleConfig,
    http: Arc<dyn HttpClient>,
}

impl ScheduleClient {
    /// Create a facade backed by the default reqwest client.
    pub fn new(config: ScheduleConfig) -> Result<Self> {
        let http = Arc::new(ReqwestHttpClient::new()?);
        Ok(Self::with_http_client(config, http))
    }

    /// Create a facade with an injected HTTP client implementation.
    pub fn with_http_client(config: ScheduleConfig, http: Arc<dyn HttpClient>) -> Self {
        debug!("initializing schedule facade for {}", config.rest_base_url);
        Self { config, http }
    }

    /// Activate a MySchedule account for the given user details.
    ///
    /// The service answers 201 on success; every other outcome surfaces
    /// as [`ScheduleError::ActivationFailed`] with the same user-facing
    /// message (the raw status is only logged).
    pub async fn activate_my_schedule_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<()> {
        let body = format!(
            "firstName={}&lastName={}&email={}",
            encode(first_name),
            encode(last_name),
            encode(email)
        );

        match self.http.post_form(&self.config.activation_url(), &body).await {
            Ok(201) => Ok(()),
            Ok(status) => {
                error!("activation response code: {}", status);
                Err(ScheduleError::ActivationFailed)
            }
            Err(e) => {
                error!("activation request failed: {}", e);
                Err(ScheduleError::ActivationFailed)
            }
        }
    }

    /// Save the user's favourites to their MySchedule.
    ///
    /// A 409 means the stored activation code is no longer accepted:
    /// the code is cleared on the user (forcing a fresh sign-in) and
    /// [`ScheduleError::ActivationRejected`] is returned.
    pub async fn save_user_schedule(&self, user: &mut MyScheduleUser) -> Result<()> {
        let Some(code) = user.activation_code.clone() else {
            return Err(ScheduleError::InvalidArgument(
                "activation code and e-mail must be set for the user".to_string(),
            ));
        };
        if user.email.is_empty() {
            return Err(ScheduleError::InvalidArgument(
                "activation code and e-mail must be set for the user".to_string(),
            ));
        }
        let Some(favourites) = &user.favourites else {
            return Err(ScheduleError::InvalidArgument(
                "user must have favourites to save".to_string(),
            ));
        };

        let mut body = format!("code={}", encode(&code));
        for favourite_id in favourites {
            body.push_str(&format!("&favorites={favourite_id}"));
        }

        let url = format!("{}/{}", self.config.schedule_url(), user.email);
        match self.http.post_form(&url, &body).await {
            Ok(201) => Ok(()),
            Ok(409) => {
                error!("activation code rejected while saving schedule");
                user.activation_code = None;
                Err(ScheduleError::ActivationRejected)
            }
            Ok(status) => {
                error!("save schedule response code: {}", status);
                Err(ScheduleError::SaveFailed)
            }
            Err(e) => {
                error!("save schedule request failed: {}", e);
                Err(ScheduleError::SaveFailed)
            }
        }
    }

    /// Check whether the user's e-mail and activation code are valid.
    ///
    /// 200 is valid, 409 is invalid; anything else fails.
    pub async fn is_valid_user(&self, user: &MyScheduleUser) -> Result<bool> {
        let Some(code) = &user.activation_code else {
            return Err(ScheduleError::InvalidArgument(
                "activation code and e-mail must be set for the user".to_string(),
            ));
        };
        if user.email.is_empty() {
            return Err(ScheduleError::InvalidArgument(
                "activation code and e-mail must be set for the user".to_string(),
            ));
        }

        let body = format!("email={}&code={}", encode(&user.email), encode(code));
        match self.http.post_form(&self.config.validation_url(), &body).await {
            Ok(200) => Ok(true),
            Ok(409) => Ok(false),
            Ok(status) => {
                error!("validation response code: {}", status);
                Err(ScheduleError::ValidationFailed)
            }
            Err(e) => {
                error!("validation request failed: {}", e);
                Err(ScheduleError::ValidationFailed)
            }
        }
    }

    /// Fetch the user's favourited presentation ids into the user.
    ///
    /// No-op for a user without an e-mail. A 204 means the user simply
    /// has no favourites yet.
    pub async fn fetch_user_favourites(&self, user: &mut MyScheduleUser) -> Result<()> {
        if user.email.is_empty() {
            return Ok(());
        }

        let url = format!("{}/{}", self.config.schedule_url(), user.email);
        let response = self
            .http
            .get(&url)
            .await
            .map_err(|e| ScheduleError::FetchFailed(e.to_string()))?;

        match response.status {
            204 => user.favourites = Some(BTreeSet::new()),
            200 => user.favourites = Some(parse_schedule_ids(&response.body)?),
            status => {
                error!("favourites fetch response code: {}", status);
                return Err(ScheduleError::FetchFailed(format!(
                    "unexpected status {status}"
                )));
            }
        }

        if let Some(favourites) = &user.favourites {
            debug!("retrieved {} favourites for {}", favourites.len(), user.email);
        }
        Ok(())
    }

    /// Fetch the full schedule, sorted ascending by start time.
    ///
    /// The sort is stable, so slots sharing a start time keep the order
    /// the service returned them in.
    pub async fn get_full_schedule(&self) -> Result<Vec<Arc<Lazy<Presentation>>>> {
        let response = self.http.get(&self.config.schedule_url()).await?;
        let mut schedule = self.parse_schedule(&response.body)?;
        schedule.sort_by(|a, b| a.from_time.cmp(&b.from_time));

        info!("fetched schedule with {} slots", schedule.len());
        Ok(schedule)
    }

    /// Search presentations by tag.
    ///
    /// The search endpoint only returns ids; the result is built by
    /// filtering a full-schedule fetch so the returned instances carry
    /// the same lazy-load wrapping as schedule results instead of being
    /// freshly re-parsed duplicates.
    pub async fn search(&self, tag: &str) -> Result<Vec<Arc<Lazy<Presentation>>>> {
        let url = format!("{}?tags={}", self.config.search_url(), encode(tag));
        let response = self.http.get(&url).await?;
        let ids = parse_schedule_ids(&response.body)?;

        let schedule = self.get_full_schedule().await?;
        Ok(schedule
            .into_iter()
            .filter(|presentation| ids.contains(&presentation.id))
            .collect())
    }

    /// Look up a single schedule slot by id.
    pub async fn get_event(&self, id: i32) -> Result<Option<Arc<Lazy<Presentation>>>> {
        let schedule = self.get_full_schedule().await?;
        Ok(schedule.into_iter().find(|presentation| presentation.id == id))
    }

    fn parse_schedule(&self, body: &str) -> Result<Vec<Arc<Lazy<Presentation>>>> {
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let json: Value =
            serde_json::from_str(body).map_err(|e| ScheduleError::Parse(e.to_string()))?;
        let Some(elements) = json.as_array() else {
            return Err(ScheduleError::Parse(
                "expected a JSON array of schedule slots".to_string(),
            ));
        };

        elements
            .iter()
            .map(|element| self.parse_presentation(element))
            .collect()
    }

    /// Parse one schedule slot. Any failure here is fatal to the whole
    /// schedule fetch; there are no partial results.
    fn parse_presentation(&self, element: &Value) -> Result<Arc<Lazy<Presentation>>> {
        let Some(object) = element.as_object() else {
            return Err(ScheduleError::Parse(
                "schedule slot is not a JSON object".to_string(),
            ));
        };

        let kind_raw = str_field(object, "kind")?;
        let kind = PresentationKind::from_wire(kind_raw).ok_or_else(|| {
            ScheduleError::Parse(format!("unknown presentation kind '{kind_raw}'"))
        })?;

        let from_time = parse_timestamp(str_field(object, "fromTime")?)?;
        let to_time = parse_timestamp(str_field(object, "toTime")?)?;
        let room = str_field(object, "room")?.to_string();
        let code = str_field(object, "code")?.to_string();
        let type_name = str_field(object, "type")?.to_string();
        let partner_slot = object
            .get("partnerSlot")
            .and_then(Value::as_bool)
            .ok_or_else(|| {
                ScheduleError::Parse("missing or non-boolean field 'partnerSlot'".to_string())
            })?;

        // Slots without a detail resource keep id 0 and never lazy-load.
        let mut id = 0;
        let mut presentation_uri = None;
        if let Some(uri) = object.get("presentationUri").and_then(Value::as_str) {
            id = trailing_id(uri)?;
            presentation_uri = Some(uri.to_string());
        }

        let title = if kind.is_speaking() {
            object
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("TBA")
                .to_string()
        } else {
            code.clone()
        };

        let mut speakers = Vec::new();
        if let Some(entries) = object.get("speakers").and_then(Value::as_array) {
            for entry in entries {
                let speaker_uri = entry
                    .get("speakerUri")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ScheduleError::Parse("speaker entry without 'speakerUri'".to_string())
                    })?;
                let name = entry.get("speaker").and_then(Value::as_str).ok_or_else(|| {
                    ScheduleError::Parse("speaker entry without 'speaker'".to_string())
                })?;
                let speaker_id = trailing_id(speaker_uri)?;

                speakers.push(Arc::new(Lazy::new(
                    Speaker::new(speaker_id, name, speaker_uri),
                    self.http.clone(),
                )));
            }
        }

        let presentation = Presentation {
            id,
            from_time,
            to_time,
            code,
            type_name,
            kind,
            title,
            speakers,
            room,
            partner_slot,
            presentation_uri,
        };

        Ok(Arc::new(Lazy::new(presentation, self.http.clone())))
    }
}

/// Parse a favourites/search response (`[{"id": 42}, ...]`) into a set
/// of ids. Elements without a usable numeric id are skipped.
fn parse_schedule_ids(body: &str) -> Result<BTreeSet<i32>> {
    if body.trim().is_empty() {
        return Ok(BTreeSet::new());
    }

    let json: Value = serde_json::from_str(body).map_err(|e| ScheduleError::Parse(e.to_string()))?;
    let Some(elements) = json.as_array() else {
        return Err(ScheduleError::Parse(
            "expected a JSON array of ids".to_string(),
        ));
    };

    Ok(elements
        .iter()
        .filter_map(|element| element.get("id").and_then(Value::as_i64))
        .filter_map(|id| i32::try_from(id).ok())
        .collect())
}

fn str_field<'a>(object: &'a Map<String, Value>, name: &str) -> Result<&'a str> {
    object
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ScheduleError::Parse(format!("missing or non-string field '{name}'")))
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, JSON_DATE_PATTERN)
        .map_err(|e| ScheduleError::Parse(format!("bad timestamp '{raw}': {e}")))
}

/// The numeric trailing path segment of a detail URI.
fn trailing_id(uri: &str) -> Result<i32> {
    let segment = uri.rsplit('/').next().unwrap_or(uri);
    segment
        .parse()
        .map_err(|_| ScheduleError::Parse(format!("no numeric id at the end of '{uri}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use confsched_core::{HttpResponse, TransportError};

    struct NoHttp;

    #[async_trait]
    impl HttpClient for NoHttp {
        async fn get(&self, _url: &str) -> std::result::Result<HttpResponse, TransportError> {
            Err(TransportError::Connection("offline".into()))
        }

        async fn post_form(
            &self,
            _url: &str,
            _body: &str,
        ) -> std::result::Result<u16, TransportError> {
            Err(TransportError::Connection("offline".into()))
        }
    }

    fn offline_client() -> ScheduleClient {
        ScheduleClient::with_http_client(
            ScheduleConfig::new("http://rest.example.com/api", "1"),
            Arc::new(NoHttp),
        )
    }

    #[test]
    fn parses_keynote_without_title_as_tba() {
        let client = offline_client();
        let element: Value = serde_json::from_str(
            r#"{
                "kind": "Keynote",
                "fromTime": "2010-11-17 09:00:00.000",
                "toTime": "2010-11-17 10:00:00.000",
                "room": "Main Hall",
                "partnerSlot": false,
                "code": "K1",
                "type": "keynote",
                "presentationUri": "http://rest.example.com/api/presentations/123"
            }"#,
        )
        .unwrap();

        let presentation = client.parse_presentation(&element).unwrap();
        assert_eq!(presentation.id, 123);
        assert_eq!(presentation.title, "TBA");
        assert_eq!(presentation.kind, PresentationKind::Keynote);
        assert_eq!(presentation.room, "Main Hall");
        assert!(!presentation.partner_slot);
        assert_eq!(
            presentation.from_time,
            parse_timestamp("2010-11-17 09:00:00.000").unwrap()
        );
    }

    #[test]
    fn non_speaking_kind_titles_to_code() {
        let client = offline_client();
        let element: Value = serde_json::from_str(
            r#"{
                "kind": "Coffee Break",
                "fromTime": "2010-11-17 10:30:00.000",
                "toTime": "2010-11-17 11:00:00.000",
                "room": "Foyer",
                "partnerSlot": false,
                "code": "BREAK-AM",
                "type": "break",
                "title": "ignored for non-speaking slots"
            }"#,
        )
        .unwrap();

        let presentation = client.parse_presentation(&element).unwrap();
        assert_eq!(presentation.id, 0);
        assert_eq!(presentation.kind, PresentationKind::CoffeeBreak);
        assert_eq!(presentation.title, "BREAK-AM");
        assert!(presentation.presentation_uri.is_none());
    }

    #[test]
    fn speakers_get_ids_from_their_uris() {
        let client = offline_client();
        let element: Value = serde_json::from_str(
            r#"{
                "kind": "Talk",
                "fromTime": "2010-11-17 12:00:00.000",
                "toTime": "2010-11-17 13:00:00.000",
                "room": "Room 4",
                "partnerSlot": true,
                "code": "D10_T_04",
                "type": "conference",
                "title": "Sharp tools",
                "presentationUri": "http://rest.example.com/api/presentations/55",
                "speakers": [
                    {"speaker": "Alice", "speakerUri": "http://rest.example.com/api/speakers/7"},
                    {"speaker": "Bob", "speakerUri": "http://rest.example.com/api/speakers/8"}
                ]
            }"#,
        )
        .unwrap();

        let presentation = client.parse_presentation(&element).unwrap();
        assert_eq!(presentation.speakers.len(), 2);
        assert_eq!(presentation.speakers[0].id, 7);
        assert_eq!(presentation.speakers[0].name, "Alice");
        assert_eq!(presentation.speakers[1].id, 8);
        assert!(presentation.partner_slot);
    }

    #[test]
    fn unknown_kind_is_fatal() {
        let client = offline_client();
        let element: Value = serde_json::from_str(
            r#"{
                "kind": "Interpretive Dance",
                "fromTime": "2010-11-17 09:00:00.000",
                "toTime": "2010-11-17 10:00:00.000",
                "room": "Main Hall",
                "partnerSlot": false,
                "code": "X1",
                "type": "other"
            }"#,
        )
        .unwrap();

        assert!(matches!(
            client.parse_presentation(&element),
            Err(ScheduleError::Parse(_))
        ));
    }

    #[test]
    fn bad_timestamp_is_fatal() {
        let client = offline_client();
        let element: Value = serde_json::from_str(
            r#"{
                "kind": "Talk",
                "fromTime": "yesterday",
                "toTime": "2010-11-17 10:00:00.000",
                "room": "Main Hall",
                "partnerSlot": false,
                "code": "X1",
                "type": "conference"
            }"#,
        )
        .unwrap();

        assert!(matches!(
            client.parse_presentation(&element),
            Err(ScheduleError::Parse(_))
        ));
    }

    #[test]
    fn empty_schedule_body_parses_to_nothing() {
        let client = offline_client();
        assert!(client.parse_schedule("").unwrap().is_empty());
        assert!(client.parse_schedule("  \n").unwrap().is_empty());
    }

    #[test]
    fn schedule_ids_skip_malformed_elements() {
        let ids = parse_schedule_ids(
            r#"[{"id": 1}, {"id": "two"}, {"name": "no id"}, {"id": 3}]"#,
        )
        .unwrap();
        assert_eq!(ids, [1, 3].into_iter().collect());
    }

    #[test]
    fn trailing_id_takes_the_last_path_segment() {
        assert_eq!(trailing_id("http://api/presentations/123").unwrap(), 123);
        assert!(trailing_id("http://api/presentations/last").is_err());
    }
}

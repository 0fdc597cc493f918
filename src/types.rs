use chrono::{Duration, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Result, ScoutError};
use crate::tools::dates::{is_long_form, Schedule};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain(pub String);

impl Domain {
    /// Canonicalize host to a stable key: lowercase + IDNA/Punycode, `www.` dropped.
    fn canonicalize(host: &str) -> String {
        let lower = host.trim_end_matches('.').to_ascii_lowercase();
        let ascii = idna::domain_to_ascii(&lower).unwrap_or(lower);
        ascii
            .strip_prefix("www.")
            .map(str::to_string)
            .unwrap_or(ascii)
    }

    pub fn from_url(url: &Url) -> Option<Self> {
        url.host_str().map(|d| Domain(Self::canonicalize(d)))
    }

    /// Build a Domain from raw user text (CLI, API callers, etc.)
    pub fn from_raw(host: &str) -> Self {
        Domain(Self::canonicalize(host))
    }

    /// Same site, or a subdomain of it.
    pub fn contains(&self, other: &Domain) -> bool {
        other.0 == self.0 || other.0.ends_with(&format!(".{}", self.0))
    }
}

/// Closed set of event kinds reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Exhibition,
    Tour,
    Talk,
    Workshop,
    #[default]
    Event,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhibition => "exhibition",
            Self::Tour => "tour",
            Self::Talk => "talk",
            Self::Workshop => "workshop",
            Self::Event => "event",
        }
    }

    /// Guess a specific type from free text (titles, URLs, schema types).
    pub fn infer(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has = |list: &[&str]| words.iter().any(|w| list.contains(w));
        let joined = words.join(" ");

        if has(&["exhibition", "exhibitions", "exhibit", "exhibits", "installation"])
            || joined.contains("on view")
        {
            Some(Self::Exhibition)
        } else if has(&["workshop", "workshops", "class", "classes", "masterclass"]) {
            Some(Self::Workshop)
        } else if has(&["tour", "tours", "walkthrough"]) {
            Some(Self::Tour)
        } else if has(&["talk", "talks", "lecture", "lectures", "conversation", "panel", "symposium"]) {
            Some(Self::Talk)
        } else {
            None
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exhibition" | "exhibitions" => Ok(Self::Exhibition),
            "tour" | "tours" => Ok(Self::Tour),
            "talk" | "talks" => Ok(Self::Talk),
            "workshop" | "workshops" => Ok(Self::Workshop),
            "event" | "events" => Ok(Self::Event),
            other => Err(ScoutError::Config(format!("unknown event type: {other}"))),
        }
    }
}

/// Requested time window for returned events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Today,
    ThisWeek,
    ThisMonth,
    #[default]
    All,
}

impl TimeWindow {
    /// Inclusive date bounds of the window, `None` for [`TimeWindow::All`].
    pub fn bounds(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::Today => Some((today, today)),
            Self::ThisWeek => Some((today, today + Duration::days(6))),
            Self::ThisMonth => Some((today, today + Duration::days(30))),
            Self::All => None,
        }
    }

    /// Whether an event with these dates belongs in the window.
    ///
    /// Undated events are always admitted. An event that started before the
    /// window is admitted only while it is still running.
    pub fn admits(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> bool {
        let Some((lo, hi)) = self.bounds(today) else {
            return true;
        };
        let Some(start) = start else {
            return true;
        };
        if start > hi {
            return false;
        }
        if start >= lo {
            return true;
        }
        end.map(|end| end >= lo).unwrap_or(false)
    }
}

impl FromStr for TimeWindow {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "today" => Ok(Self::Today),
            "this_week" | "thisweek" | "week" => Ok(Self::ThisWeek),
            "this_month" | "thismonth" | "month" => Ok(Self::ThisMonth),
            "all" => Ok(Self::All),
            other => Err(ScoutError::Config(format!("unknown time window: {other}"))),
        }
    }
}

/// Where an event record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    Markup,
    StructuredData,
    LlmExtracted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

impl Provenance {
    pub fn confidence(&self) -> Confidence {
        match self {
            Self::Markup | Self::StructuredData => Confidence::High,
            Self::LlmExtracted => Confidence::Medium,
        }
    }
}

/// A single extracted event. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedEvent {
    title: String,
    description: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    location: Option<String>,
    source_url: String,
    image_url: Option<String>,
    event_type: EventType,
    provenance: Provenance,
    confidence: Confidence,
}

impl ScrapedEvent {
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
    pub fn start_time(&self) -> Option<NaiveTime> {
        self.start_time
    }
    pub fn end_time(&self) -> Option<NaiveTime> {
        self.end_time
    }
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
    pub fn source_url(&self) -> &str {
        &self.source_url
    }
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
    pub fn event_type(&self) -> EventType {
        self.event_type
    }
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }
}

/// Mutable accumulator used while extracting; finished into a [`ScrapedEvent`].
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub event_type: Option<EventType>,
    pub provenance: Provenance,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            title: title.into(),
            provenance,
            ..Default::default()
        }
    }

    /// Fill empty fields from `other` without touching anything already set.
    pub fn fill_missing(&mut self, other: EventDraft) {
        if self.start_date.is_none() && self.end_date.is_none() {
            self.start_date = other.start_date;
            self.end_date = other.end_date;
        }
        if self.start_time.is_none() {
            self.start_time = other.start_time;
            self.end_time = self.end_time.or(other.end_time);
        }
        if self.description.is_none() {
            self.description = other.description;
        }
        if self.location.is_none() {
            self.location = other.location;
        }
        if self.image_url.is_none() {
            self.image_url = other.image_url;
        }
        if self.event_type.is_none() {
            self.event_type = other.event_type;
        }
    }

    /// Enforce the record invariants and freeze the draft.
    ///
    /// Returns `None` for an empty title. An end date before the start date is
    /// dropped; an end date with no start date starts on `today`.
    pub fn finish(self, page_url: &str, today: NaiveDate) -> Option<ScrapedEvent> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return None;
        }

        let mut start_date = self.start_date;
        let mut end_date = self.end_date;
        if start_date.is_none() && end_date.is_some() {
            start_date = Some(today);
        }
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                end_date = None;
            }
        }

        // A start time without an end gets the default duration.
        let end_time = match self.start_time {
            Some(start) => Schedule {
                dates: None,
                start_time: Some(start),
                end_time: self.end_time,
            }
            .with_default_duration(is_long_form(&title))
            .end_time,
            None => None,
        };

        Some(ScrapedEvent {
            title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            start_date,
            end_date,
            start_time: self.start_time,
            end_time,
            location: self.location.filter(|l| !l.trim().is_empty()),
            source_url: self.link.unwrap_or_else(|| page_url.to_string()),
            image_url: self.image_url,
            event_type: self.event_type.unwrap_or_default(),
            provenance: self.provenance,
            confidence: self.provenance.confidence(),
        })
    }
}

/// Read-only input for one venue call.
#[derive(Debug, Clone)]
pub struct VenueContext {
    pub base_url: Url,
    pub domain: Domain,
    pub name: String,
    pub event_type: Option<EventType>,
    pub window: TimeWindow,
    pub today: NaiveDate,
}

impl VenueContext {
    /// Validate the venue URL. A bare host gets an `https://` scheme.
    pub fn new(
        venue_url: &str,
        name: &str,
        event_type: Option<EventType>,
        window: TimeWindow,
    ) -> Result<Self> {
        let raw = venue_url.trim();
        let candidate = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{raw}")
        };
        let base_url =
            Url::parse(&candidate).map_err(|_| ScoutError::InvalidUrl(venue_url.into()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ScoutError::InvalidUrl(venue_url.into()));
        }
        let domain =
            Domain::from_url(&base_url).ok_or_else(|| ScoutError::MissingDomain(venue_url.into()))?;

        Ok(Self {
            base_url,
            domain,
            name: name.trim().to_string(),
            event_type,
            window,
            today: Local::now().date_naive(),
        })
    }

    /// Pin the discovery date (tests, replays).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Apply the requested type and window filters.
    pub fn wants(&self, event: &ScrapedEvent) -> bool {
        if let Some(wanted) = self.event_type {
            if event.event_type() != wanted {
                return false;
            }
        }
        self.window
            .admits(event.start_date(), event.end_date(), self.today)
    }
}

/// How a candidate page was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum DiscoveryStrategy {
    Sitemap,
    Navigation,
    Pattern,
    Structure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DiscoveredPage {
    pub url: Url,
    pub strategy: DiscoveryStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}
impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

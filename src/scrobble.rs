//! Per-day play counts from a Last.fm-compatible `user.getWeeklyTrackChart` listing.

use crate::calendar::MonthCursor;
use crate::counts::RemoteCounts;
use crate::date_key::DateKey;
use chrono::{Local, NaiveDateTime, TimeZone};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("unreadable weekly chart: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub username: String,
}

#[derive(Debug, Default, Deserialize)]
struct ChartResponse {
    #[serde(default)]
    weeklytrackchart: Option<WeeklyTrackChart>,
}

#[derive(Debug, Default, Deserialize)]
struct WeeklyTrackChart {
    #[serde(default)]
    track: Option<OneOrMany<Track>>,
}

// The API collapses single-element lists into a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Track {
    #[serde(default)]
    date: Option<TrackDate>,
}

#[derive(Debug, Default, Deserialize)]
struct TrackDate {
    #[serde(default)]
    uts: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Timestamp {
    Text(String),
    Number(i64),
}

impl Timestamp {
    fn seconds(&self) -> Option<i64> {
        match self {
            Self::Text(raw) => raw.trim().parse().ok(),
            Self::Number(secs) => Some(*secs),
        }
    }
}

/// Unix-second bounds of `cursor` in `tz`: the 1st at 00:00 up to the last day at 24:00.
pub fn month_range<Tz: TimeZone>(tz: &Tz, cursor: MonthCursor) -> (i64, i64) {
    let from = local_midnight(tz, cursor);
    let to = local_midnight(tz, cursor.advance(1));
    (from, to)
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, cursor: MonthCursor) -> i64 {
    let midnight: NaiveDateTime = cursor.first_day().and_hms_opt(0, 0, 0).unwrap_or_default();
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|time| time.timestamp())
        .unwrap_or_else(|| midnight.and_utc().timestamp())
}

/// Counts one play per dated track on its calendar day in `tz`.
pub fn parse_weekly_chart<Tz: TimeZone>(
    payload: &[u8],
    tz: &Tz,
) -> Result<RemoteCounts, serde_json::Error> {
    let response: ChartResponse = serde_json::from_slice(payload)?;
    let tracks = response
        .weeklytrackchart
        .and_then(|chart| chart.track)
        .map(OneOrMany::into_vec)
        .unwrap_or_default();

    let mut counts = RemoteCounts::new();
    for track in tracks {
        let Some(seconds) = track
            .date
            .and_then(|date| date.uts)
            .and_then(|uts| uts.seconds())
        else {
            continue;
        };
        let Some(played_at) = tz.timestamp_opt(seconds, 0).single() else {
            continue;
        };
        let Ok(key) = DateKey::try_from(played_at.date_naive()) else {
            debug!(seconds, "skipping scrobble outside the representable years");
            continue;
        };
        *counts.entry(key).or_default() += 1;
    }
    Ok(counts)
}

#[derive(Debug, Clone)]
pub struct LastFmClient {
    http: Client,
    base_url: String,
}

impl LastFmClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!("play_calendar/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub async fn fetch_month(
        &self,
        credentials: &Credentials,
        cursor: MonthCursor,
    ) -> Result<RemoteCounts, FetchError> {
        self.fetch_month_in(credentials, cursor, &Local).await
    }

    pub async fn fetch_month_in<Tz: TimeZone>(
        &self,
        credentials: &Credentials,
        cursor: MonthCursor,
        tz: &Tz,
    ) -> Result<RemoteCounts, FetchError> {
        let (from, to) = month_range(tz, cursor);
        let from = from.to_string();
        let to = to.to_string();
        let query = [
            ("method", "user.getweeklytrackchart"),
            ("user", credentials.username.as_str()),
            ("api_key", credentials.api_key.as_str()),
            ("from", from.as_str()),
            ("to", to.as_str()),
            ("format", "json"),
        ];

        debug!(month = %cursor.title(), %from, %to, "requesting weekly track chart");
        let response = self.http.get(&self.base_url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.bytes().await?;
        Ok(parse_weekly_chart(&body, tz)?)
    }

    /// Best-effort variant: any failure reads as a month without plays.
    pub async fn fetch_month_or_empty(
        &self,
        credentials: &Credentials,
        cursor: MonthCursor,
    ) -> RemoteCounts {
        match self.fetch_month(credentials, cursor).await {
            Ok(counts) => counts,
            Err(err) => {
                warn!(month = %cursor.title(), "scrobble fetch failed: {err}");
                RemoteCounts::new()
            }
        }
    }
}

//! Runtime settings and the lookup tables that shape feed generation.
//!
//! [`Settings`] comes from the environment (a `.env` file is loaded first by the
//! binary). [`Lookups`] holds the per-deployment policy data: stop-name
//! corrections, route-type codes, schedule page overrides and the markers used
//! while scraping timetables. It can be replaced wholesale from a JSON file:
//!
//! ```json
//! {
//!   "stop_names": { "NTID": "LBJ" },
//!   "route_types": { "bus": 3 },
//!   "schedule_overrides": { "11-Campus Shuttle": "https://www.rit.edu/parking/11-campus-shuttle" },
//!   "weekend_marker": "This route runs weekends.",
//!   "alternate_service_class": "blue-bus"
//! }
//! ```
//!
//! Keys missing from the file keep their built-in values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://feeds.transloc.com/3";
pub const DEFAULT_API_KEY_HEADER: &str = "X-Api-Key";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LOG_FILE: &str = "logs/transloc_gtfs.log";

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub vehicle_url: String,
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub lookups_path: Option<String>,
    pub bind_addr: String,
    pub log_file_path: String,
    /// Per-request limit for upstream calls; unset means no limit.
    pub request_timeout: Option<Duration>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Environment settings with `overrides` (keyed by variable name) taking precedence.
    pub fn from_env_with(overrides: &HashMap<&str, String>) -> Result<Self> {
        Self::from_lookup(|key| {
            overrides
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
        })
    }

    /// Builds settings from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let request_timeout = var("TRANSLOC_TIMEOUT_SECS")
            .map(|secs| {
                secs.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("TRANSLOC_TIMEOUT_SECS is not a number of seconds: {secs}"))
            })
            .transpose()?;

        let base_url = var("TRANSLOC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let vehicle_url =
            var("TRANSLOC_VEHICLE_URL").unwrap_or_else(|| format!("{base_url}/vehicle_statuses"));

        Ok(Self {
            vehicle_url,
            api_key: var("TRANSLOC_API_KEY"),
            api_key_header: var("TRANSLOC_API_KEY_HEADER")
                .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string()),
            lookups_path: var("LOOKUPS_PATH"),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            log_file_path: var("LOG_FILE_PATH").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            request_timeout,
            base_url,
        })
    }

    /// Loads [`Lookups`] from `lookups_path`, or the built-in tables when unset.
    pub fn lookups(&self) -> Result<Lookups> {
        match &self.lookups_path {
            Some(path) => Lookups::load(path),
            None => Ok(Lookups::default()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Lookups {
    /// Timetable column label -> canonical stop name.
    pub stop_names: HashMap<String, String>,
    /// Upstream route type -> GTFS `route_type` code.
    pub route_types: HashMap<String, u16>,
    /// Route long name -> schedule page URL, for routes upstream has no URL for.
    pub schedule_overrides: HashMap<String, String>,
    /// Phrase on a schedule page marking a weekend-only route.
    pub weekend_marker: String,
    /// Row class used for alternate service rows that are left out of the timetable.
    pub alternate_service_class: String,
}

impl Default for Lookups {
    fn default() -> Self {
        let stop_names = [
            ("F Lot", "F Lot Loop"),
            ("Walmart West", "Wal-Mart West"),
            ("Walmart East", "Wal-Mart East"),
            ("Perkins Rd.", "Perkins Road"),
            ("Perkins Rd", "Perkins Road"),
            ("NTID", "LBJ"),
            ("175 Jefferson", "175 Jefferson (Radisson)"),
            ("UC West", "UC West Inbound"),
            ("Tech Park Dr", "Tech Park I/B"),
            ("Marketplace Mall", "Market Place Mall"),
        ];
        let schedule_overrides = [
            (
                "11-Campus Shuttle",
                "https://www.rit.edu/parking/11-campus-shuttle",
            ),
            (
                "12-Retail Weekend",
                "https://www.rit.edu/parking/12-weekend-retail-shuttle",
            ),
        ];

        Self {
            stop_names: stop_names
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            route_types: HashMap::from([("bus".to_string(), 3)]),
            schedule_overrides: schedule_overrides
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            weekend_marker: "This route runs weekends.".to_string(),
            alternate_service_class: "blue-bus".to_string(),
        }
    }
}

impl Lookups {
    /// Loads lookups from a JSON file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lookups file {}", path.display()))?;
        let lookups = Self::from_json(&content)
            .with_context(|| format!("Failed to parse lookups file {}", path.display()))?;

        info!(
            path = %path.display(),
            stop_names = lookups.stop_names.len(),
            route_types = lookups.route_types.len(),
            schedule_overrides = lookups.schedule_overrides.len(),
            "Loaded lookups"
        );
        Ok(lookups)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Maps a timetable column label onto the stop name used upstream.
    pub fn canonical_stop_name<'a>(&'a self, label: &'a str) -> &'a str {
        self.stop_names.get(label).map(String::as_str).unwrap_or(label)
    }

    pub fn route_type_code(&self, kind: &str) -> Option<u16> {
        self.route_types.get(kind).copied()
    }

    pub fn schedule_override(&self, long_name: &str) -> Option<&str> {
        self.schedule_overrides.get(long_name).map(String::as_str)
    }
}

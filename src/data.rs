//! Data Loading and Management
//!
//! Fetches the remote CSV sources, parses them with Polars and hands them to
//! the schema normalizer. Loading is never fatal: any failure becomes an
//! empty table plus a warning, so the dashboard can keep rendering with
//! whatever sources did load.

use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use crate::cache::LoadCache;
use crate::config::DashboardConfig;
use crate::error::FetchError;
use crate::normalizer::{census_records, hazard_table, health_records};
use crate::records::{CensusRecord, Hazard, HazardTable, HealthRecord};
use crate::schema::SourceKind;

/// Source of raw CSV bytes
pub trait CsvFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTPS fetcher
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self { client: reqwest::blocking::Client::new() }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let http_err = |source: reqwest::Error| FetchError::Http {
            url: redact_url(url),
            source: source.without_url(),
        };

        let response = self.client.get(url).send().map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: redact_url(url), status: status.as_u16() });
        }

        Ok(response.bytes().map_err(http_err)?.to_vec())
    }
}

/// In-memory fetcher keyed by URL (fixtures, offline runs)
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    sources: FxHashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.sources.insert(url.into(), body.into());
        self
    }
}

impl CsvFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.sources
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(redact_url(url)))
    }
}

/// Strip the query string (pre-signed token) from a URL before logging it
pub fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{}?<redacted>", base),
        None => url.to_string(),
    }
}

/// Parse CSV bytes into a DataFrame (header row required)
///
/// Every column is read as text; numeric coercion happens per cell in the
/// normalizer, so one bad cell drops one row instead of the whole source.
pub fn parse_csv(bytes: Vec<u8>) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .with_context(|| "Failed to parse CSV")
}

/// Read a local CSV file (e.g. a previously saved census copy)
pub fn read_csv_file(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.into()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load CSV: {:?}", path))
}

/// A loaded table together with the warning produced if loading failed
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub table: Arc<T>,
    pub warning: Option<String>,
}

impl<T> Loaded<T> {
    fn ok(table: T) -> Self {
        Self { table: Arc::new(table), warning: None }
    }

    fn failed(kind: SourceKind, error: anyhow::Error, empty: T) -> Self {
        let warning = format!("Error loading {} data: {:#}", kind, error);
        tracing::warn!("{}", warning);
        Self { table: Arc::new(empty), warning: Some(warning) }
    }
}

fn fetch_bytes<F: CsvFetcher + ?Sized>(fetcher: &F, url: Option<&str>) -> Result<(String, Vec<u8>)> {
    let url = url.context("no URL configured")?;
    let bytes = fetcher.fetch(url)?;
    Ok((redact_url(url), bytes))
}

fn fetch_frame<F: CsvFetcher + ?Sized>(fetcher: &F, url: Option<&str>) -> Result<DataFrame> {
    let (redacted, bytes) = fetch_bytes(fetcher, url)?;
    parse_csv(bytes).with_context(|| format!("Failed to parse {}", redacted))
}

/// Load one hazard source
pub fn load_hazard<F: CsvFetcher + ?Sized>(fetcher: &F, url: Option<&str>, hazard: Hazard) -> Loaded<HazardTable> {
    match fetch_frame(fetcher, url).and_then(|frame| hazard_table(&frame, hazard)) {
        Ok(table) => {
            tracing::info!("Loaded {} ({} counties)", hazard.display_name(), table.len());
            Loaded::ok(table)
        }
        Err(e) => Loaded::failed(SourceKind::Hazard(hazard), e, HazardTable::empty(hazard)),
    }
}

/// Load the census communities source, optionally keeping a raw local copy
pub fn load_census<F: CsvFetcher + ?Sized>(
    fetcher: &F,
    url: Option<&str>,
    local_copy: Option<&Path>,
) -> Loaded<Vec<CensusRecord>> {
    let result = fetch_bytes(fetcher, url).and_then(|(redacted, bytes)| {
        if let Some(path) = local_copy {
            if let Err(e) = std::fs::write(path, &bytes) {
                tracing::warn!("Could not save census copy to {:?}: {}", path, e);
            }
        }
        let frame = parse_csv(bytes).with_context(|| format!("Failed to parse {}", redacted))?;
        census_records(&frame)
    });

    match result {
        Ok(records) => {
            tracing::info!("Loaded census data ({} communities)", records.len());
            Loaded::ok(records)
        }
        Err(e) => Loaded::failed(SourceKind::Census, e, Vec::new()),
    }
}

/// Load the health outcomes source
pub fn load_health<F: CsvFetcher + ?Sized>(fetcher: &F, url: Option<&str>) -> Loaded<Vec<HealthRecord>> {
    match fetch_frame(fetcher, url).and_then(|frame| health_records(&frame)) {
        Ok(records) => {
            tracing::info!("Loaded health data ({} counties)", records.len());
            Loaded::ok(records)
        }
        Err(e) => Loaded::failed(SourceKind::Health, e, Vec::new()),
    }
}

/// Every table the dashboard works from, loaded once per session
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// Indexed by [`Hazard::index`]
    pub hazards: [Arc<HazardTable>; 3],
    pub census: Arc<Vec<CensusRecord>>,
    pub health: Arc<Vec<HealthRecord>>,
    /// One entry per source that failed to load
    pub warnings: Vec<String>,
}

impl DashboardData {
    /// Load all sources straight from the fetcher (no memoization)
    pub fn load<F: CsvFetcher + ?Sized>(config: &DashboardConfig, fetcher: &F) -> Self {
        let urls = &config.sources;
        let mut warnings = Vec::new();
        let mut take = |warning: Option<String>| warnings.extend(warning);

        let hazards = Hazard::ALL.map(|hazard| {
            let loaded = load_hazard(fetcher, urls.url_for(SourceKind::Hazard(hazard)), hazard);
            take(loaded.warning);
            loaded.table
        });

        let census = load_census(
            fetcher,
            urls.url_for(SourceKind::Census),
            config.census_local_copy.as_deref(),
        );
        take(census.warning);

        let health = load_health(fetcher, urls.url_for(SourceKind::Health));
        take(health.warning);

        Self { hazards, census: census.table, health: health.table, warnings }
    }

    /// Load all sources through the memoized cache
    pub fn load_cached<F: CsvFetcher + ?Sized>(config: &DashboardConfig, fetcher: &F, cache: &LoadCache) -> Self {
        let urls = &config.sources;
        let mut warnings = Vec::new();

        let hazards = Hazard::ALL.map(|hazard| {
            let kind = SourceKind::Hazard(hazard);
            let url = urls.url_for(kind);
            take(&mut warnings, cache.get_or_load(kind, url, || load_hazard(fetcher, url, hazard)))
        });

        let census_url = urls.url_for(SourceKind::Census);
        let census = take(
            &mut warnings,
            cache.get_or_load(SourceKind::Census, census_url, || {
                load_census(fetcher, census_url, config.census_local_copy.as_deref())
            }),
        );

        let health_url = urls.url_for(SourceKind::Health);
        let health = take(
            &mut warnings,
            cache.get_or_load(SourceKind::Health, health_url, || load_health(fetcher, health_url)),
        );

        Self { hazards, census, health, warnings }
    }

    pub fn hazard(&self, hazard: Hazard) -> &HazardTable {
        &self.hazards[hazard.index()]
    }
}

fn take<T>(warnings: &mut Vec<String>, loaded: Loaded<T>) -> Arc<T> {
    warnings.extend(loaded.warning);
    loaded.table
}

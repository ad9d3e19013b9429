// Pipeline integration tests
//
// Purpose: load every source through an in-memory fetcher and check the
// dashboard outputs end to end (normalization, filters, combined risk,
// findings, export, partial failures, caching).
// Run with: cargo test --test pipeline_integration_tests

use approx::assert_relative_eq;
use county_risk_scorer::config::SourceUrls;
use county_risk_scorer::export::combined_csv;
use county_risk_scorer::records::CommunityMetric;
use county_risk_scorer::{
    DashboardConfig, DashboardData, DashboardView, Hazard, KeyFindings, LoadCache, Selection,
    SourceKind, StateSelection, StaticFetcher,
};

const WIND_URL: &str = "https://storage.test/wind.csv?sig=abc";
const DROUGHT_URL: &str = "https://storage.test/drought.csv?sig=abc";
const WILDFIRE_URL: &str = "https://storage.test/wildfire.csv?sig=abc";
const CENSUS_URL: &str = "https://storage.test/census.csv";
const HEALTH_URL: &str = "https://storage.test/health.csv";

const WIND_CSV: &str = "\
CF,SF,Latitude,Longitude,MEAN_low_income_percentage,midcent_median_10yr
cook,illinois,41.8,-87.6,25.0,10
lake,illinois,42.3,-87.8,15.0,20
travis,texas,30.3,-97.7,30.0,90
";

const DROUGHT_CSV: &str = "\
CF,SF,Latitude,Longitude,MEAN_low_income_percentage,midcent_median_10yr
cook,illinois,41.8,-87.6,25.0,5
travis,texas,30.3,-97.7,30.0,15
";

const WILDFIRE_CSV: &str = "\
CF,SF,Latitude,Longitude,MEAN_low_income_percentage,midcent_median_10yr
kern,california,35.3,-118.7,40.0,88
butte,california,39.7,-121.6,20.0,72
cook,illinois,41.8,-87.6,25.0,60
";

const CENSUS_CSV: &str = "\
County Name,State/Territory,Identified as disadvantaged,Energy burden,Total population
Cook County,Illinois,True,3.5,5000
lake county,illinois,false,2.0,700
Travis County,Texas,,,1200
";

const HEALTH_CSV: &str = "\
CF,SF,MEAN_low_income_percentage,Asthma_Rate____,Diabetes_Rate____
cook,illinois,25.0,10.5,12.0
lake,illinois,15.0,9.1,8.0
travis,texas,30.0,,9.5
kern,california,,12.0,11.0
";

fn full_fetcher() -> StaticFetcher {
    StaticFetcher::new()
        .with_source(WIND_URL, WIND_CSV)
        .with_source(DROUGHT_URL, DROUGHT_CSV)
        .with_source(WILDFIRE_URL, WILDFIRE_CSV)
        .with_source(CENSUS_URL, CENSUS_CSV)
        .with_source(HEALTH_URL, HEALTH_CSV)
}

fn config() -> DashboardConfig {
    DashboardConfig {
        sources: SourceUrls {
            wind: Some(WIND_URL.to_string()),
            drought: Some(DROUGHT_URL.to_string()),
            wildfire: Some(WILDFIRE_URL.to_string()),
            census: Some(CENSUS_URL.to_string()),
            health: Some(HEALTH_URL.to_string()),
        },
        ..DashboardConfig::default()
    }
}

fn all_hazards() -> Selection {
    Selection { hazards: Hazard::ALL.to_vec(), ..Selection::default() }
}

// ============================================================================
// Loading and normalization
// ============================================================================

#[test]
fn test_all_sources_load_and_normalize() {
    let data = DashboardData::load(&config(), &full_fetcher());

    assert!(data.warnings.is_empty(), "unexpected warnings: {:?}", data.warnings);
    assert_eq!(data.hazard(Hazard::Wind).len(), 3);
    assert_eq!(data.hazard(Hazard::Drought).len(), 2);
    assert_eq!(data.hazard(Hazard::Wildfire).len(), 3);

    let travis = &data.hazard(Hazard::Wind).records[2];
    assert_eq!(travis.county, "Travis");
    assert_eq!(travis.state, "Texas");
    assert_relative_eq!(travis.risk, 90.0);

    assert_eq!(data.census.len(), 3);
    assert_eq!(data.census[1].county, "Lake County");
    assert_eq!(data.census[1].disadvantaged, Some(false));
    assert_eq!(data.census[2].energy_burden, None);

    // Kern has no low-income share and is dropped from the health table
    assert_eq!(data.health.len(), 3);
    assert!(data.health.iter().all(|r| r.county != "Kern"));
}

#[test]
fn test_partial_failure_still_renders() {
    let fetcher = StaticFetcher::new()
        .with_source(WIND_URL, WIND_CSV)
        .with_source(WILDFIRE_URL, "not,a,hazard\n1,2,3\n")
        .with_source(HEALTH_URL, HEALTH_CSV);
    let data = DashboardData::load(&config(), &fetcher);

    // Drought missing, wildfire malformed, census missing
    assert_eq!(data.warnings.len(), 3);
    assert!(data.warnings.iter().all(|w| w.starts_with("Error loading ")));
    assert!(data.warnings.iter().all(|w| !w.contains("sig=abc")));
    assert!(data.hazard(Hazard::Drought).is_empty());
    assert!(data.census.is_empty());

    let view = DashboardView::compute(&data, &all_hazards());
    assert!(view.hazards[0].warning.is_none());
    assert_eq!(
        view.hazards[1].warning.as_deref(),
        Some("No counties meet the risk threshold for Drought Risk Score in the selected states.")
    );
    assert_eq!(view.combined.outcome.rows().len(), 3);
    assert!(view.community.warning.is_some());
    assert!(view.health.warning.is_none());
}

#[test]
fn test_every_source_failing() {
    let data = DashboardData::load(&DashboardConfig::default(), &StaticFetcher::new());
    assert_eq!(data.warnings.len(), 5);

    let view = DashboardView::compute(&data, &all_hazards());
    assert_eq!(
        view.combined.warning.as_deref(),
        Some("No data available to compute combined risk across all hazards.")
    );
    let findings = KeyFindings::compute(&data.health, data.hazard(Hazard::Wildfire));
    assert_eq!(findings.asthma, "No health data available.");
    assert_eq!(findings.wildfire, "No wildfire data available with risk >= 50.");
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn test_combined_ranking_all_states() {
    let data = DashboardData::load(&config(), &full_fetcher());
    let view = DashboardView::compute(&data, &all_hazards());

    let rows = view.combined.outcome.rows();
    let counties: Vec<&str> = rows.iter().map(|r| r.county.as_str()).collect();
    assert_eq!(counties, vec!["Travis", "Kern", "Butte", "Lake", "Cook"]);

    assert_relative_eq!(rows[0].combined_risk, 100.0, epsilon = 1e-9);
    assert_eq!(rows[0].hazard_count(), 2);
    assert_relative_eq!(rows[2].combined_risk, 1200.0 / 28.0, epsilon = 1e-9);
    assert_relative_eq!(rows[3].combined_risk, 12.5, epsilon = 1e-9);
    assert_relative_eq!(rows[4].combined_risk, 0.0, epsilon = 1e-9);
    assert_eq!(rows[4].hazard_count(), 3);

    assert!(rows.windows(2).all(|w| w[0].combined_risk >= w[1].combined_risk));
    assert!(rows.iter().all(|r| (0.0..=100.0).contains(&r.combined_risk)));
}

#[test]
fn test_state_and_threshold_selection() {
    let data = DashboardData::load(&config(), &full_fetcher());
    let selection = Selection {
        state: StateSelection::parse("Illinois"),
        threshold: 15.0,
        ..all_hazards()
    };
    let view = DashboardView::compute(&data, &selection);

    assert_eq!(view.hazard_title, "Hazard Exposure Across Counties (Illinois)");
    assert_eq!(view.state_options, vec!["All", "Illinois", "Texas"]);

    let wind = &view.hazards[0];
    assert_eq!(wind.filtered.len(), 1);
    assert_eq!(wind.top[0].county, "Lake");

    let drought = &view.hazards[1];
    assert_eq!(
        drought.warning.as_deref(),
        Some("No counties meet the risk threshold for Drought Risk Score in Illinois.")
    );

    // Lake (wind only) and Cook (wildfire only) each normalize to 100
    let rows = view.combined.outcome.rows();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.state == "Illinois"));
    assert!(rows.iter().all(|r| r.combined_risk == 100.0));
}

#[test]
fn test_community_and_health_views() {
    let data = DashboardData::load(&config(), &full_fetcher());

    let view = DashboardView::compute(&data, &all_hazards());
    let community: Vec<(&str, f64)> = view
        .community
        .rows
        .iter()
        .map(|r| (r.county.as_str(), r.value))
        .collect();
    assert_eq!(community, vec![("Cook County", 3.5), ("Lake County", 2.0)]);

    let disadvantaged = Selection {
        community_metric: CommunityMetric::Disadvantaged,
        ..all_hazards()
    };
    let view = DashboardView::compute(&data, &disadvantaged);
    assert_eq!(view.community.rows.len(), 1);
    assert_eq!(view.community.rows[0].county, "Cook County");

    let health = &view.health;
    let asthma: Vec<&str> = health.top.iter().map(|r| r.county.as_str()).collect();
    assert_eq!(asthma, vec!["Cook", "Lake"]);
    let binned: usize = health.low_income_distribution.iter().map(|b| b.count).sum();
    assert_eq!(binned, 3);
}

#[test]
fn test_highlight_search() {
    let data = DashboardData::load(&config(), &full_fetcher());
    let selection = Selection { highlight: Some(" TRAV ".to_string()), ..all_hazards() };
    let view = DashboardView::compute(&data, &selection);

    assert_eq!(view.highlights.combined, vec![("Travis".to_string(), "Texas".to_string())]);
    assert_eq!(view.highlights.hazards.len(), 2);
}

// ============================================================================
// Findings and export
// ============================================================================

#[test]
fn test_key_findings_ignore_selection() {
    let data = DashboardData::load(&config(), &full_fetcher());
    let findings = KeyFindings::compute(&data.health, data.hazard(Hazard::Wildfire));

    assert!(findings.asthma.starts_with("For example, Cook, Illinois has an asthma rate of 10.5%"));
    assert!(findings.wildfire.starts_with("Counties like Kern, California and Butte, California"));
    assert!(findings.wildfire.contains("around 28.3%"));
    assert!(findings.wildfire.contains("up to 88.0"));
}

#[test]
fn test_combined_export() {
    let data = DashboardData::load(&config(), &full_fetcher());
    let view = DashboardView::compute(&data, &all_hazards());
    let csv = combined_csv(view.combined.outcome.rows()).unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("County,State,Normalized_Wind_Risk"));
    assert!(lines[1].starts_with("Travis,Texas,"));
}

// ============================================================================
// Caching
// ============================================================================

#[test]
fn test_cached_load_skips_failed_sources() {
    let cache = LoadCache::new(16);
    let config = config();
    let partial = StaticFetcher::new().with_source(WIND_URL, WIND_CSV);

    let first = DashboardData::load_cached(&config, &partial, &cache);
    assert_eq!(first.warnings.len(), 4);
    assert!(cache.contains(SourceKind::Hazard(Hazard::Wind), Some(WIND_URL)));
    assert!(!cache.contains(SourceKind::Hazard(Hazard::Drought), Some(DROUGHT_URL)));

    // Failed sources are retried; the cached wind table is reused
    let second = DashboardData::load_cached(&config, &full_fetcher(), &cache);
    assert!(second.warnings.is_empty());
    assert_eq!(second.hazard(Hazard::Drought).len(), 2);
    assert!(std::sync::Arc::ptr_eq(&first.hazards[0], &second.hazards[0]));
}

#[test]
fn test_census_local_copy() {
    let dir = tempfile::tempdir().unwrap();
    let copy = dir.path().join("census.csv");
    let config = DashboardConfig { census_local_copy: Some(copy.clone()), ..config() };

    let data = DashboardData::load(&config, &full_fetcher());
    assert_eq!(data.census.len(), 3);
    assert_eq!(std::fs::read_to_string(&copy).unwrap(), CENSUS_CSV);
}

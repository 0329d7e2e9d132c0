use std::fs;
use tempfile::TempDir;
use tracing::info;
use xcur::core::config::AppConfig;
use xcur::core::error::RateError;
use xcur::core::metals::{Metal, MetalFallback, derive_metal_rates};
use xcur::{AppCommand, AppContext, FavoritesAction};

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const USD_RATES: &str = r#"{
        "result": "success",
        "base_code": "USD",
        "rates": {
            "USD": 1,
            "EUR": 0.9,
            "GBP": 0.8,
            "INR": 83.0,
            "XAU": 0.0005,
            "XAG": 0.04
        }
    }"#;

    pub async fn create_mock_server(base: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/v6/latest/{base}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

/// Writes a config pointing at `base_url` with its data under `data_dir`.
fn write_config(data_dir: &TempDir, base_url: &str) -> String {
    let config_path = data_dir.path().join("config.yaml");
    let config_content = format!(
        r#"
        base_currency: "USD"
        target_currency: "INR"
        providers:
          exchange:
            base_url: {}
            timeout_secs: 5
        data_path: {}
    "#,
        base_url,
        data_dir.path().join("data").display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path.to_string_lossy().to_string()
}

fn load_config(config_path: &str) -> AppConfig {
    AppConfig::load_from_path(config_path).expect("Failed to load config")
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_populates_cache_for_offline_use() {
    let mock_server = test_utils::create_mock_server("USD", 200, test_utils::USD_RATES).await;
    let data_dir = TempDir::new().unwrap();
    let config_path = write_config(&data_dir, &mock_server.uri());

    let result = xcur::run_command(
        AppCommand::Convert {
            amount: 100.0,
            from: Some("usd".to_string()),
            to: Some("inr".to_string()),
            swap: false,
        },
        Some(&config_path),
        false,
    )
    .await;
    assert!(result.is_ok(), "Convert failed with: {:?}", result.err());

    // Same data directory, network disabled: served from cache
    let ctx = AppContext::new(load_config(&config_path), true).unwrap();
    let snapshot = ctx.manager.get_rates("USD").await;
    info!(?snapshot, "Offline snapshot");

    assert!(snapshot.is_offline);
    assert_eq!(snapshot.error, None);
    assert!(snapshot.last_updated.is_some());
    assert_eq!(snapshot.rates.get("INR"), Some(83.0));
}

#[test_log::test(tokio::test)]
async fn test_offline_without_cache_reports_no_data() {
    let mock_server = wiremock::MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config_path = write_config(&data_dir, &mock_server.uri());

    let result = xcur::run_command(
        AppCommand::Rates {
            base: Some("EUR".to_string()),
            query: None,
        },
        Some(&config_path),
        true,
    )
    .await;
    assert!(result.is_ok(), "Rates failed with: {:?}", result.err());

    let ctx = AppContext::new(load_config(&config_path), true).unwrap();
    let snapshot = ctx.manager.get_rates("EUR").await;
    assert!(!snapshot.has_data());
    assert_eq!(snapshot.error, Some(RateError::NoData));

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "Offline mode must not hit the network");
}

#[test_log::test(tokio::test)]
async fn test_failed_refresh_keeps_cached_rates() {
    let good_server = test_utils::create_mock_server("USD", 200, test_utils::USD_RATES).await;
    let data_dir = TempDir::new().unwrap();
    let config_path = write_config(&data_dir, &good_server.uri());

    {
        let ctx = AppContext::new(load_config(&config_path), false).unwrap();
        let snapshot = ctx.manager.get_rates("USD").await;
        assert_eq!(snapshot.error, None);
    }

    let bad_server = test_utils::create_mock_server("USD", 500, "").await;
    let config_path = write_config(&data_dir, &bad_server.uri());
    let ctx = AppContext::new(load_config(&config_path), false).unwrap();
    let snapshot = ctx.manager.get_rates("USD").await;

    assert!(matches!(snapshot.error, Some(RateError::NetworkFailure(_))));
    assert_eq!(snapshot.rates.get("EUR"), Some(0.9));
    assert!(!snapshot.is_loading);
}

#[test_log::test(tokio::test)]
async fn test_metal_flow() {
    let mock_server = test_utils::create_mock_server("USD", 200, test_utils::USD_RATES).await;
    let data_dir = TempDir::new().unwrap();
    let config_path = write_config(&data_dir, &mock_server.uri());

    let result = xcur::run_command(
        AppCommand::Metal {
            metal: Metal::Gold,
            query: None,
            grams: true,
        },
        Some(&config_path),
        false,
    )
    .await;
    assert!(result.is_ok(), "Metal failed with: {:?}", result.err());

    let ctx = AppContext::new(load_config(&config_path), true).unwrap();
    let snapshot = ctx.manager.get_rates("USD").await;
    let gold = derive_metal_rates(&snapshot.rates, Metal::Gold, &MetalFallback::default()).unwrap();

    assert!(!gold.approximate);
    assert!((gold.rates.get("USD").unwrap() - 2000.0).abs() < 1e-9);
    assert!((gold.rates.get("EUR").unwrap() - 1800.0).abs() < 1e-9);
}

#[test_log::test(tokio::test)]
async fn test_favorites_toggle_persists() {
    let mock_server = wiremock::MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let config_path = write_config(&data_dir, &mock_server.uri());

    let result = xcur::run_command(
        AppCommand::Favorites(FavoritesAction::Toggle("jpy".to_string())),
        Some(&config_path),
        true,
    )
    .await;
    assert!(result.is_ok(), "Favorites failed with: {:?}", result.err());

    let invalid = xcur::run_command(
        AppCommand::Favorites(FavoritesAction::Toggle("not a code".to_string())),
        Some(&config_path),
        true,
    )
    .await;
    assert!(invalid.is_err());

    let ctx = AppContext::new(load_config(&config_path), true).unwrap();
    let favorites = ctx.favorites().unwrap();
    assert!(favorites.is_favorite("JPY"));
    assert!(favorites.is_favorite("USD"));
    assert_eq!(favorites.favorites().len(), 5);
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_fails() {
    let result = xcur::run_command(
        AppCommand::Favorites(FavoritesAction::List),
        Some("/nonexistent/xcur/config.yaml"),
        true,
    )
    .await;
    assert!(result.is_err());
}

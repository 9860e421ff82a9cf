use std::{path::Path, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use narrator_core::{
    Config, Narrative, NarrativeOptions, ProviderError, WeatherProvider, narrate,
    provider::default_provider_from_config,
};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::page;

/// Per-process handles shared by every request. Nothing in here is mutated.
#[derive(Debug, Clone)]
pub struct AppState {
    pub provider: Arc<dyn WeatherProvider>,
    pub options: NarrativeOptions,
}

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    city: Option<String>,
}

/// JSON error for the `/api` routes.
struct ApiError(ProviderError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            if self.0.is_not_found() { StatusCode::NOT_FOUND } else { StatusCode::BAD_GATEWAY };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        Self(err)
    }
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(|| async { "OK" }))
        .route("/search", get(search_handler))
        .route("/weather/{city}", get(weather_handler))
        .route("/api/weather/{city}", get(api_weather_handler))
        .route("/error", get(error_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: &Config, bind: &str) -> anyhow::Result<()> {
    let provider: Arc<dyn WeatherProvider> = default_provider_from_config(config)?.into();
    let state = AppState { provider, options: config.narrative_options() };
    let app = router(state, &config.server.static_dir);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(
        framing = %config.narrative.framing,
        bands = %config.narrative.bands,
        "narrator listening at http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

fn city_path(city: &str) -> String {
    format!("/weather/{}", urlencoding::encode(city))
}

fn not_found_path(city: &str) -> String {
    format!("/error?city={}", urlencoding::encode(city))
}

async fn home_handler() -> Html<String> {
    Html(page::home())
}

async fn search_handler(Query(query): Query<CityQuery>) -> Redirect {
    match query.city.as_deref().map(str::trim) {
        Some(city) if !city.is_empty() => Redirect::to(&city_path(city)),
        _ => Redirect::to("/"),
    }
}

async fn fetch(state: &AppState, city: &str) -> Result<Narrative, ProviderError> {
    narrate(state.provider.as_ref(), city, &state.options).await
}

async fn weather_handler(
    State(state): State<AppState>,
    UrlPath(city): UrlPath<String>,
) -> Response {
    match fetch(&state, &city).await {
        Ok(narrative) => Html(page::weather(&narrative)).into_response(),
        Err(err) if err.is_not_found() => {
            info!(%city, "city not found");
            Redirect::to(&not_found_path(&city)).into_response()
        }
        Err(err) => {
            error!(%city, error = %err, "failed to build weather page");
            Redirect::to("/error").into_response()
        }
    }
}

async fn api_weather_handler(
    State(state): State<AppState>,
    UrlPath(city): UrlPath<String>,
) -> Result<Json<Narrative>, ApiError> {
    Ok(Json(fetch(&state, &city).await?))
}

async fn error_handler(Query(query): Query<CityQuery>) -> Response {
    match query.city.as_deref().map(str::trim) {
        Some(city) if !city.is_empty() => {
            (StatusCode::NOT_FOUND, Html(page::error(Some(city)))).into_response()
        }
        _ => Html(page::error(None)).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use chrono::{TimeZone, Utc};
    use narrator_core::{Condition, Temperature, WeatherObservation};
    use tower::ServiceExt;

    #[derive(Debug)]
    struct StubProvider {
        yesterday_fails: bool,
    }

    fn observation(city: &str, temperature: Temperature) -> WeatherObservation {
        WeatherObservation {
            city: city.to_string(),
            country: "GB".into(),
            observed_at: Utc.with_ymd_and_hms(2024, 6, 12, 14, 0, 0).unwrap(),
            utc_offset_secs: 0,
            temperature,
            temperature_min: None,
            temperature_max: None,
            humidity_pct: 60,
            pressure_hpa: 1015,
            wind_speed_mps: 3.0,
            sunrise: None,
            sunset: None,
            is_day: None,
            conditions: vec![Condition {
                code: 800,
                icon: "01d".into(),
                description: "clear sky".into(),
            }],
            coordinates: None,
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn current(&self, city: &str) -> Result<WeatherObservation, ProviderError> {
            if city == "Atlantis" {
                return Err(ProviderError::CityNotFound(city.to_string()));
            }
            if city == "Broken" {
                return Err(ProviderError::parse("stub", "garbled"));
            }
            Ok(observation(city, Temperature::kelvin_value(289.35)))
        }

        async fn yesterday(
            &self,
            today: &WeatherObservation,
        ) -> Result<Option<WeatherObservation>, ProviderError> {
            if self.yesterday_fails {
                return Err(ProviderError::MissingCoordinates(today.city.clone()));
            }
            Ok(Some(observation(&today.city, Temperature::celsius_value(10.0))))
        }
    }

    fn app(yesterday_fails: bool) -> Router {
        let state = AppState {
            provider: Arc::new(StubProvider { yesterday_fails }),
            options: NarrativeOptions::default(),
        };
        router(state, Path::new("static"))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get("location")
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, location, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn weather_page_renders_narrative() {
        let (status, _, body) = get(app(false), "/weather/London").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>London, GB</h1>"));
        assert!(body.contains("16&deg;C</span> with clear skies."));
        assert!(body.contains("This afternoon is much warmer than yesterday."));
    }

    #[tokio::test]
    async fn missing_yesterday_still_renders() {
        let (status, _, body) = get(app(true), "/weather/London").await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("class=\"comparison\""));
    }

    #[tokio::test]
    async fn unknown_city_redirects_to_error_page() {
        let (status, location, _) = get(app(false), "/weather/Atlantis").await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/error?city=Atlantis"));

        let (status, _, body) = get(app(false), "/error?city=Atlantis").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Atlantis"));
    }

    #[tokio::test]
    async fn blank_error_city_renders_generic_page() {
        for uri in ["/error?city=", "/error?city=+++", "/error"] {
            let (status, _, body) = get(app(false), uri).await;

            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(body.contains("Something went wrong"), "{uri}");
            assert!(!body.contains("find a city called"), "{uri}");
        }
    }

    #[tokio::test]
    async fn provider_failure_redirects_to_generic_error() {
        let (status, location, _) = get(app(false), "/weather/Broken").await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/error"));
    }

    #[tokio::test]
    async fn search_redirects_to_city_page() {
        let (status, location, _) = get(app(false), "/search?city=New+York").await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/weather/New%20York"));

        let (_, location, _) = get(app(false), "/search?city=").await;
        assert_eq!(location.as_deref(), Some("/"));
    }

    #[tokio::test]
    async fn api_returns_json_narrative() {
        let (status, _, body) = get(app(false), "/api/weather/London").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["temperature"], 16);
        assert_eq!(json["description"], "clear skies");

        let (status, _, _) = get(app(false), "/api/weather/Atlantis").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, body) = get(app(false), "/api/weather/Broken").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("\"error\""));
    }

    #[tokio::test]
    async fn health_check() {
        let (status, _, body) = get(app(false), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}

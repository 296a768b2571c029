use super::api::SolarApi;
use super::scheduler::{Scheduler, with_timeout};
use crate::config::Config;
use crate::models::prediction::{DailyProduction, INVERTER_COUNT, InverterId};
use crate::store::{AppState, Store};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Fetches the next 24 hours of predictions for every inverter, one at a time.
///
/// Each inverter's points are written to the store as they arrive. An
/// inverter whose request fails contributes an empty series. If every
/// inverter fails, the error is recorded instead of an all-zero forecast.
pub async fn load_predictions<A, S>(api: &A, store: &Store, scheduler: &S, now: DateTime<Utc>)
where
    A: SolarApi,
    S: Scheduler,
{
    store.update(AppState::begin_predictions);
    let end = now + Duration::hours(24);
    let mut all = BTreeMap::new();
    let mut failed = 0;
    let mut last_error = None;

    for inverter in InverterId::all() {
        let result = with_timeout(
            scheduler,
            Config::REQUEST_TIMEOUT_MS,
            api.fetch_predictions(inverter, now, end, Config::PREDICTION_INTERVAL_MINUTES),
        )
        .await;

        let predictions = match result {
            Ok(predictions) => Some(predictions),
            Err(e) => {
                log::warn!("{inverter} prediction error: {e}");
                failed += 1;
                last_error = Some(e);
                None
            }
        };
        let loaded = predictions.is_some();
        let predictions = predictions.unwrap_or_default();
        store.update(|s| s.set_inverter_predictions(inverter, predictions.clone()));
        all.insert(inverter, predictions);

        // No pause after a failed request
        if loaded {
            scheduler.sleep(Config::INVERTER_REQUEST_GAP_MS).await;
        }
    }

    if let Some(e) = last_error.filter(|_| failed == INVERTER_COUNT) {
        store.set_error(format!("Failed to load predictions: {e}"));
        return;
    }

    let daily = DailyProduction::from_predictions(&all);
    store.update(|s| s.set_daily_production(daily));
}

/// Fetches model metrics for every inverter, one at a time. Failures become `None`.
pub async fn load_inverter_metrics<A, S>(api: &A, store: &Store, scheduler: &S)
where
    A: SolarApi,
    S: Scheduler,
{
    store.update(AppState::begin_metrics);
    let mut metrics = BTreeMap::new();
    let mut last_error = None;

    for inverter in InverterId::all() {
        let result = with_timeout(
            scheduler,
            Config::REQUEST_TIMEOUT_MS,
            api.fetch_metrics(inverter),
        )
        .await;

        match result {
            Ok(m) => {
                metrics.insert(inverter, Some(m));
                scheduler.sleep(Config::INVERTER_REQUEST_GAP_MS).await;
            }
            Err(e) => {
                log::warn!("{inverter} metrics error: {e}");
                metrics.insert(inverter, None);
                last_error = Some(e);
            }
        }
    }

    let all_failed = metrics.values().all(Option::is_none);
    store.update(|s| s.set_inverter_metrics(metrics));
    if let Some(e) = last_error.filter(|_| all_failed) {
        store.set_error(format!("Failed to load model metrics: {e}"));
    }
}

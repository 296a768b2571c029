use super::use_app_state::use_services;
use crate::services::dashboard::{load_inverter_metrics, load_predictions};
use chrono::Utc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Loads the 24 hour forecast and the inverter model metrics once on mount.
#[hook]
pub fn use_dashboard_data() {
    let services = use_services();

    use_effect_with((), move |_| {
        spawn_local(async move {
            let client = services.client.as_ref();
            load_predictions(client, &services.store, &services.scheduler, Utc::now()).await;
            load_inverter_metrics(client, &services.store, &services.scheduler).await;
        });
        || ()
    });
}

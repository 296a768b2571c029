use super::use_app_state::use_services;
use yew::prelude::*;

/// Starts the health monitor while the calling component is mounted.
#[hook]
pub fn use_server_health() {
    let services = use_services();

    use_effect_with((), move |_| {
        let handle = services.health.start();
        move || handle.cancel()
    });
}

use crate::services::{BrowserScheduler, SolarClient, health::HealthMonitor, upload::UploadCoordinator};
use crate::store::{AppState, Store};
use std::rc::Rc;
use yew::prelude::*;

/// Everything the components need, provided once through context.
#[derive(Clone)]
pub struct AppServices {
    pub store: Store,
    pub client: Rc<SolarClient>,
    pub scheduler: BrowserScheduler,
    pub coordinator: UploadCoordinator<SolarClient, BrowserScheduler>,
    pub health: HealthMonitor<SolarClient, BrowserScheduler>,
}

impl AppServices {
    pub fn new(client: SolarClient) -> Self {
        let store = Store::new();
        let client = Rc::new(client);
        let scheduler = BrowserScheduler;

        Self {
            coordinator: UploadCoordinator::new(client.clone(), store.clone(), scheduler),
            health: HealthMonitor::new(client.clone(), store.clone(), scheduler),
            store,
            client,
            scheduler,
        }
    }
}

impl PartialEq for AppServices {
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store && Rc::ptr_eq(&self.client, &other.client)
    }
}

/// Services from the nearest `ContextProvider<AppServices>`.
#[hook]
pub fn use_services() -> AppServices {
    use_context::<AppServices>().expect("AppServices context is not provided")
}

/// Current application state; re-renders the component on every store change.
#[hook]
pub fn use_app_state() -> AppState {
    let store = use_services().store;
    let state = use_state(|| store.snapshot());

    {
        let state = state.clone();
        use_effect_with(store, move |store| {
            // Catch up on changes made between the first render and subscribing
            state.set(store.snapshot());

            let setter = state.setter();
            let id = store.subscribe(Callback::from(move |next: AppState| setter.set(next)));
            let store = store.clone();
            move || store.unsubscribe(id)
        });
    }

    (*state).clone()
}

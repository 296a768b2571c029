use solar_dashboard::components::{HealthBadge, MetricsPanel, UploadWidget};
use solar_dashboard::config::Config;
use solar_dashboard::hooks::{
    use_app_state::{AppServices, use_app_state, use_services},
    use_dashboard_data::use_dashboard_data,
    use_server_health::use_server_health,
};
use solar_dashboard::logging;
use solar_dashboard::services::SolarClient;
use yew::prelude::*;

#[function_component(Dashboard)]
fn dashboard() -> Html {
    use_server_health();
    use_dashboard_data();
    let state = use_app_state();
    let store = use_services().store;
    let dismiss_error = Callback::from(move |_: MouseEvent| store.clear_error());

    html! {
        <div class="app-container">
            <header class="app-header">
                <h1>{"Solar Production Dashboard"}</h1>
                <HealthBadge health={state.health.clone()} />
            </header>

            <main class="app-main">
                if let Some(error) = state.last_error.clone() {
                    <div class="status error">
                        <p>{"❌ Error: "}{error}</p>
                        <button type="button" class="preview-close" onclick={dismiss_error}>{"✕"}</button>
                    </div>
                }

                <section class="upload-section">
                    <h2>{"Upload Production Data"}</h2>
                    <UploadWidget upload={state.upload.clone()} job={state.job.clone()} />
                </section>

                <section class="data-section">
                    <h2>{"Production Forecast"}</h2>
                    <MetricsPanel
                        production={state.production_metrics}
                        daily={state.daily_production.clone()}
                        inverters={state.inverter_metrics.clone()}
                        loading_predictions={state.is_loading_predictions}
                        loading_metrics={state.is_loading_metrics}
                    />
                </section>
            </main>
        </div>
    }
}

#[function_component(App)]
fn app() -> Html {
    let services = use_memo((), |_| SolarClient::new().map(AppServices::new));

    let content = match &*services {
        Ok(services) => html! {
            <ContextProvider<AppServices> context={services.clone()}>
                <Dashboard />
            </ContextProvider<AppServices>>
        },
        Err(e) => html! {
            <div class="status error">
                <p>{"❌ Error: "}{e.to_string()}</p>
            </div>
        },
    };

    html! {
        <>
            {content}
            <style>
                {include_str!("style.css")}
            </style>
        </>
    }
}

fn main() {
    logging::init(Config::LOG_LEVEL);
    yew::Renderer::<App>::new().render();
}

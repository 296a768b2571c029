use crate::models::health::ServerHealth;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct HealthBadgeProps {
    pub health: ServerHealth,
}

#[function_component(HealthBadge)]
pub fn health_badge(props: &HealthBadgeProps) -> Html {
    let health = &props.health;
    let title = health
        .last_checked
        .map(|t| format!("Last checked {}", t.format("%H:%M:%S UTC")))
        .unwrap_or_default();

    html! {
        <div class={classes!("health-badge", health.status.css_class())} {title}>
            <span class="health-dot"></span>
            <span class="health-label">{health.label()}</span>
            if let Some(version) = &health.api_version {
                <span class="health-version">{format!("v{version}")}</span>
            }
        </div>
    }
}

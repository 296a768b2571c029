pub mod use_app_state;
pub mod use_dashboard_data;
pub mod use_server_health;

use super::series_chart::{SeriesChart, SeriesData, SeriesKind};
use crate::models::prediction::{DailyProduction, InverterId, InverterMetrics, ProductionMetrics};
use std::collections::BTreeMap;
use std::rc::Rc;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct MetricsPanelProps {
    pub production: ProductionMetrics,
    pub daily: Option<DailyProduction>,
    pub inverters: BTreeMap<InverterId, Option<InverterMetrics>>,
    pub loading_predictions: bool,
    pub loading_metrics: bool,
}

/// Forecast totals, the hourly forecast chart and per-inverter model quality.
#[function_component(MetricsPanel)]
pub fn metrics_panel(props: &MetricsPanelProps) -> Html {
    let series = use_memo(props.daily.clone(), |daily| {
        daily.as_ref().map(|d| Rc::new(SeriesData::from(d.series_data())))
    });
    let series: Option<Rc<SeriesData>> = (*series).clone();
    let production = props.production;

    html! {
        <div class="metrics-panel">
            <div class="summary-grid">
                <div class="summary-item">
                    <h3>{"Next 24h"}</h3>
                    <p class="summary-value">{format_energy(production.daily_total)}</p>
                </div>
                <div class="summary-item">
                    <h3>{"Hourly Average"}</h3>
                    <p class="summary-value">{format_energy(production.daily_average)}</p>
                </div>
                <div class="summary-item">
                    <h3>{"Monthly Estimate"}</h3>
                    <p class="summary-value">{format_energy(production.monthly_production)}</p>
                </div>
            </div>

            if props.loading_predictions {
                <div class="status loading">
                    <div class="spinner"></div>
                    <p>{"Loading forecast..."}</p>
                </div>
            } else if let Some(series) = series {
                <SeriesChart
                    id="forecast-chart"
                    title="Forecast production"
                    unit="kWh"
                    kind={SeriesKind::Bar}
                    data={series}
                />
            }

            <h3>{"Model Quality"}</h3>
            if props.loading_metrics {
                <div class="status loading">
                    <div class="spinner"></div>
                    <p>{"Loading metrics..."}</p>
                </div>
            } else {
                <table class="metrics-table">
                    <thead>
                        <tr>
                            <th>{"Inverter"}</th>
                            <th>{"R²"}</th>
                            <th>{"MAE"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        { for props.inverters.iter().map(|(id, metrics)| html! {
                            <tr>
                                <td>{id.to_string()}</td>
                                {
                                    match metrics {
                                        Some(m) => html! {
                                            <>
                                                <td>{format!("{:.1}%", m.r2_percent())}</td>
                                                <td>{format!("{:.3}", m.mae)}</td>
                                            </>
                                        },
                                        None => html! {
                                            <>
                                                <td>{"N/A"}</td>
                                                <td>{"N/A"}</td>
                                            </>
                                        },
                                    }
                                }
                            </tr>
                        }) }
                    </tbody>
                </table>
            }
        </div>
    }
}

fn format_energy(kwh: f64) -> String {
    if kwh >= 1000.0 {
        format!("{:.2} MWh", kwh / 1000.0)
    } else {
        format!("{kwh:.1} kWh")
    }
}

use charming::{
    Chart as CharmingChart,
    component::{Axis, Grid, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, LineStyle, LineStyleType, SplitLine,
        TextStyle, Tooltip, Trigger,
    },
    renderer::WasmRenderer,
    series::{Bar, Line},
};
use gloo::events::EventListener;
use std::rc::Rc;
use web_sys::HtmlElement;
use yew::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    Bar,
}

/// Labels and values for a single series, shared cheaply between renders.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl From<(Vec<String>, Vec<f64>)> for SeriesData {
    fn from((labels, values): (Vec<String>, Vec<f64>)) -> Self {
        Self { labels, values }
    }
}

#[derive(Properties, PartialEq)]
pub struct SeriesChartProps {
    /// DOM id for the render target; must be unique on the page.
    pub id: AttrValue,
    pub title: AttrValue,
    pub unit: AttrValue,
    pub data: Rc<SeriesData>,
    #[prop_or(SeriesKind::Line)]
    pub kind: SeriesKind,
}

#[function_component(SeriesChart)]
pub fn series_chart(props: &SeriesChartProps) -> Html {
    let container_ref = use_node_ref();

    {
        let container_ref = container_ref.clone();
        let spec = ChartSpec {
            id: props.id.clone(),
            title: props.title.clone(),
            unit: props.unit.clone(),
            data: props.data.clone(),
            kind: props.kind,
        };

        use_effect_with((spec, container_ref), |(spec, container_ref)| {
            let listener = container_ref.cast::<HtmlElement>().and_then(|container| {
                render_chart(&container, spec);

                let spec = spec.clone();
                let window = web_sys::window()?;
                Some(EventListener::new(&window, "resize", move |_| {
                    render_chart(&container, &spec);
                }))
            });

            move || drop(listener)
        });
    }

    html! {
        <div class="chart-container" ref={container_ref}>
            <div id={props.id.clone()} />
        </div>
    }
}

#[derive(Clone, PartialEq)]
struct ChartSpec {
    id: AttrValue,
    title: AttrValue,
    unit: AttrValue,
    data: Rc<SeriesData>,
    kind: SeriesKind,
}

fn render_chart(container: &HtmlElement, spec: &ChartSpec) {
    let width = container.client_width().cast_unsigned();
    let height = container.client_height().cast_unsigned();

    if width == 0 || height == 0 || spec.data.values.is_empty() {
        return;
    }

    let chart = build_chart(spec);
    if let Err(e) = WasmRenderer::new(width, height).render(&spec.id, &chart) {
        log::error!("Render error: {e:?}");
    }
}

fn build_chart(spec: &ChartSpec) -> CharmingChart {
    let (title_color, axis_color, grid_color) = ("#1f2937", "#6b7280", "#e5e7eb");
    // Thin out labels on long series
    let label_interval = (spec.data.labels.len() / 12).max(1) - 1;

    let chart = CharmingChart::new()
        .title(
            Title::new()
                .text(spec.title.to_string())
                .left("center")
                .text_style(TextStyle::new().font_size(16).color(title_color)),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("8%")
                .right("4%")
                .bottom("18%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(spec.data.labels.clone())
                .axis_label(
                    AxisLabel::new()
                        .rotate(45)
                        .color(axis_color)
                        .interval(label_interval as f64),
                ),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name(spec.unit.to_string())
                .axis_label(AxisLabel::new().color(axis_color))
                .split_line(
                    SplitLine::new().line_style(
                        LineStyle::new()
                            .color(grid_color)
                            .type_(LineStyleType::Dashed),
                    ),
                ),
        );

    match spec.kind {
        SeriesKind::Line => chart.series(Line::new().data(spec.data.values.clone())),
        SeriesKind::Bar => chart.series(Bar::new().data(spec.data.values.clone()).bar_width("70%")),
    }
}

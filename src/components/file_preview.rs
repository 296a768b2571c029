use super::series_chart::{SeriesChart, SeriesData};
use crate::config::Config;
use crate::models::{error::PreviewError, production::ProductionFile};
use std::rc::Rc;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FilePreviewProps {
    pub file_name: AttrValue,
    pub parsed: Rc<Result<ProductionFile, PreviewError>>,
    pub on_close: Callback<()>,
}

/// First rows of the selected file plus a chart of total production.
#[function_component(FilePreview)]
pub fn file_preview(props: &FilePreviewProps) -> Html {
    let series = use_memo(props.parsed.clone(), |parsed| {
        (**parsed)
            .as_ref()
            .ok()
            .map(|file| Rc::new(SeriesData::from(file.total_series())))
    });
    let series: Option<Rc<SeriesData>> = (*series).clone();

    let onclick = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    let body = match props.parsed.as_ref() {
        Err(e) => html! {
            <div class="status error">
                <p>{"❌ Could not read file: "}{e.to_string()}</p>
            </div>
        },
        Ok(file) => html! {
            <>
                if let Some((first, last)) = file.date_range() {
                    <p class="preview-range">
                        {format!("{} rows, {} to {}", file.rows.len(), first, last)}
                    </p>
                }
                <table class="preview-table">
                    <thead>
                        <tr>
                            { for file.headers.iter().map(|h| html! { <th>{h.clone()}</th> }) }
                        </tr>
                    </thead>
                    <tbody>
                        { for file.preview(Config::PREVIEW_ROWS).iter().map(|row| html! {
                            <tr>
                                <td>{row.time.format("%d/%m/%Y %H:%M:%S").to_string()}</td>
                                { for row.inverters.iter().map(|v| html! { <td>{format!("{v:.2}")}</td> }) }
                            </tr>
                        }) }
                    </tbody>
                </table>
                if let Some(series) = series {
                    <SeriesChart
                        id="preview-chart"
                        title="Total production"
                        unit="kWh"
                        data={series}
                    />
                }
            </>
        },
    };

    html! {
        <div class="file-preview">
            <div class="preview-header">
                <h3>{format!("Preview: {}", props.file_name)}</h3>
                <button type="button" class="preview-close" {onclick}>{"✕"}</button>
            </div>
            {body}
        </div>
    }
}

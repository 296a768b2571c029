use super::file_preview::FilePreview;
use super::job_progress::JobProgress;
use crate::config::Config;
use crate::hooks::use_app_state::use_services;
use crate::models::{
    error::{PreviewError, UploadError},
    job::JobStatus,
    production::ProductionFile,
    upload::{UploadFile, UploadOptions, UploadStatus},
};
use crate::services::upload::preview_file;
use gloo::file::{File, futures::read_as_bytes};
use gloo_timers::callback::Timeout;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// A file read into memory together with its parsed preview.
#[derive(PartialEq)]
struct SelectedFile {
    upload: UploadFile,
    parsed: Rc<Result<ProductionFile, PreviewError>>,
}

#[derive(Properties, PartialEq)]
pub struct UploadWidgetProps {
    pub upload: UploadStatus,
    pub job: JobStatus,
}

#[function_component(UploadWidget)]
pub fn upload_widget(props: &UploadWidgetProps) -> Html {
    let services = use_services();
    let input_ref = use_node_ref();
    let selected = use_state(|| None::<Rc<SelectedFile>>);
    let notice = use_state(|| None::<String>);
    let options = use_state(UploadOptions::default);
    let show_preview = use_state(|| false);

    // Clear the success banner, then the finished job, after a short delay
    {
        let store = services.store.clone();
        use_effect_with(props.upload.success, move |success| {
            let timeout = success
                .then(|| Timeout::new(Config::UPLOAD_RESET_DELAY_MS, move || store.reset_upload()));
            move || drop(timeout)
        });
    }
    {
        let store = services.store.clone();
        use_effect_with(props.job.completed, move |completed| {
            let timeout = completed
                .then(|| Timeout::new(Config::JOB_RESET_DELAY_MS, move || store.reset_job()));
            move || drop(timeout)
        });
    }

    let onchange = {
        let selected = selected.clone();
        let notice = notice.clone();
        let show_preview = show_preview.clone();
        let store = services.store.clone();

        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            notice.set(None);
            show_preview.set(false);
            if !store.is_uploading() {
                store.reset_upload();
            }

            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                selected.set(None);
                return;
            };
            let file = File::from(file);

            // Do not pull an oversized file into memory just to reject it
            if file.size() > Config::MAX_UPLOAD_BYTES as u64 {
                let error = UploadError::FileTooLarge {
                    size: usize::try_from(file.size()).unwrap_or(usize::MAX),
                    limit: Config::MAX_UPLOAD_BYTES,
                };
                selected.set(None);
                notice.set(Some(error.to_string()));
                return;
            }

            let selected = selected.clone();
            let notice = notice.clone();
            spawn_local(async move {
                match read_as_bytes(&file).await {
                    Ok(bytes) => {
                        let upload = UploadFile::new(file.name(), bytes);
                        let parsed = Rc::new(preview_file(&upload));
                        selected.set(Some(Rc::new(SelectedFile { upload, parsed })));
                    }
                    Err(e) => {
                        log::error!("File read error: {e}");
                        selected.set(None);
                        notice.set(Some(format!("Could not read file: {e}")));
                    }
                }
            });
        })
    };

    let onsubmit = {
        let coordinator = services.coordinator.clone();
        let selected = selected.clone();
        let notice = notice.clone();
        let options = *options;
        let input_ref = input_ref.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            notice.set(None);

            let file = (*selected).as_ref().map(|s| s.upload.clone());
            let coordinator = coordinator.clone();
            let selected = selected.clone();
            let notice = notice.clone();
            let input_ref = input_ref.clone();

            spawn_local(async move {
                match coordinator.submit(file, options).await {
                    Ok(outcome) => {
                        log::info!("Upload accepted: {}", outcome.message);
                        selected.set(None);
                        if let Some(input) = input_ref.cast::<HtmlInputElement>() {
                            input.set_value("");
                        }
                    }
                    // Server and network failures are already in the upload status
                    Err(e @ (UploadError::Request(_) | UploadError::Rejected(_))) => {
                        log::debug!("Upload failed: {e}");
                    }
                    Err(e) => notice.set(Some(e.to_string())),
                }
            });
        })
    };

    let toggle_preview = {
        let show_preview = show_preview.clone();
        Callback::from(move |()| show_preview.set(!*show_preview))
    };

    let uploading = props.upload.is_uploading;

    html! {
        <div class="upload-widget">
            <form class="upload-form" {onsubmit}>
                <label class="file-input">
                    <span>{"Production file (.txt, max 10 MB)"}</span>
                    <input
                        type="file"
                        accept={Config::ACCEPTED_EXTENSION}
                        ref={input_ref}
                        disabled={uploading}
                        {onchange}
                    />
                </label>

                if let Some(file) = (*selected).clone() {
                    <div class="selected-file">
                        <span>{format!("{} ({:.1} KB)", file.upload.name, file.upload.size() as f64 / 1024.0)}</span>
                        <button
                            type="button"
                            class="preview-toggle"
                            onclick={toggle_preview.reform(|_: MouseEvent| ())}
                        >
                            { if *show_preview { "Hide preview" } else { "Preview" } }
                        </button>
                    </div>
                }

                <fieldset class="upload-options" disabled={uploading}>
                    <legend>{"Processing options"}</legend>
                    { option_checkbox("Validate only", options.validate_only, &options, |o, v| o.validate_only = v) }
                    { option_checkbox("Fetch weather", options.fetch_weather, &options, |o, v| o.fetch_weather = v) }
                    { option_checkbox("Force re-import", options.forced, &options, |o, v| o.forced = v) }
                    { option_checkbox("Train models", options.train_models, &options, |o, v| o.train_models = v) }
                    { option_checkbox("Fetch forecast weather", options.fetch_future_weather, &options, |o, v| o.fetch_future_weather = v) }
                </fieldset>

                <button type="submit" class="upload-button" disabled={uploading || selected.is_none()}>
                    { if uploading { "Uploading..." } else { "Upload" } }
                </button>
            </form>

            if uploading {
                <div class="upload-progress">
                    <div class="progress-bar">
                        <div class="progress-fill" style={format!("width: {}%", props.upload.progress.max(5))}></div>
                    </div>
                </div>
            }

            if let Some(message) = (*notice).clone() {
                <div class="status warning">
                    <p>{"⚠️ "}{message}</p>
                </div>
            }

            if let Some(error) = props.upload.error.clone() {
                <div class="status error">
                    <p>{"❌ Upload failed: "}{error}</p>
                </div>
            }

            if props.upload.success {
                <div class="status success">
                    <p>{"✅ File uploaded"}</p>
                </div>
            }

            <JobProgress job={props.job.clone()} />

            if let Some(file) = (*selected).clone().filter(|_| *show_preview) {
                <FilePreview
                    file_name={file.upload.name.clone()}
                    parsed={file.parsed.clone()}
                    on_close={toggle_preview.clone()}
                />
            }
        </div>
    }
}

fn option_checkbox(
    label: &'static str,
    checked: bool,
    options: &UseStateHandle<UploadOptions>,
    apply: fn(&mut UploadOptions, bool),
) -> Html {
    let onchange = {
        let options = options.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = *options;
            apply(&mut next, input.checked());
            options.set(next);
        })
    };

    html! {
        <label class="option">
            <input type="checkbox" {checked} {onchange} />
            {label}
        </label>
    }
}

use crate::models::job::JobStatus;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct JobProgressProps {
    pub job: JobStatus,
}

/// Progress of server-side processing after an upload.
#[function_component(JobProgress)]
pub fn job_progress(props: &JobProgressProps) -> Html {
    let job = &props.job;

    if job.completed {
        return html! {
            <div class="status success">
                <p>{"✅ Processing complete"}</p>
            </div>
        };
    }

    if !job.is_monitoring {
        return html! {};
    }

    let width = format!("width: {:.0}%", job.current_progress);
    html! {
        <div class="job-progress">
            <div class="progress-header">
                <span>{"Processing"}</span>
                <span>{format!("{:.0}%", job.current_progress)}</span>
            </div>
            <div class="progress-bar">
                <div class="progress-fill job" style={width}></div>
            </div>
            if !job.last_message.is_empty() {
                <p class="progress-message">{job.last_message.clone()}</p>
            }
            if job.active_jobs.len() > 1 {
                <p class="progress-message">{format!("{} jobs running", job.active_jobs.len())}</p>
            }
        </div>
    }
}

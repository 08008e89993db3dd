// SPDX-License-Identifier: MIT OR Apache-2.0
//! Export pipeline: ffmpeg-style argument building and the transcoder
//! seam.
//!
//! The editor never shells out itself; it builds argument lists and
//! hands them to a [`Transcoder`] implementation supplied by the host.
//! That keeps the pipeline testable and the binary free of process
//! management.

use montage_editor_scene::{ItemPayload, MediaKind, Scene, TextAlign, TextStyle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// The composition has nothing to export
    #[error("nothing to export")]
    EmptyComposition,

    /// The transcoder reported a failure
    #[error("transcoder failed: {0}")]
    Transcoder(String),
}

/// Output settings for an export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Output frame rate
    pub fps: u32,
    /// Output file path
    pub output: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
            output: "output.mp4".to_string(),
        }
    }
}

/// Progress events emitted while an export runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportEvent {
    /// The run started with this many jobs
    Started {
        /// Number of jobs queued
        jobs: usize,
    },
    /// A job finished; fraction of jobs complete
    Progress(f64),
    /// All jobs finished
    Finished,
    /// A job failed
    Failed(String),
}

/// One transcoder invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportJob {
    /// What this job does, for logging
    pub description: String,
    /// Argument list, ffmpeg-style
    pub args: Vec<String>,
}

/// The seam to an actual media transcoder
pub trait Transcoder {
    /// Run one argument list to completion
    fn run(&mut self, args: &[String]) -> Result<(), ExportError>;
}

/// Arguments for a lossless trim: copy the codec, cut by time
pub fn trim_args(source: &str, start: f64, duration: f64, output: &str) -> Vec<String> {
    vec![
        "-ss".to_string(),
        format_seconds(start),
        "-i".to_string(),
        source.to_string(),
        "-t".to_string(),
        format_seconds(duration),
        "-c".to_string(),
        "copy".to_string(),
        output.to_string(),
    ]
}

/// A `scale` filter expression
pub fn scale_filter(width: u32, height: u32) -> String {
    format!("scale={width}:{height}")
}

/// A `drawtext` filter expression for a text item
pub fn drawtext_filter(content: &str, style: &TextStyle, x: f64, y: f64) -> String {
    let align_x = match style.align {
        TextAlign::Left => format!("{x:.0}"),
        TextAlign::Center => format!("{x:.0}-text_w/2"),
        TextAlign::Right => format!("{x:.0}-text_w"),
    };
    format!(
        "drawtext=text='{}':fontcolor={}:fontsize={:.0}:x={}:y={:.0}",
        escape_drawtext(content),
        style.color,
        style.size_px,
        align_x,
        y
    )
}

/// An `amix` filter mixing a number of audio inputs
pub fn audio_mix_filter(inputs: usize) -> String {
    format!("amix=inputs={inputs}:duration=longest")
}

/// Build the job list for a composition: one trim per video clip,
/// then a render pass applying text overlays and the output scale.
pub fn build_jobs(scene: &Scene, settings: &ExportSettings) -> Result<Vec<ExportJob>, ExportError> {
    let mut jobs = Vec::new();
    let mut filters = vec![scale_filter(settings.width, settings.height)];
    let mut trim_index = 0usize;

    for item in scene.items_by_z_order() {
        if !scene.track(item.kind).visible {
            continue;
        }
        match (&item.payload, item.temporal) {
            (ItemPayload::Media { source }, Some(range)) if item.kind == MediaKind::Video => {
                let intermediate = format!("trim_{trim_index}.mp4");
                trim_index += 1;
                jobs.push(ExportJob {
                    description: format!("trim {source}"),
                    args: trim_args(source, range.start_time, range.duration, &intermediate),
                });
            }
            (ItemPayload::Text { content, style }, _) => {
                filters.push(drawtext_filter(content, style, item.spatial.x, item.spatial.y));
            }
            _ => {}
        }
    }

    let audio_count = scene
        .items()
        .filter(|item| item.kind == MediaKind::Audio && scene.track(MediaKind::Audio).visible)
        .count();
    if audio_count > 1 {
        filters.push(audio_mix_filter(audio_count));
    }

    if jobs.is_empty() && filters.len() == 1 {
        return Err(ExportError::EmptyComposition);
    }

    jobs.push(ExportJob {
        description: "render composition".to_string(),
        args: vec![
            "-vf".to_string(),
            filters.join(","),
            "-r".to_string(),
            settings.fps.to_string(),
            settings.output.clone(),
        ],
    });
    Ok(jobs)
}

/// Run the composition through a transcoder, reporting progress
pub fn run_export(
    scene: &Scene,
    settings: &ExportSettings,
    transcoder: &mut dyn Transcoder,
    mut on_event: impl FnMut(ExportEvent),
) -> Result<(), ExportError> {
    let jobs = build_jobs(scene, settings)?;
    let total = jobs.len();
    on_event(ExportEvent::Started { jobs: total });
    for (index, job) in jobs.iter().enumerate() {
        tracing::info!(description = %job.description, "export job");
        if let Err(err) = transcoder.run(&job.args) {
            on_event(ExportEvent::Failed(err.to_string()));
            return Err(err);
        }
        on_event(ExportEvent::Progress((index + 1) as f64 / total as f64));
    }
    on_event(ExportEvent::Finished);
    Ok(())
}

fn format_seconds(seconds: f64) -> String {
    format!("{seconds:.3}")
}

/// Escape characters that break a drawtext expression
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'").replace(':', "\\:")
}

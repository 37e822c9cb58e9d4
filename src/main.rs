use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use indicatif::ProgressStyle;
use tracing::{info, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use centroid_tracker::config::*;
use centroid_tracker::dataset::*;
use centroid_tracker::pipeline::Pipeline;
use centroid_tracker::synthetic::SyntheticScene;
use centroid_tracker::visualization::Renderer;

#[derive(Parser)]
pub struct Args {
    /// Detection log in JSON lines. Without it a synthetic scene is tracked.
    #[clap(short)]
    pub input_file: Option<PathBuf>,
    #[clap(flatten)]
    pub config: Config,
}

fn main() -> Result<()> {
    // parse the config
    let args = Args::parse();
    let config = args.config;

    // setup logging
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stdout_writer()))
        .with(indicatif_layer)
        .init();

    // frame source
    let mut source: Box<dyn FrameSource> = match &args.input_file {
        Some(path) => Box::new(DetectionLog::open(path)?),
        None => {
            info!("no detection log given, tracking a synthetic scene");
            Box::new(SyntheticScene::new(&config.synthetic, config.seed))
        }
    };

    let renderer = match &config.recording {
        Some(path) => Some(Renderer::new(Path::new(path))?),
        None => None,
    };
    let mut pipeline = Pipeline::new(&config, renderer);

    let header_span = info_span!("header");
    match source.length() {
        Some(length) => {
            header_span.pb_set_style(&ProgressStyle::default_bar());
            header_span.pb_set_length(length);
        }
        None => header_span.pb_set_style(&ProgressStyle::default_spinner()),
    }
    let header_span_enter = header_span.enter();

    while let Some(frame) = source.next_frame()? {
        pipeline.process_frame(&frame)?;
    }

    std::mem::drop(header_span_enter);
    std::mem::drop(header_span);

    let stats = pipeline.stats();
    info!(
        "processed {} frames ({} discarded), {} detections, {} identities, at most {} objects at once",
        stats.frames, stats.discarded_frames, stats.detections, stats.identities, stats.peak_objects
    );

    Ok(())
}

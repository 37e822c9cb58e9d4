use crate::tracker::DEFAULT_MAX_DISAPPEARED;

#[derive(Debug, Clone)]
#[derive(clap::Parser)]
pub struct Config {
    /// Frames an object may go unmatched before it is dropped
    #[clap(long, default_value_t = DEFAULT_MAX_DISAPPEARED)]
    pub max_disappeared: usize,

    /// Detections below this confidence never reach the tracker
    #[clap(long, default_value = "0.5")]
    pub confidence_threshold: f64,

    #[clap(long, default_value = "0")]
    pub seed: u64,

    /// Save a rerun recording of the tracked boxes to this path
    #[clap(long)]
    pub recording: Option<String>,

    #[clap(flatten)]
    pub synthetic: SyntheticConfig,
}

#[derive(Debug, Clone)]
#[derive(clap::Parser)]
pub struct SyntheticConfig {
    #[clap(long, default_value = "300")]
    pub synthetic_frames: usize,

    #[clap(long, default_value = "4")]
    pub synthetic_objects: usize,

    #[clap(long, default_value = "1280")]
    pub frame_width: f64,

    #[clap(long, default_value = "720")]
    pub frame_height: f64,

    /// Chance that the detector misses an object in a given frame
    #[clap(long, default_value = "0.1")]
    pub drop_probability: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_disappeared: DEFAULT_MAX_DISAPPEARED,
            confidence_threshold: 0.5,
            seed: 0,
            recording: None,
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        SyntheticConfig {
            synthetic_frames: 300,
            synthetic_objects: 4,
            frame_width: 1280.,
            frame_height: 720.,
            drop_probability: 0.1,
        }
    }
}

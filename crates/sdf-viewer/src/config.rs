use clap::Parser;
use sdf_sync::params::{DEFAULT_ACTIVE_COUNT, DEFAULT_DOT_SIZE, DEFAULT_SMOOTH_VALUE};
use std::path::PathBuf;

/// `sdf_viewer` - bouncing balls over a raymarched background.
///
/// The two background program texts are read from disk when the window
/// opens; the background appears once both have arrived.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory holding the background vertex and fragment programs.
    #[arg(long, env = "SDF_SHADER_DIR", default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders"))]
    pub shader_dir: PathBuf,

    /// Vertex program file name inside `shader_dir`.
    #[arg(long, env = "SDF_VERTEX_SHADER", default_value = "raymarch.vert.wgsl")]
    pub vertex_shader: String,

    /// Fragment program file name inside `shader_dir`.
    ///
    /// The uniform declarations are prepended at load time and must not be
    /// repeated in the file.
    #[arg(long, env = "SDF_FRAGMENT_SHADER", default_value = "raymarch.frag.wgsl")]
    pub fragment_shader: String,

    /// Seed for ball placement. The same seed always yields the same field.
    #[arg(long, env = "SDF_SEED", default_value_t = 97)]
    pub seed: u64,

    /// Initial number of visible balls, clamped to [1, 16].
    #[arg(long, env = "SDF_BALL_COUNT", default_value_t = DEFAULT_ACTIVE_COUNT)]
    pub ball_count: usize,

    /// Initial dot size, clamped to [0, 1].
    #[arg(long, default_value_t = DEFAULT_DOT_SIZE)]
    pub dot_size: f32,

    /// Initial smoothing factor, clamped to [0, 1].
    #[arg(long, default_value_t = DEFAULT_SMOOTH_VALUE)]
    pub smooth_value: f32,

    /// Initial logical window width.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial logical window height.
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Present without waiting for vertical sync.
    #[arg(long)]
    pub no_vsync: bool,

    /// `env_logger` filter; overrides `RUST_LOG`.
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl Config {
    pub fn vertex_path(&self) -> PathBuf {
        self.shader_dir.join(&self.vertex_shader)
    }

    pub fn fragment_path(&self) -> PathBuf {
        self.shader_dir.join(&self.fragment_shader)
    }
}

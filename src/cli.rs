//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;

use crate::constants::{DEFAULT_API_BASE, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MODEL};

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "GRAPHLESSON_DEBUG")]
    /// Enable debug logging. Env: GRAPHLESSON_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "9000", env = "GRAPHLESSON_PORT")]
    /// http listener, defaults to `9000`.
    /// Env: GRAPHLESSON_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "GRAPHLESSON_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: GRAPHLESSON_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(long, short, default_value = DEFAULT_MODEL, env = "GRAPHLESSON_MODEL")]
    /// Gemini model used for both the analysis and the lesson.
    /// Env: GRAPHLESSON_MODEL
    pub model: String,

    #[clap(long, default_value = DEFAULT_API_BASE, env = "GRAPHLESSON_API_BASE")]
    /// Base URL of the generative language API, without a trailing path.
    /// Env: GRAPHLESSON_API_BASE
    pub api_base: String,

    #[clap(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "GRAPHLESSON_MAX_UPLOAD_BYTES")]
    /// Largest accepted request body (and so graph image), in bytes.
    /// Env: GRAPHLESSON_MAX_UPLOAD_BYTES
    pub max_upload_bytes: usize,
}

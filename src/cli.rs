// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Inputs come from INPUT_* variables; flags only tune settings and output.

use std::path::PathBuf;

use clap::Parser;
use netlify_upload::output::OutputMode;

#[derive(Parser)]
#[command(name = "netlify-upload")]
#[command(about = "Upload files onto the latest Netlify deploy of a site")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to netlify-upload.yml in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format for progress and errors
    #[arg(short, long, value_enum, default_value_t = OutputMode::Actions)]
    pub output: OutputMode,

    /// Enable debug tracing on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

use clap::Parser;
use std::path::PathBuf;

use repostats::analysis::AnalysisOptions;

#[derive(Parser, Debug)]
#[command(name = "repostats", about = "Report size and shape statistics of a git repository")]
pub struct Cli {
    /// Path to the git repository
    #[arg(default_value = ".")]
    pub repo_path: PathBuf,

    /// Number of collection worker threads (default: max(cores, 4))
    #[arg(long, short = 't')]
    pub threads: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Always analyze, ignoring and not updating the report cache
    #[arg(long)]
    pub no_cache: bool,

    /// Print per-phase timings
    #[arg(long)]
    pub profile: bool,

    /// No progress bars or log output
    #[arg(long, short = 'q', conflicts_with = "profile")]
    pub quiet: bool,
}

impl Cli {
    pub fn analysis_options(&self) -> AnalysisOptions {
        let options = if self.profile {
            AnalysisOptions::profiling()
        } else if self.quiet {
            AnalysisOptions::quiet()
        } else {
            AnalysisOptions::new()
        };
        match self.threads {
            Some(n) => options.with_threads(n),
            None => options,
        }
    }
}

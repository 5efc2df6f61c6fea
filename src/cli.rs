//! Command-line interface definition for the `remotezip` binary.
//!
//! This module defines the CLI structure using `clap` derive macros,
//! providing a familiar interface similar to the standard `unzip` utility,
//! scoped to HTTP(S) archive URLs.

use clap::Parser;

/// Command-line arguments for the remotezip utility.
#[derive(Parser, Debug)]
#[command(name = "remotezip")]
#[command(version)]
#[command(about = "Browse and extract members of a remote ZIP archive over HTTP Range requests", long_about = None)]
#[command(after_help = "Examples:\n  \
  remotezip -l https://example.com/archive.zip          list files in a remote ZIP\n  \
  remotezip https://example.com/archive.zip -x joe      extract all files except joe\n  \
  remotezip -p https://example.com/archive.zip | more   send contents via pipe into more")]
pub struct Cli {
    /// HTTP or HTTPS URL of the ZIP archive.
    #[arg(value_name = "URL")]
    pub url: String,

    /// Files to extract (default: all).
    ///
    /// Optional list of file patterns to extract from the archive.
    /// Supports substring matching and basic glob patterns (* and ?).
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// List files (short format).
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely.
    ///
    /// Display detailed information about archive contents including
    /// file sizes, compression ratios, and modification timestamps.
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages.
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Verify CRC-32 of extracted members against the Central Directory.
    #[arg(long = "verify")]
    pub verify: bool,

    /// Extract files into exdir.
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude files that follow.
    #[arg(short = 'x', value_name = "FILE", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files.
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting.
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories).
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode (-qq => quieter).
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// HTTP Basic auth username.
    #[arg(long = "user", requires = "password")]
    pub username: Option<String>,

    /// HTTP Basic auth password.
    #[arg(long = "password", requires = "username")]
    pub password: Option<String>,

    /// Custom User-Agent header.
    #[arg(long = "user-agent")]
    pub user_agent: Option<String>,

    /// Retry budget for transient connect/timeout errors.
    #[arg(long = "max-retries", default_value_t = 10)]
    pub max_retries: u32,
}

impl Cli {
    /// Check if quiet mode is enabled.
    ///
    /// Quiet mode is enabled either by the `-q` flag or by pipe mode (`-p`).
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    /// Check if very quiet mode is enabled.
    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }
}

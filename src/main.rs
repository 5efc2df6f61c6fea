//! Main entry point for the `remotezip` CLI application.
//!
//! Browses and extracts members of a remote ZIP archive over HTTP Range
//! requests, without downloading the whole archive.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use remotezip::{Browser, Builder, Entry};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut builder = Builder::new(cli.url.clone())
        .max_retries(cli.max_retries);
    if let (Some(username), Some(password)) = (&cli.username, &cli.password) {
        builder = builder.with_basic_auth(username.clone(), password.clone());
    }
    if let Some(ua) = &cli.user_agent {
        builder = builder.user_agent(ua.clone());
    }

    let browser = builder
        .build()
        .await
        .with_context(|| format!("failed to open remote archive: {}", cli.url))?;

    process_zip(&browser, &cli).await?;

    browser.close();
    Ok(())
}

/// Process a ZIP archive based on CLI options.
///
/// - List mode (`-l` or `-v`): display archive contents.
/// - Extract mode: extract files matching the specified filters.
async fn process_zip(browser: &Browser, cli: &Cli) -> Result<()> {
    let entries = browser.entries().await?;

    if cli.list || cli.verbose {
        return list_files(&entries, cli.verbose);
    }

    let files_to_extract: Vec<&Entry> = entries
        .iter()
        .filter(|e| {
            if e.is_directory {
                return false;
            }

            if !cli.files.is_empty() {
                let matches = cli.files.iter().any(|f| {
                    if has_glob_chars(f) {
                        glob_match(f, &e.name)
                    } else {
                        let basename = Path::new(&e.name)
                            .file_name()
                            .map(|s| s.to_string_lossy())
                            .unwrap_or_default();
                        e.name == *f || basename == *f
                    }
                });
                if !matches {
                    return false;
                }
            }

            if cli
                .exclude
                .iter()
                .any(|x| e.name.contains(x) || glob_match(x, &e.name))
            {
                return false;
            }

            true
        })
        .collect();

    let multiple_files = cli.pipe && files_to_extract.len() > 1;
    for entry in files_to_extract {
        extract_file(browser, entry, cli, multiple_files).await?;
    }

    Ok(())
}

/// List files in the ZIP archive.
///
/// - Simple format (`-l`): just file names, one per line.
/// - Verbose format (`-v`): detailed table with size, compression ratio,
///   and timestamps.
fn list_files(entries: &[Entry], verbose: bool) -> Result<()> {
    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in entries {
        if verbose {
            let (year, month, day) = entry.mod_date();
            let (hour, minute, _second) = entry.mod_time();

            let ratio = if entry.uncompressed_size > 0 {
                format!(
                    "{:>4}%",
                    100 - (entry.compressed_size * 100 / entry.uncompressed_size)
                )
            } else {
                "  0%".to_string()
            };

            println!(
                "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
                entry.uncompressed_size,
                entry.compressed_size,
                ratio,
                year,
                month,
                day,
                hour,
                minute,
                entry.name
            );

            if !entry.is_directory {
                total_uncompressed += entry.uncompressed_size;
                total_compressed += entry.compressed_size;
                file_count += 1;
            }
        } else {
            println!("{}", entry.name);
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        let total_ratio = if total_uncompressed > 0 {
            format!(
                "{:>4}%",
                100 - (total_compressed * 100 / total_uncompressed)
            )
        } else {
            "  0%".to_string()
        };
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed, total_compressed, total_ratio, "", file_count
        );
    }

    Ok(())
}

/// Extract a single file from the archive.
///
/// - Pipe mode (`-p`): write to stdout instead of a file.
/// - Custom output directory (`-d`): extract to the specified directory.
/// - Junk paths (`-j`): ignore directory structure in the archive.
/// - Overwrite control (`-n`, `-o`): handle existing files.
async fn extract_file(
    browser: &Browser,
    entry: &Entry,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    let bytes = if cli.verify {
        browser
            .get_verified(&entry.name)
            .await?
            .context("member vanished from the Central Directory mid-run")?
    } else {
        let body = browser
            .get(&entry.name)
            .await?
            .context("member vanished from the Central Directory mid-run")?;
        body.into_vec()?
    };

    if cli.pipe {
        use std::io::Write as _;
        let mut stdout = std::io::stdout();
        if show_filename {
            writeln!(stdout, "--- {} ---", entry.name)?;
        }
        stdout.write_all(&bytes)?;
        return Ok(());
    }

    let file_name = if cli.junk_paths {
        Path::new(&entry.name)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| entry.name.clone())
    } else {
        entry.name.clone()
    };
    let output_path = match &cli.extract_dir {
        Some(dir) => PathBuf::from(dir).join(&file_name),
        None => PathBuf::from(&file_name),
    };

    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", entry.name);
            }
            return Ok(());
        }
        if !cli.overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", entry.name);
            }
            return Ok(());
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", entry.name);
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&output_path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    Ok(())
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

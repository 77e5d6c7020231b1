use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codegen_cpp::config::{discover, load_from_path, CodegenConfig};
use codegen_cpp::cpp::{generate_file, parse_header, parse_source, SerializationMode};
use codegen_cpp::edit::{atomic_write, EditBatch, EditResult, TextEdit};
use codegen_cpp::merge::{HeaderMerger, Merger, SourceMerger};
use codegen_cpp::text::Span;
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codegen-cpp")]
#[command(about = "Keep C++ headers and sources in sync", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: nearest codegen-cpp.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and print its structure as JSON
    Outline {
        file: PathBuf,

        /// Parse as a source file (definitions) instead of a header
        #[arg(long)]
        source: bool,
    },

    /// Render a new file from a header
    Generate {
        header: PathBuf,

        /// Serialization mode
        #[arg(short, long, default_value = "source")]
        mode: SerializationMode,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only what overlaps these header bytes
        #[arg(long, value_name = "START..END")]
        range: Option<Span>,
    },

    /// Bring the definitions of a source file in line with a header
    Sync {
        #[arg(long)]
        header: PathBuf,

        #[arg(long)]
        source: PathBuf,

        /// source or impl-source
        #[arg(short, long, default_value = "source", value_parser = source_mode)]
        mode: SerializationMode,

        #[command(flatten)]
        flags: SyncFlags,
    },

    /// List what the header adds at a byte offset of a source file, as JSON
    Complete {
        #[arg(long)]
        header: PathBuf,

        #[arg(long)]
        source: PathBuf,

        /// Byte offset of the cursor in the source file
        #[arg(long)]
        at: usize,

        /// source or impl-source
        #[arg(short, long, default_value = "source", value_parser = source_mode)]
        mode: SerializationMode,
    },

    /// Bring the declarations of one header in line with another
    SyncHeader {
        /// Header holding the wanted declarations
        #[arg(long)]
        from: PathBuf,

        /// Header to update
        #[arg(long)]
        into: PathBuf,

        /// header, impl-header or interface-header
        #[arg(short, long, default_value = "header", value_parser = header_mode)]
        mode: SerializationMode,

        #[command(flatten)]
        flags: SyncFlags,
    },
}

#[derive(clap::Args)]
struct SyncFlags {
    /// Write the edits to the file
    #[arg(short, long)]
    apply: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,

    /// Only add, never delete
    #[arg(long)]
    keep_unmatched: bool,

    /// Only add what overlaps these bytes of the wanted header
    #[arg(long, value_name = "START..END")]
    range: Option<Span>,
}

fn source_mode(value: &str) -> Result<SerializationMode, String> {
    let mode: SerializationMode = value.parse()?;
    if mode.is_source() {
        Ok(mode)
    } else {
        Err(format!("'{mode}' does not produce a source file"))
    }
}

fn header_mode(value: &str) -> Result<SerializationMode, String> {
    let mode: SerializationMode = value.parse()?;
    match mode {
        SerializationMode::Header
        | SerializationMode::ImplHeader
        | SerializationMode::InterfaceHeader => Ok(mode),
        _ => Err(format!("'{mode}' cannot be merged into a header")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Outline { file, source } => cmd_outline(&file, source),

        Commands::Generate {
            header,
            mode,
            output,
            range,
        } => {
            let config = resolve_config(cli.config.as_deref(), &header)?;
            cmd_generate(&config, &header, mode, output.as_deref(), range)
        }

        Commands::Sync {
            header,
            source,
            mode,
            flags,
        } => {
            let config = resolve_config(cli.config.as_deref(), &source)?;
            cmd_sync(&config, &header, &source, mode, &flags)
        }

        Commands::Complete {
            header,
            source,
            at,
            mode,
        } => {
            let config = resolve_config(cli.config.as_deref(), &source)?;
            cmd_complete(&config, &header, &source, at, mode)
        }

        Commands::SyncHeader {
            from,
            into,
            mode,
            flags,
        } => {
            let config = resolve_config(cli.config.as_deref(), &into)?;
            cmd_sync_header(&config, &from, &into, mode, &flags)
        }
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "codegen_cpp=warn",
        1 => "codegen_cpp=info",
        _ => "codegen_cpp=debug",
    };
    let mut filter = EnvFilter::from_default_env();
    // RUST_LOG wins unless -v was given
    if verbose > 0 || env::var_os("RUST_LOG").is_none() {
        filter = filter.add_directive(level.parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

/// Explicit --config, else the nearest codegen-cpp.toml above `file`.
fn resolve_config(explicit: Option<&Path>, file: &Path) -> Result<CodegenConfig> {
    if let Some(path) = explicit {
        return Ok(load_from_path(path)?);
    }
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => env::current_dir()?,
    };
    Ok(discover(dir)?)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_outline(file: &Path, source: bool) -> Result<()> {
    let text = read(file)?;
    let root = if source {
        parse_source(&text)
    } else {
        parse_header(&text)
    }
    .with_context(|| format!("failed to parse {}", file.display()))?;
    println!("{}", serde_json::to_string_pretty(&root)?);
    Ok(())
}

fn cmd_generate(
    config: &CodegenConfig,
    header: &Path,
    mode: SerializationMode,
    output: Option<&Path>,
    range: Option<Span>,
) -> Result<()> {
    let text = read(header)?;
    let root = parse_header(&text)
        .with_context(|| format!("failed to parse {}", header.display()))?;
    root.provide_names(&config.name_provider(), &[mode]);

    let header_name = file_name(header);
    let generated = generate_file(
        &root,
        &config.serialize_options(mode).with_range(range),
        &config.preamble(mode, Some(&header_name)),
    );

    match output {
        Some(path) => {
            atomic_write(path, generated.as_bytes())?;
            info!(path = %path.display(), mode = %mode, "generated file");
            println!("{} Wrote {}", "✓".green(), path.display());
        }
        None => print!("{generated}"),
    }
    Ok(())
}

fn cmd_sync(
    config: &CodegenConfig,
    header: &Path,
    source: &Path,
    mode: SerializationMode,
    flags: &SyncFlags,
) -> Result<()> {
    let header_text = read(header)?;
    let generated = parse_header(&header_text)
        .with_context(|| format!("failed to parse {}", header.display()))?;
    generated.provide_names(&config.name_provider(), &[mode]);

    let source_text = read(source)?;
    let options = merge_options(config, mode, source, flags);
    let edits = SourceMerger::new(&generated, options)
        .merge(&source_text)
        .with_context(|| format!("failed to parse {}", source.display()))?;
    finish(source, &source_text, edits, flags)
}

fn cmd_complete(
    config: &CodegenConfig,
    header: &Path,
    source: &Path,
    offset: usize,
    mode: SerializationMode,
) -> Result<()> {
    let header_text = read(header)?;
    let generated = parse_header(&header_text)
        .with_context(|| format!("failed to parse {}", header.display()))?;
    generated.provide_names(&config.name_provider(), &[mode]);

    let source_text = read(source)?;
    let options = config.merge_options(mode, file_name(source));
    let completions = SourceMerger::new(&generated, options)
        .completions_at(&source_text, offset)
        .with_context(|| format!("failed to parse {}", source.display()))?;
    println!("{}", serde_json::to_string_pretty(&completions)?);
    Ok(())
}

fn cmd_sync_header(
    config: &CodegenConfig,
    from: &Path,
    into: &Path,
    mode: SerializationMode,
    flags: &SyncFlags,
) -> Result<()> {
    let from_text = read(from)?;
    let generated = parse_header(&from_text)
        .with_context(|| format!("failed to parse {}", from.display()))?;
    generated.provide_names(&config.name_provider(), &[mode]);

    let into_text = read(into)?;
    let options = merge_options(config, mode, into, flags);
    let edits = HeaderMerger::new(&generated, options)
        .merge(&into_text)
        .with_context(|| format!("failed to parse {}", into.display()))?;
    finish(into, &into_text, edits, flags)
}

fn merge_options(
    config: &CodegenConfig,
    mode: SerializationMode,
    target: &Path,
    flags: &SyncFlags,
) -> codegen_cpp::MergeOptions {
    let options = config
        .merge_options(mode, target.display().to_string())
        .with_range(flags.range);
    if flags.keep_unmatched {
        options.with_remove_unmatched(false)
    } else {
        options
    }
}

/// List, show and optionally apply the edits computed for `file`.
fn finish(file: &Path, original: &str, edits: Vec<TextEdit>, flags: &SyncFlags) -> Result<()> {
    if edits.is_empty() {
        println!("{} {} is up to date", "✓".green(), file.display());
        return Ok(());
    }

    for edit in &edits {
        let (line, column) = line_column(original, edit.position());
        let marker = if edit.is_insert() {
            "+".green()
        } else {
            "-".red()
        };
        println!("{marker} {} ({}:{line}:{column})", edit.label(), file.display());
    }

    let batch = EditBatch::new(file, original, edits);
    if flags.diff {
        let modified = batch.apply_to_str(original)?;
        display_diff(file, original, &modified);
    }

    if flags.apply {
        match batch.apply()? {
            EditResult::Applied { file, edits } => {
                println!("{} Applied {edits} edit(s) to {}", "✓".green(), file.display())
            }
            EditResult::Unchanged { file } => {
                println!("{} {} unchanged", "⊘".cyan(), file.display())
            }
        }
    } else {
        println!("{}", "[DRY RUN - pass --apply to write the changes]".cyan());
    }
    Ok(())
}

/// 1-based line and column of byte `position`.
fn line_column(text: &str, position: usize) -> (usize, usize) {
    let before = &text[..position.min(text.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.len() - before.rfind('\n').map_or(0, |newline| newline + 1) + 1;
    (line, column)
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (synced)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

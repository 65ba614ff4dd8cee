//! Quire CLI
//!
//! Converts styled documents into pages from the terminal.
//!
//! - quire convert doc.json            # Print a page summary
//! - quire convert doc.json -o out.json # Write the paged document
//! - quire stylesheet main.css         # Resolve @import chains

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use quire_common::{DefaultFetcher, Diagnostics, Severity};
use quire_dom::StyledDocumentSpec;
use quire_layout::{
    ConfigFile, ConversionConfig, LayoutBox, MediaType, PageSize, PagedDocument, StylesheetLoader,
    convert,
};

/// Quire - paginated HTML+CSS layout
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Lay out a styled document and list its pages
    quire convert report.json

    # Letter paper, keep containers together, write the result
    quire convert report.json --page letter --continuous -o pages.json

    # Print the laid-out box tree
    quire convert report.json --layout

    # Concatenate a stylesheet and everything it imports
    quire stylesheet https://example.com/print.css
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a styled document (JSON) into pages
    Convert(ConvertArgs),
    /// Resolve a stylesheet's @import rules and print the result
    Stylesheet(StylesheetArgs),
}

#[derive(clap::Args, Debug)]
struct ConvertArgs {
    /// Styled document JSON file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Configuration JSON file; flags below override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Page size: a4, a5, letter, legal or WIDTHxHEIGHT in px
    #[arg(long, value_name = "SIZE")]
    page: Option<String>,

    /// Media type for media-dependent rules
    #[arg(long)]
    media: Option<MediaType>,

    /// Keep div, p, ul, ol, li, section and article boxes on one page
    #[arg(long)]
    continuous: bool,

    /// Render target-counter() as empty text
    #[arg(long)]
    no_target_counters: bool,

    /// Maximum number of layout passes
    #[arg(long, value_name = "N")]
    max_relayouts: Option<usize>,

    /// Split paragraphs greedily, reporting orphans/widows violations
    #[arg(long)]
    allow_widow_orphan_violation: bool,

    /// Write the paged document as JSON ("-" for stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the laid-out box tree
    #[arg(long)]
    layout: bool,
}

#[derive(clap::Args, Debug)]
struct StylesheetArgs {
    /// Stylesheet path or URL
    #[arg(value_name = "HREF")]
    href: String,

    /// Base URL relative references resolve against
    #[arg(long, value_name = "URL")]
    base: Option<String>,

    /// Media type for @import media lists
    #[arg(long, default_value = "print")]
    media: MediaType,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Convert(args) => run_convert(&args),
        Command::Stylesheet(args) => run_stylesheet(&args),
    }
}

/// Settings from the config file, then the command line.
fn load_config(args: &ConvertArgs) -> anyhow::Result<ConversionConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigFile::from_json(&read(path)?)
            .and_then(ConfigFile::into_config)
            .with_context(|| format!("in {}", path.display()))?,
        None => ConversionConfig::default(),
    };
    if let Some(name) = &args.page {
        let page = PageSize::parse(name)
            .with_context(|| format!("unknown page size '{name}'"))?;
        config = config.with_page(page);
    }
    if let Some(media) = args.media {
        config = config.with_media(media);
    }
    if args.continuous {
        config = config.with_continuous_container(true);
    }
    if args.no_target_counters {
        config = config.with_target_counters(false);
    }
    if let Some(n) = args.max_relayouts {
        config = config.with_max_relayouts(n);
    }
    if args.allow_widow_orphan_violation {
        config = config.with_widow_orphan_violation(true);
    }
    Ok(config)
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn run_convert(args: &ConvertArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let spec = StyledDocumentSpec::from_json(&read(&args.input)?)
        .with_context(|| format!("in {}", args.input.display()))?;
    let tree = spec.into_styled_tree()?;
    let paged = convert(&tree, &config)?;

    print_diagnostics(&paged.diagnostics);
    if args.layout {
        println!("{}", "=== Box Tree ===".bold());
        print_layout_box(&paged.box_tree, 0);
        println!();
    }
    match &args.output {
        Some(path) if path.as_os_str() == "-" => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &paged)?;
            writeln!(stdout)?;
        }
        Some(path) => {
            let json = serde_json::to_string_pretty(&paged)?;
            fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
            println!("Paged document saved to: {}", path.display());
        }
        None => print_pages(&paged),
    }
    Ok(())
}

fn run_stylesheet(args: &StylesheetArgs) -> anyhow::Result<()> {
    let fetcher = DefaultFetcher;
    let loader = StylesheetLoader::new(&fetcher, args.media);
    let loaded = loader.load(&args.href, args.base.as_deref());
    print_diagnostics(&loaded.diagnostics);
    for source in &loaded.sources {
        eprintln!("{} {source}", "loaded".dimmed());
    }
    println!("{}", loaded.css);
    if loaded.diagnostics.has_errors() {
        anyhow::bail!("stylesheet could not be loaded completely");
    }
    Ok(())
}

/// Diagnostics go to stderr, one colored line each, then a count.
fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        eprintln!("{}", diagnostic.to_terminal_line());
    }
    if !diagnostics.is_empty() {
        eprintln!(
            "{} warning(s), {} error(s)",
            diagnostics.count_severity(Severity::Warn),
            diagnostics.count_severity(Severity::Error)
        );
    }
}

fn print_pages(paged: &PagedDocument) {
    println!(
        "{} page(s), {} layout pass(es), fonts: {}",
        paged.pages.len().bold(),
        paged.relayout_passes,
        if paged.fonts_used.is_empty() {
            "none".to_string()
        } else {
            paged.fonts_used.join(", ")
        }
    );
    for page in &paged.pages {
        if page.blank {
            println!("\n{}", format!("=== Page {} (blank) ===", page.number).dimmed());
            continue;
        }
        println!(
            "\n{}",
            format!(
                "=== Page {} ({} fragments, {} lines) ===",
                page.number,
                page.fragments.len(),
                page.lines.len()
            )
            .cyan()
        );
        for line in page.text().lines() {
            println!("  {line}");
        }
    }
}

/// Recursively print a layout box with its dimensions
fn print_layout_box(layout_box: &LayoutBox, depth: usize) {
    let indent = "  ".repeat(depth);
    let dims = &layout_box.dimensions;
    let name = match layout_box.text() {
        Some(text) => {
            let preview: String = text.chars().take(30).collect();
            let suffix = if text.chars().count() > 30 { "..." } else { "" };
            format!("Text(\"{}{}\")", preview.replace('\n', "\\n"), suffix)
        }
        None => layout_box.describe(),
    };
    println!("{indent}[{}] {name}", layout_box.id.0);
    println!(
        "{}  content: x={:.1} y={:.1} w={:.1} h={:.1}",
        indent, dims.content.x, dims.content.y, dims.content.width, dims.content.height
    );
    for child in &layout_box.children {
        print_layout_box(child, depth + 1);
    }
}

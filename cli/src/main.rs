//! stylesplit CLI - export each page of a document as its own file
//!
//! Files are named after the text of a chosen paragraph style on each page.

mod ui;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead};
use std::path::PathBuf;
use stylesplit::{
    plan_export, run_export, sanitize, DocxExportService, ExportFormat, ExportOptions,
    ExportReport, ExportSettings,
};
use ui::TerminalInteraction;
use unicode_width::UnicodeWidthStr;

/// Export each document page as a file named from its styled text
#[derive(Parser)]
#[command(
    name = "stylesplit",
    author = "iyulab",
    version,
    about = "Export each page as a file named from styled text",
    long_about = "stylesplit - split a Word document into one PDF, JPEG or PNG per page.\n\n\
                  Each file is named after the first paragraph on its page that carries\n\
                  the chosen paragraph style, made safe for any filesystem."
)]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export pages as individual files
    Export {
        /// Input file path
        input: PathBuf,

        #[command(flatten)]
        naming: NamingArgs,

        /// Output folder (default: ask, suggesting the document's folder)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Answer yes to every question and skip the save prompt
        #[arg(short, long)]
        yes: bool,

        /// Verify every rendered file before writing it
        #[arg(long)]
        preflight: bool,

        /// Image resolution in pixels per inch (36-600)
        #[arg(long)]
        resolution: Option<u32>,

        /// JPEG quality (1-100)
        #[arg(long)]
        quality: Option<u8>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the filename each page would get
    Preview {
        /// Input file path
        input: PathBuf,

        #[command(flatten)]
        naming: NamingArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// List paragraph styles and the pages they appear on
    Styles {
        /// Input file path
        input: PathBuf,
    },

    /// Show document information and metadata
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Sanitize text into filename fragments (reads stdin when no text is given)
    Sanitize {
        /// Text to sanitize, one fragment per argument
        text: Vec<String>,
    },

    /// Show version information
    Version,
}

/// Options shared by `export` and `preview`.
#[derive(Args)]
struct NamingArgs {
    /// Paragraph style that names each page (default: first style)
    #[arg(short, long)]
    style: Option<String>,

    /// Export only this page (1-based)
    #[arg(short, long)]
    page: Option<usize>,

    /// Export every page, even if the settings file selects one
    #[arg(long, conflicts_with = "page")]
    all: bool,

    /// Text placed before each name
    #[arg(long, allow_hyphen_values = true)]
    prefix: Option<String>,

    /// Text placed after each name
    #[arg(long, allow_hyphen_values = true)]
    suffix: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// JSON settings file; flags override its values
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// Output format
#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// PDF document
    Pdf,
    /// JPEG image
    #[value(alias = "jpeg")]
    Jpg,
    /// PNG image
    Png,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Pdf => ExportFormat::Pdf,
            FormatArg::Jpg => ExportFormat::Jpeg,
            FormatArg::Png => ExportFormat::Png,
        }
    }
}

impl NamingArgs {
    fn options(&self) -> Result<ExportOptions, Box<dyn std::error::Error>> {
        let mut options = ExportOptions::new();
        if let Some(ref path) = self.settings {
            options = ExportSettings::from_path(path)?.apply(options);
        }
        if let Some(ref style) = self.style {
            options = options.with_style(style.clone());
        }
        if let Some(page) = self.page {
            options = options.with_page(page);
        }
        if self.all {
            options = options.with_all_pages();
        }
        if let Some(ref prefix) = self.prefix {
            options = options.with_prefix(prefix.clone());
        }
        if let Some(ref suffix) = self.suffix {
            options = options.with_suffix(suffix.clone());
        }
        if let Some(format) = self.format {
            options = options.with_format(format.into());
        }
        Ok(options)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Export {
            input,
            naming,
            output,
            yes,
            preflight,
            resolution,
            quality,
            json,
        } => {
            let mut options = naming.options()?;
            if preflight {
                options = options.with_preflight(true);
            }
            if let Some(ppi) = resolution {
                options = options.with_resolution(ppi);
            }
            if let Some(q) = quality {
                options = options.with_jpeg_quality(q);
            }

            let pb = create_spinner("Parsing document...");
            let service = DocxExportService::open(&input);
            pb.finish_and_clear();
            let mut service = service?;

            let mut ui = TerminalInteraction::new(output, yes);
            let report = run_export(&mut service, &mut ui, &options);
            ui.finish();
            let report = report?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }

        Commands::Preview {
            input,
            naming,
            json,
        } => {
            let options = naming.options()?;
            let service = DocxExportService::open(&input)?;
            let plan = plan_export(&service, &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }

            println!(
                "{} {}",
                "Paragraph style:".bold(),
                plan.style.cyan()
            );
            println!("{}", "─".repeat(40));
            for page in &plan.pages {
                match page.filename {
                    Some(ref filename) => println!("{:>5}  {}", page.page, filename),
                    None => println!(
                        "{:>5}  {}",
                        page.page,
                        "(no styled text, skipped)".dimmed()
                    ),
                }
            }
        }

        Commands::Styles { input } => {
            let doc = stylesplit::parse_file(&input)?;
            if doc.styles.is_empty() {
                println!("{} No paragraph styles found in document", "!".yellow().bold());
                return Ok(());
            }

            let width = doc
                .styles
                .iter()
                .map(|s| UnicodeWidthStr::width(s.name.as_str()))
                .max()
                .unwrap_or(0);

            println!("{}", "Paragraph Styles".cyan().bold());
            println!("{}", "─".repeat(40));
            for style in &doc.styles {
                let pages = doc.pages_with_style(&style.name);
                let pages = if pages.is_empty() {
                    "unused".dimmed().to_string()
                } else {
                    format!(
                        "page {}",
                        pages
                            .iter()
                            .map(usize::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                };
                let pad = width - UnicodeWidthStr::width(style.name.as_str());
                println!("{}{}  {}", style.name.bold(), " ".repeat(pad), pages);
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing document...");

            let format = stylesplit::detect_format_from_path(&input)?;
            let doc = stylesplit::parse_file(&input)?;

            pb.finish_and_clear();

            println!("{}", "Document Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Format".bold(), format);
            println!("{}: {}", "Pages".bold(), doc.page_count());
            println!("{}: {}", "Paragraph styles".bold(), doc.styles.len());

            if let Some(ref title) = doc.metadata.title {
                println!("{}: {}", "Title".bold(), title);
            }
            if let Some(ref author) = doc.metadata.author {
                println!("{}: {}", "Author".bold(), author);
            }
            if let Some(ref created) = doc.metadata.created {
                println!("{}: {}", "Created".bold(), created);
            }
            if let Some(ref modified) = doc.metadata.modified {
                println!("{}: {}", "Modified".bold(), modified);
            }

            let paragraphs: usize = doc.pages.iter().map(|p| p.paragraphs.len()).sum();
            let words: usize = doc
                .pages
                .iter()
                .map(|p| p.plain_text().split_whitespace().count())
                .sum();
            println!("\n{}", "Content Statistics".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Paragraphs".bold(), paragraphs);
            println!("{}: {}", "Words".bold(), words);
        }

        Commands::Sanitize { text } => {
            if text.is_empty() {
                for line in io::stdin().lock().lines() {
                    println!("{}", sanitize(Some(line?.as_str())));
                }
            } else {
                for t in &text {
                    println!("{}", sanitize(Some(t.as_str())));
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_report(report: &ExportReport) {
    if report.cancelled {
        println!("{} Export cancelled", "!".yellow().bold());
        return;
    }

    for page in &report.exported {
        println!(
            "{} Page {}: {}",
            "✓".green().bold(),
            page.page,
            page.path.display()
        );
    }
    for page in &report.skipped {
        println!("{} Page {}: no styled text, skipped", "-".dimmed(), page);
    }
    for failure in &report.failed {
        println!(
            "{} Page {}: {}",
            "✗".red().bold(),
            failure.page,
            failure.reason
        );
    }

    let summary = format!(
        "Exported {} page(s) to {}",
        report.exported.len(),
        report.folder.display()
    );
    if report.is_complete() {
        println!("\n{}", summary.green().bold());
    } else {
        println!(
            "\n{} ({} skipped, {} failed)",
            summary.yellow().bold(),
            report.skipped.len(),
            report.failed.len()
        );
    }
}

fn print_version() {
    println!("{} {}", "stylesplit".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Export each document page as a file named from its styled text");
    println!();
    println!(
        "Output formats: {}",
        ExportFormat::ALL
            .iter()
            .map(|f| f.extension().to_uppercase())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Repository: https://github.com/iyulab/stylesplit");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

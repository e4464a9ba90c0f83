//! sectionrank CLI - PDF outline extraction and section ranking tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use sectionrank::pipeline::{self, collect_pdfs, document_name};
use sectionrank::rank::DEFAULT_MODEL_ID;
use sectionrank::render::{outline_to_json, to_json};
use sectionrank::{
    features, JsonFormat, MiniLmEmbedder, ModelBundle, PipelineOptions, Query, RankOptions,
    RankingReport,
};

#[derive(Parser)]
#[command(name = "sectionrank")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract PDF outlines and rank sections for a persona", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the title and heading outline of PDFs
    Outline {
        /// Input PDF file or directory of PDFs
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output directory (one JSON file per PDF)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Emit the hierarchical outline with paragraph text
        #[arg(long)]
        nested: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Directory holding the classifier artifacts
        #[arg(long, env = "SECTIONRANK_MODEL_DIR", default_value = "models")]
        models: PathBuf,

        /// Abort on the first unreadable PDF
        #[arg(long)]
        strict: bool,

        /// Process documents one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Rank the sections of a PDF collection for a persona and task
    Rank {
        /// Directory of input PDFs
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Who is reading
        #[arg(long)]
        persona: String,

        /// What the reader needs to get done
        #[arg(long)]
        job: String,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Number of sections to report
        #[arg(long, default_value = "10")]
        top_k: usize,

        /// Directory holding the classifier artifacts
        #[arg(long, env = "SECTIONRANK_MODEL_DIR", default_value = "models")]
        models: PathBuf,

        /// Embedding model directory or hub identifier
        #[arg(long, env = "SECTIONRANK_EMBEDDING_MODEL", default_value = DEFAULT_MODEL_ID)]
        embedding_model: String,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show span statistics of a PDF
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Write the classifier feature rows of a PDF as JSON
    Features {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Outline {
            input,
            output,
            nested,
            compact,
            models,
            strict,
            sequential,
        } => {
            let mut options = PipelineOptions::new()
                .with_nested(nested)
                .with_parallel(!sequential);
            if strict {
                options = options.strict();
            }
            cmd_outline(&input, output.as_deref(), &models, &options, json_format(compact))
        }
        Commands::Rank {
            input,
            persona,
            job,
            output,
            top_k,
            models,
            embedding_model,
            compact,
        } => cmd_rank(
            &input,
            Query::new(persona, job),
            output.as_deref(),
            &models,
            &embedding_model,
            &RankOptions::new().with_top_k(top_k),
            json_format(compact),
        ),
        Commands::Info { input } => cmd_info(&input),
        Commands::Features {
            input,
            output,
            compact,
        } => cmd_features(&input, output.as_deref(), json_format(compact)),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn spinner(message: &'static str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {elapsed} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message);
    Ok(pb)
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    models: &Path,
    options: &PipelineOptions,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let bundle = ModelBundle::load(models)?;
    log::debug!("{:?}", bundle);

    if input.is_file() {
        let doc = pipeline::process_file(input, &bundle, options)?;
        let json = outline_to_json(&doc.outline, options.nested, format)?;
        let target = output.map(|dir| dir.join(json_name(input)));
        return write_or_print(target.as_deref(), &json);
    }

    let pdfs = collect_pdfs(input)?;
    if pdfs.is_empty() {
        println!("{} {}", "No PDF files in".yellow(), input.display());
        return Ok(());
    }

    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("output"));
    fs::create_dir_all(&output_dir)?;

    let pb = spinner("Extracting outlines...")?;
    let outcome = pipeline::process_batch(&pdfs, &bundle, options)?;
    pb.finish_and_clear();

    for doc in &outcome.documents {
        let json = outline_to_json(&doc.outline, options.nested, format)?;
        let name = json_name(Path::new(&doc.name));
        fs::write(output_dir.join(&name), &json)?;
        println!(
            "{} {} {} {}",
            "Processed".green(),
            doc.name,
            "->".dimmed(),
            name
        );
    }
    report_failures(&outcome.failures);

    println!(
        "\n{} {} of {} documents",
        "Done!".green().bold(),
        outcome.documents.len(),
        pdfs.len()
    );
    Ok(())
}

fn cmd_rank(
    input: &Path,
    query: Query,
    output: Option<&Path>,
    models: &Path,
    embedding_model: &str,
    rank_options: &RankOptions,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let pdfs = collect_pdfs(input)?;
    eprintln!("{} {} input PDFs...", "Processing".cyan(), pdfs.len());

    let bundle = ModelBundle::load(models)?;

    // Nothing to embed: skip loading the embedding model.
    let report = if pdfs.is_empty() {
        RankingReport::build(&[], &query, rank_options)
    } else {
        let pb = spinner("Loading embedding model...")?;
        let embedder = MiniLmEmbedder::open(embedding_model)?;
        log::debug!("Embedding model loaded from {}", embedding_model);

        pb.set_message("Extracting and ranking sections...");
        let outcome = pipeline::rank_documents(
            &pdfs,
            &bundle,
            &query,
            &embedder,
            &PipelineOptions::default(),
            rank_options,
        )?;
        pb.finish_and_clear();

        report_failures(&outcome.failures);
        outcome.report
    };

    // stdout carries only the report; status goes to stderr.
    let json = to_json(&report, format)?;
    write_or_print(output, &json)?;
    eprintln!(
        "{} {} sections reported",
        "Done!".green().bold(),
        report.extracted_sections.len()
    );
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = sectionrank::LopdfSource::open(input)?;
    let spans = sectionrank::extract_spans(&source)?;
    let common = features::modal_font_size(&spans);

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), source.version());
    println!(
        "{}: {}",
        "Pages".bold(),
        sectionrank::LayoutSource::page_count(&source)
    );

    println!();
    println!("{}", "Span Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let bold = spans.iter().filter(|s| s.bold).count();
    let larger = spans
        .iter()
        .filter(|s| s.size.is_some_and(|size| size > common))
        .count();
    let numbered = spans.iter().filter(|s| s.numeric_prefix).count();
    let bulleted = spans.iter().filter(|s| s.bulleted).count();

    println!("{}: {}", "Spans".bold(), spans.len());
    println!("{}: {:.1}pt", "Common font size".bold(), common);
    println!("{}: {}", "Bold spans".bold(), bold);
    println!("{}: {}", "Larger than common".bold(), larger);
    println!("{}: {}", "Numbered".bold(), numbered);
    println!("{}: {}", "Bulleted".bold(), bulleted);

    Ok(())
}

fn cmd_features(
    input: &Path,
    output: Option<&Path>,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = sectionrank::feature_rows_from_file(input)?;
    let json = to_json(&rows, format)?;
    write_or_print(output, &json)
}

fn report_failures(failures: &[sectionrank::DocumentFailure]) {
    for failure in failures {
        eprintln!(
            "{} {}: {}",
            "Skipped".yellow(),
            failure.document,
            failure.error
        );
    }
}

fn json_name(pdf: &Path) -> String {
    let name = document_name(pdf);
    let stem = Path::new(&name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(name);
    format!("{}.json", stem)
}

fn cmd_version() {
    println!("{} {}", "sectionrank".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF outline extraction and section ranking tool");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_name() {
        assert_eq!(json_name(Path::new("/in/report.pdf")), "report.json");
        assert_eq!(json_name(Path::new("a.b.pdf")), "a.b.json");
    }

    #[test]
    fn test_cli_parses_rank() {
        let cli = Cli::try_parse_from([
            "sectionrank",
            "rank",
            "pdfs",
            "--persona",
            "Analyst",
            "--job",
            "Summarize",
            "--top-k",
            "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Rank { top_k, persona, .. } => {
                assert_eq!(top_k, 5);
                assert_eq!(persona, "Analyst");
            }
            _ => panic!("expected rank"),
        }
    }

    #[test]
    fn test_write_or_print_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("x.json");
        write_or_print(Some(&path), "{}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{}");
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use formtok::core::doc_type::detect_from_fields;
use formtok::pipeline::{export_stream, Pipeline};
use formtok::{Error, LabelKeywordSpec, PipelineConfig, RawOcrDocument};

#[derive(Parser, Debug)]
#[command(name = "formtok")]
#[command(version, about = "Reading-ordered form tokens from OCR detections", long_about = None)]
struct Cli {
    /// Log pipeline stages at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract and merge the page token stream
    Tokens {
        /// OCR result JSON
        input: PathBuf,

        /// Output directory (default: ./<input_name>_tokens)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pipeline tunables (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Build the editable template for a recognized form
    Template {
        /// OCR result JSON
        input: PathBuf,

        /// Label keyword spec JSON
        #[arg(short, long)]
        keywords: PathBuf,

        /// Output directory (default: ./<input_name>_template)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pipeline tunables (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the document type detected from raw OCR fields
    Detect {
        /// OCR result JSON
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Tokens {
            input,
            output,
            config,
        } => run_tokens(input, output, config),
        Commands::Template {
            input,
            keywords,
            output,
            config,
        } => run_template(input, keywords, output, config),
        Commands::Detect { input } => run_detect(input),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_document(input: &Path) -> Result<RawOcrDocument> {
    if !input.is_file() {
        anyhow::bail!("Input is not a file: {}", input.display());
    }
    let data = fs::read_to_string(input)
        .with_context(|| format!("Failed to read OCR result: {}", input.display()))?;
    RawOcrDocument::from_json(&data)
        .with_context(|| format!("Failed to parse OCR result: {}", input.display()))
}

fn load_config(path: Option<PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_toml_file(&path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    PathBuf::from(format!("{stem}_{suffix}"))
}

fn run_tokens(input: PathBuf, output: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let document = load_document(&input)?;
    let pipeline = Pipeline::new(load_config(config)?);
    let output_dir = output.unwrap_or_else(|| default_output(&input, "tokens"));

    let tokens = pipeline
        .build_tokens(&document)
        .with_context(|| format!("Failed to build tokens: {}", input.display()))?;
    export_stream(&tokens, &output_dir, "tokens", pipeline.config())
        .with_context(|| format!("Failed to export to: {}", output_dir.display()))?;

    println!("{} tokens -> {}", tokens.len(), output_dir.display());
    Ok(())
}

fn run_template(
    input: PathBuf,
    keywords: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let document = load_document(&input)?;
    let spec = LabelKeywordSpec::from_file(&keywords)
        .with_context(|| format!("Failed to load keyword spec: {}", keywords.display()))?;
    let pipeline = Pipeline::new(load_config(config)?);
    let output_dir = output.unwrap_or_else(|| default_output(&input, "template"));

    let template = pipeline
        .build_template(&document, &spec)
        .with_context(|| format!("Failed to build template: {}", input.display()))?;
    export_stream(&template.stream, &output_dir, "template", pipeline.config())
        .with_context(|| format!("Failed to export to: {}", output_dir.display()))?;

    println!(
        "{}: {} tokens -> {}",
        template.doc_type,
        template.stream.len(),
        output_dir.display()
    );
    Ok(())
}

fn run_detect(input: PathBuf) -> Result<()> {
    let document = load_document(&input)?;
    let page = document.page()?;
    let doc_type = detect_from_fields(&page).ok_or(Error::UnrecognizedDocument)?;
    println!("{doc_type}");
    Ok(())
}

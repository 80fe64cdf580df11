use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gqa_ai::corpus::{CorpusStore, IndexStore};
use gqa_ai::embeddings::ollama_embed::OllamaEmbedder;
use gqa_ai::grade::LlmGroundingGrader;
use gqa_ai::llm::ollama_llm::OllamaLlm;
use gqa_ai::ollama::OllamaClient;
use gqa_ai::pipeline::Pipeline;
use gqa_ai::retrieve::{VectorIndexSource, WebSearchSource};
use gqa_ai::synthesize::LlmSynthesizer;
use gqa_core::config::PipelineConfig;
use gqa_core::domain::Outcome;
use gqa_core::error::QaError;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "groundedqa", about = "Adaptive retrieval question answering")]
struct Cli {
    /// JSON pipeline config; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ingest the corpus file into the passage store.
    Ingest {
        /// Corpus file; overrides corpus_path from the config.
        #[arg(long)]
        corpus: Option<PathBuf>,
    },
    /// Build the embedding index over the ingested passages.
    Index,
    /// Check that the Ollama backend is reachable.
    Health,
    /// Answer a single question.
    Ask {
        question: String,
        /// Also print the run report (route, verdicts, fallback) as JSON.
        #[arg(long)]
        show_report: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(details) = e.details.as_deref() {
                eprintln!("  {details}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), QaError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Ingest { corpus } => {
            let corpus_path = corpus
                .or_else(|| config.corpus_path.as_ref().map(PathBuf::from))
                .ok_or_else(|| {
                    QaError::new(
                        "CONFIG_INVALID",
                        "No corpus file given; pass --corpus or set corpus_path",
                    )
                })?;
            let store = CorpusStore::open(PathBuf::from(&config.data_dir));
            let manifest = store.ingest_file(&corpus_path, &now_rfc3339_utc()?)?;
            println!(
                "ingested {} passages from {}",
                manifest.passage_count, manifest.source
            );
        }
        Command::Index => {
            let root = PathBuf::from(&config.data_dir);
            let corpus = CorpusStore::open(root.clone());
            let index = IndexStore::open(root);
            let client = OllamaClient::new(&config.ollama_base_url)?;
            let embedder = OllamaEmbedder::new(client);
            let status = index.build(
                &corpus,
                &embedder,
                &config.embedding_model_id,
                &now_rfc3339_utc()?,
            )?;
            println!(
                "indexed {} passages (model {}, dims {})",
                status.passage_count,
                status.model.as_deref().unwrap_or("?"),
                status.dims.unwrap_or(0)
            );
        }
        Command::Health => {
            OllamaClient::new(&config.ollama_base_url)?.health_check()?;
            println!("ok");
        }
        Command::Ask {
            question,
            show_report,
        } => {
            let pipeline = build_pipeline(&config)?;
            let run = pipeline.answer(&question)?;
            info!(
                route = run.report.route.as_str(),
                fallback_used = run.report.fallback_used,
                low_confidence = run.report.low_confidence,
                retrievals = run.report.retrievals,
                "run complete"
            );
            println!("{}", run.outcome.final_text());
            if let Outcome::Answered { answer } = &run.outcome {
                if !answer.cited_passage_ids.is_empty() {
                    println!("\nsources: {}", answer.cited_passage_ids.join(", "));
                }
            }
            if show_report {
                let report = serde_json::to_string_pretty(&run.report).map_err(|e| {
                    QaError::new("PIPELINE_REPORT_FAILED", "Failed to encode run report")
                        .with_details(e.to_string())
                })?;
                println!("\n{report}");
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, QaError> {
    match path {
        Some(p) => {
            let raw = fs::read_to_string(p).map_err(|e| {
                QaError::new("CONFIG_READ_FAILED", "Failed to read config file")
                    .with_details(format!("path={}; err={}", p.display(), e))
            })?;
            PipelineConfig::from_json_str(&raw)
        }
        None => {
            let config = PipelineConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn build_pipeline(config: &PipelineConfig) -> Result<Pipeline, QaError> {
    let root = PathBuf::from(&config.data_dir);
    let client = OllamaClient::new(&config.ollama_base_url)?;

    let vector_source = VectorIndexSource::new(
        CorpusStore::open(root.clone()),
        IndexStore::open(root),
        Box::new(OllamaEmbedder::new(client.clone())),
        config.embedding_model_id.clone(),
        config.top_k_web_results,
    );
    let web_source = WebSearchSource::new(
        config.search_endpoint.clone(),
        config.search_api_key.clone(),
        config.top_k_web_results,
    );

    let llm = OllamaLlm::new(client, config.temperature, config.max_tokens);
    let synthesizer = LlmSynthesizer::new(Box::new(llm.clone()), config.model_id.clone());
    let grounding = LlmGroundingGrader::new(Box::new(llm), config.model_id.clone());

    Pipeline::new(
        config.clone(),
        Box::new(vector_source),
        Box::new(web_source),
        Box::new(synthesizer),
        Box::new(grounding),
    )
}

fn now_rfc3339_utc() -> Result<String, QaError> {
    OffsetDateTime::now_utc().format(&Rfc3339).map_err(|e| {
        QaError::new("PIPELINE_TIME_FAILED", "Failed to format current time")
            .with_details(e.to_string())
    })
}

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use brand_classifier::{
    batch, BedrockClient, ClassificationPipeline, OllamaBackend, RecordService, Settings,
};
use clap::{Parser, Subcommand};
use log::info;

#[derive(Parser)]
#[command(author, version, about = "Agentic brand classifier", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Classify queries from a file (one per line) or a single query typed on stdin
    Batch(BatchArgs),
    /// Classify one JSON record with the hosted model
    Record(RecordArgs),
}

#[derive(clap::Args, Default)]
struct BatchArgs {
    /// Text file with one query per non-empty line [default: $ABC_INPUT_FILE]
    #[arg(short, long)]
    input_file: Option<PathBuf>,
    /// Directory the results CSV is written to [default: $ABC_OUTPUT_DIR or output]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Ollama model name [default: $DSPY_MODEL_NAME or phi3]
    #[arg(short, long)]
    model: Option<String>,
    /// Ollama server URL [default: $OLLAMA_BASE_URL]
    #[arg(long)]
    ollama_url: Option<String>,
    /// Confidence below which a clarification is requested
    #[arg(long)]
    threshold: Option<f64>,
    /// Never generate clarifying questions
    #[arg(long)]
    no_clarification: bool,
}

#[derive(clap::Args)]
struct RecordArgs {
    /// Request body, e.g. '{"record": {"description": "Organic almond butter 500g"}}'
    #[arg(long)]
    json: String,
    /// Record field to classify [default: $CSV_TEXT_COLUMN or description]
    #[arg(long)]
    text_column: Option<String>,
    /// Bedrock model id [default: $BEDROCK_MODEL_ID]
    #[arg(long)]
    model_id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    brand_classifier::init_logger();
    let args = Args::parse();
    let settings = Settings::from_env();

    match args.command {
        Some(Command::Record(record_args)) => run_record(settings, record_args).await,
        Some(Command::Batch(batch_args)) => run_batch(settings, batch_args).await,
        None => run_batch(settings, BatchArgs::default()).await,
    }
}

impl BatchArgs {
    /// Overrides the environment settings with the flags given on the command line.
    fn apply(self, settings: &mut Settings) {
        if let Some(path) = self.input_file.filter(|path| !path.as_os_str().is_empty()) {
            settings.input_file = Some(path);
        }
        if let Some(dir) = self.output_dir {
            settings.output_dir = dir;
        }
        if let Some(model) = self.model {
            settings.model_name = model;
        }
        if let Some(url) = self.ollama_url {
            settings.ollama_url = url;
        }
        if let Some(threshold) = self.threshold {
            settings.pipeline.low_confidence_threshold = threshold;
        }
        if self.no_clarification {
            settings.pipeline.clarification_enabled = false;
        }
    }
}

async fn run_batch(mut settings: Settings, args: BatchArgs) -> anyhow::Result<()> {
    args.apply(&mut settings);

    let queries = match &settings.input_file {
        Some(path) => {
            if !path.exists() {
                bail!("Input file not found: {}", path.display());
            }
            batch::load_queries_from_file(path)?
        }
        None => match read_interactive_query()? {
            Some(query) => vec![query],
            None => {
                println!("Empty query. Exiting.");
                return Ok(());
            }
        },
    };

    let backend = OllamaBackend::with_base_url(&settings.model_name, &settings.ollama_url);
    let pipeline = ClassificationPipeline::builder()
        .with_capability(Arc::new(backend))
        .with_config(settings.pipeline.clone())
        .build()?;

    println!("Classifying {} query(ies) with agentic pipeline...", queries.len());
    let start_time = Instant::now();
    let results = pipeline.classify_queries(queries.as_slice()).await
        .context("Classification aborted, no results written")?;
    info!("Classified {} queries in {:.2?}", results.len(), start_time.elapsed());

    let csv_path = batch::write_results_csv(&settings.output_dir, &results, &chrono::Local::now())?;
    println!("Done. Results written to: {}", csv_path.display());

    println!("\nSample results:");
    for result in results.iter().take(5) {
        println!("---------------------------------------------------");
        println!("{}", batch::summarize(result));
    }

    Ok(())
}

fn read_interactive_query() -> anyhow::Result<Option<String>> {
    println!("No ABC_INPUT_FILE set, please type a single query:");
    print!("> ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let query = line.trim();
    Ok((!query.is_empty()).then(|| query.to_string()))
}

async fn run_record(settings: Settings, args: RecordArgs) -> anyhow::Result<()> {
    let payload: serde_json::Value = serde_json::from_str(&args.json)
        .context("Request body is not valid JSON")?;

    let model_id = args.model_id.unwrap_or(settings.bedrock_model_id);
    let mut client = BedrockClient::new(&settings.aws_region, model_id);
    if let Some(key) = settings.bedrock_api_key {
        client = client.with_api_key(key);
    }
    let service = RecordService::new(Arc::new(client))
        .with_text_column(args.text_column.unwrap_or(settings.text_column));

    let response = service.handle_request(&payload).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

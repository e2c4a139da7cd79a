use anyhow::Result;
use clap::Parser;
use sentiment_shim::{InferenceService, LoadOptions, ModelHandle, JSON_CONTENT_TYPE};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "sentiment-shim")]
#[command(about = "Serve sentiment predictions over stdin/stdout, one request per line", long_about = None)]
struct Cli {
    /// Model directory (config.json, model.safetensors, tokenizer/)
    #[arg(short, long, env = "MODEL_PATH")]
    model_dir: PathBuf,

    /// Content type of each request line
    #[arg(short, long, default_value = JSON_CONTENT_TYPE)]
    content_type: String,

    /// Requested response content type
    #[arg(short, long, default_value = JSON_CONTENT_TYPE)]
    accept: String,

    /// Token limit before truncation
    #[arg(long, default_value_t = sentiment_shim::DEFAULT_MAX_LENGTH)]
    max_length: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = LoadOptions::default().with_max_length(cli.max_length);
    let handle = ModelHandle::load(&cli.model_dir, &options)?;
    let service = InferenceService::new(handle);
    info!("ready for requests on stdin");

    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    let mut line = Vec::new();
    loop {
        line.clear();
        if stdin.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        let body = trim_line_ending(&line);
        if body.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        // bodies are bytes; decoding (UTF-8 included) is the service's job
        let response = match service.invoke(body, &cli.content_type, &cli.accept) {
            Ok(body) => body,
            Err(e) => {
                error!("request failed: {}", e);
                serde_json::json!({ "error": e.to_string() }).to_string()
            }
        };
        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("sentiment_shim=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sentiment_shim=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

use clap::Parser;
use exam_pulse_client::upload::{FileStatus, UploadStatus};
use exam_pulse_client::utils::file_size::FileSizeUtils;
use exam_pulse_client::utils::selection::CandidateSelector;
use exam_pulse_client::{ClientConfig, UploadSession};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "exam-pulse")]
#[command(version, about = "Upload past exam papers and request an analysis", long_about = None)]
struct Cli {
    /// Exam papers or folders containing them (PDF, PNG, JPG)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Service base URL, overrides EXAM_PULSE_API_URL
    #[arg(long)]
    base_url: Option<String>,

    /// Request an analysis of every uploaded paper
    #[arg(long)]
    analyze: bool,

    /// Analysis timeout in seconds
    #[arg(long)]
    analysis_timeout: Option<u64>,

    /// Print the analysis result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(secs) = cli.analysis_timeout {
        config = config.with_analysis_timeout(Duration::from_secs(secs));
    }

    let files = CandidateSelector::default().collect(&cli.paths);
    if files.is_empty() {
        eprintln!("No PDF or image files found");
        return 1;
    }
    for file in &files {
        println!("📄 {} ({})", file.name, FileSizeUtils::format_size(file.size_bytes));
    }

    let (status_tx, mut status_rx) = mpsc::unbounded_channel::<FileStatus>();
    let printer = tokio::spawn(async move {
        while let Some(event) = status_rx.recv().await {
            match event.status {
                UploadStatus::Queued => println!("⏳ {} queued", event.name),
                UploadStatus::Uploading(percent) => println!("   {} {}%", event.name, percent),
                UploadStatus::Success => println!("✅ {} uploaded", event.name),
                UploadStatus::Error(msg) => println!("❌ {}: {}", event.name, msg),
                UploadStatus::Rejected(msg) => println!("⏩ {}: {}", event.name, msg),
            }
        }
    });

    let mut session = match UploadSession::connect(config) {
        Ok(session) => session.with_status_sender(status_tx),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let batch = session.upload_batch(files).await.clone();
    println!("\n{}", batch.message);

    if !cli.analyze {
        drop(session);
        let _ = printer.await;
        return if batch.success { 0 } else { 1 };
    }

    if !session.can_analyze() {
        eprintln!("Nothing to analyze");
        return 1;
    }

    println!("{}", session.status_text());
    let outcome = session.analyze().await;
    drop(session);
    let _ = printer.await;

    match outcome {
        Ok(result) if cli.json => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Ok(result) => {
            println!("\n📊 {} question(s) found", result.total_questions);
            for topic in result.topic_frequencies.topics() {
                println!("  • {}", topic);
            }
            0
        }
        Err(e) => {
            eprintln!("\n⚠️ {}", e);
            1
        }
    }
}

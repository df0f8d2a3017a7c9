//! ORION CLI
//!
//! Offensive Recon Intelligence Engine: discovers, scores and explains the
//! assets of a target domain.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use orion_agents::{create_backend, AiAssistant, BackendConfig, Persona, Provider, SharedBackend};
use orion_core::OrionConfig;
use orion_recon::{tool_available, ReconConfig};
use orion_runtime::{render_console, write_html_report, write_json_report, Pipeline, PipelineConfig};

const BANNER: &str = r#"
    █▀█ █▀█ █ █▀█ █▄░█
    █▄█ █▀▄ █ █▄█ █░▀█  Offensive Recon Intelligence Engine
"#;

#[derive(Parser)]
#[command(name = "orion")]
#[command(author, version, about = "ORION: Offensive Recon Intelligence Engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (0-3)
    #[arg(short, long, default_value = "1", global = true)]
    log_level: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover, score and report on a target domain
    Scan(ScanArgs),

    /// Check that the discovery tools are installed
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Groq,
    Openai,
    Openrouter,
    Anthropic,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Groq => Provider::Groq,
            ProviderArg::Openai => Provider::OpenAI,
            ProviderArg::Openrouter => Provider::OpenRouter,
            ProviderArg::Anthropic => Provider::Anthropic,
        }
    }
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Target domain
    target: String,

    /// Saved httpx JSON output (skips discovery)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Show AI insights, score reasons, hypotheses and posture
    #[arg(short, long)]
    verbose: bool,

    /// Scoring and rule configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the HTML report
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Also write the full report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Skip the HTML report
    #[arg(long)]
    no_html: bool,

    /// Where discovery writes httpx results
    #[arg(long, default_value = "results.json")]
    results: PathBuf,

    /// Discovery deadline in seconds
    #[arg(long, default_value = "900")]
    timeout: u64,

    /// Language model provider for asset insights
    #[arg(long, value_enum, default_value = "groq")]
    provider: ProviderArg,

    /// Model name (defaults to the provider's default)
    #[arg(short, long)]
    model: Option<String>,

    /// Custom assistant persona (TOML)
    #[arg(long)]
    persona: Option<PathBuf>,

    /// OpenAI-compatible endpoint override (local model servers)
    #[arg(long, env = "ORION_AI_BASE_URL")]
    base_url: Option<String>,

    /// Groq API key (or set GROQ_API_KEY / ORION_AI_KEY env var)
    #[arg(long, env = "GROQ_API_KEY")]
    groq_key: Option<String>,

    /// OpenAI API key (or set OPENAI_API_KEY env var)
    #[arg(long, env = "OPENAI_API_KEY")]
    api_key: Option<String>,

    /// OpenRouter API key (or set OPENROUTER_API_KEY env var)
    #[arg(long, env = "OPENROUTER_API_KEY")]
    openrouter_key: Option<String>,

    /// Anthropic API key (or set ANTHROPIC_API_KEY env var)
    #[arg(long, env = "ANTHROPIC_API_KEY")]
    anthropic_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = match cli.log_level {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    println!("{}", BANNER.cyan());

    match cli.command {
        Commands::Scan(args) => {
            tokio::select! {
                result = run_scan(args) => result?,
                _ = tokio::signal::ctrl_c() => {
                    println!("\n[!] Operation cancelled by user.");
                }
            }
        }
        Commands::Status => check_status().await,
    }

    Ok(())
}

fn build_backend(args: &ScanArgs, persona: &Persona) -> Result<Option<SharedBackend>> {
    let provider = Provider::from(args.provider);
    let key = match provider {
        Provider::Groq => args
            .groq_key
            .clone()
            .or_else(|| std::env::var("ORION_AI_KEY").ok()),
        Provider::OpenAI => args.api_key.clone(),
        Provider::OpenRouter => args.openrouter_key.clone(),
        Provider::Anthropic => args.anthropic_key.clone(),
    };

    let Some(key) = key.filter(|k| !k.trim().is_empty()) else {
        warn!(
            "No {} API key (set {}); AI insights disabled",
            provider,
            provider.key_env()
        );
        return Ok(None);
    };

    let mut config = persona.apply_sampling(BackendConfig::new(provider, &key));
    if let Some(model) = &args.model {
        config = config.with_model(model);
    }
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url);
    }
    Ok(Some(create_backend(config)?))
}

async fn run_scan(args: ScanArgs) -> Result<()> {
    let orion_config = match &args.config {
        Some(path) => OrionConfig::load(path)?,
        None => OrionConfig::embedded()?,
    };

    let persona = match &args.persona {
        Some(path) => Persona::load(path)?,
        None => Persona::asset_explainer()?,
    };
    let backend = build_backend(&args, &persona)?;
    let assistant = AiAssistant::with_persona(backend, persona);

    let mut config = PipelineConfig::new(&args.target, orion_config);
    config.recon = ReconConfig {
        output_file: args.results.clone(),
        timeout_secs: args.timeout,
        ..ReconConfig::default()
    };
    if let Some(file) = &args.file {
        config = config.with_results_file(file.clone());
    }

    let pipeline = Pipeline::new(config, assistant)?;
    let report = pipeline.run().await?;

    if report.assets.is_empty() {
        println!("[!] No assets discovered. Try a different target.");
        return Ok(());
    }

    print!("{}", render_console(&report, args.verbose));

    if !args.no_html {
        let path = write_html_report(&report, &args.output_dir).await?;
        println!("[+] Report generated: {}", path.display());
    }
    if let Some(json_path) = &args.json {
        write_json_report(&report, json_path).await?;
        println!("[+] JSON report written: {}", json_path.display());
    }

    Ok(())
}

async fn check_status() {
    let recon = ReconConfig::default();

    for binary in [&recon.subfinder_bin, &recon.httpx_bin] {
        if tool_available(binary).await {
            println!("{} {} found", "[+]".green(), binary);
        } else {
            println!("{} {} not found on PATH", "[!]".red(), binary);
        }
    }
    println!("\n   Install with:");
    println!("   go install -v github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest");
    println!("   go install -v github.com/projectdiscovery/httpx/cmd/httpx@latest");
}

use clap::{Parser, Subcommand};
use serde_json::Value;

use comfyui_gateway::comfyui::outputs::find_artifact;
use comfyui_gateway::comfyui::poller::poll_until_complete;
use comfyui_gateway::storage::ArtifactResolver;
use comfyui_gateway::{ComfyClient, Config, GenerationMode, PollConfig, WorkflowTemplate};

#[derive(Parser, Debug)]
#[command(name = "genctl", about = "CLI for the ComfyUI generation gateway", version)]
struct Cli {
    /// Override COMFYUI_URL
    #[arg(global = true, long)]
    comfyui_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill a workflow template and queue it with ComfyUI
    Generate {
        /// Path to a workflow JSON carrying the placeholder tokens
        #[arg(long, value_name = "PATH")]
        file: String,
        /// Prompt text (quotes and newlines are sanitized away)
        #[arg(long, value_name = "TEXT")]
        prompt: String,
        /// Generation mode: text2image or image2video
        #[arg(long, default_value = "text2image")]
        mode: String,
        /// Source image file name in the bucket (image2video only)
        #[arg(long, value_name = "NAME")]
        source_file: Option<String>,
        /// Seed; random when omitted
        #[arg(long)]
        seed: Option<u32>,
        /// Poll until the artifact is ready and print its URL
        #[arg(long)]
        wait: bool,
        /// Verbose: print the filled workflow before sending
        #[arg(short, long)]
        verbose: bool,
    },
    /// Check (or watch) the history for a queued prompt
    History {
        /// Prompt ID reported by `generate`
        prompt_id: String,
        /// Generation mode: text2image or image2video
        #[arg(long, default_value = "text2image")]
        mode: String,
        /// Keep polling until the artifact is ready
        #[arg(long)]
        watch: bool,
        /// Pretty-print the raw history entry instead of extracting
        #[arg(long)]
        pretty: bool,
    },
}

fn parse_mode(s: &str) -> GenerationMode {
    match s {
        "image2video" => GenerationMode::Image2Video,
        "text2image" => GenerationMode::Text2Image,
        other => {
            eprintln!("Unknown mode '{}', expected text2image or image2video", other);
            std::process::exit(2);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load env and parse CLI
    Config::dotenv_load();
    let cli = Cli::parse();

    let mut conf = Config::new().expect("Failed to load config");
    if let Some(url) = cli.comfyui_url {
        conf.comfyui_url = url;
    }
    let client = ComfyClient::new(conf.comfyui_url.clone());
    let resolver = ArtifactResolver::new(&conf.storage_base_url, &conf.source_image_prefix);
    let poll_config = PollConfig::new(conf.poll_interval, conf.poll_timeout);

    match cli.command {
        Commands::Generate { file, prompt, mode, source_file, seed, wait, verbose } => {
            let mode = parse_mode(&mode);
            if mode == GenerationMode::Image2Video && source_file.is_none() {
                eprintln!("--source-file is required for image2video");
                std::process::exit(2);
            }

            let data = tokio::fs::read_to_string(&file).await?;
            let template: Value = serde_json::from_str(&data)?;

            let image_url = source_file.map(|f| resolver.source_image_url(&f));
            let seed = seed.unwrap_or_else(|| rand::random::<u32>() % 1_000_000);
            let workflow =
                WorkflowTemplate::new(template).fill(&prompt, seed, image_url.as_deref())?;

            if verbose {
                eprintln!("[verbose] Filled workflow:\n{}", serde_json::to_string_pretty(&workflow)?);
            }

            let prompt_id = match client.queue_prompt(workflow).await {
                Ok(id) => id,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            println!("prompt_id: {}", prompt_id);

            if wait {
                let path = poll_until_complete(&client, &prompt_id, mode, poll_config).await?;
                match mode {
                    GenerationMode::Image2Video => println!("{}", resolver.artifact_url(&path)),
                    GenerationMode::Text2Image => println!("{}", path),
                }
            }
            Ok(())
        }
        Commands::History { prompt_id, mode, watch, pretty } => {
            let mode = parse_mode(&mode);
            if watch {
                let path = poll_until_complete(&client, &prompt_id, mode, poll_config).await?;
                println!("{}", path);
                return Ok(());
            }
            match client.history(&prompt_id).await {
                Ok(Some(entry)) => {
                    if pretty {
                        println!("{}", serde_json::to_string_pretty(&entry)?);
                    } else {
                        match find_artifact(&entry, mode) {
                            Some(name) => println!("{}", name),
                            None => println!("pending"),
                        }
                    }
                    Ok(())
                }
                Ok(None) => {
                    println!("pending");
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use photomark::{
    Config,
    export::{ItemOutcome, OutputFormat},
    startup_checks,
    store::TemplateStore,
    studio::Studio,
    watermark::Anchor,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "photomark.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watermark images and folders into the output directory
    Export {
        /// Image files or folders (folders are searched recursively)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Apply a saved template first
        #[arg(short, long)]
        template: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// png or jpeg
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// JPEG quality (1-100)
        #[arg(short, long)]
        quality: Option<u8>,

        /// Replace the watermark text
        #[arg(long)]
        text: Option<String>,

        /// Move the watermark to an anchor, e.g. bottom-right
        #[arg(long)]
        anchor: Option<Anchor>,
    },

    /// Render what the preview would show for one image
    Preview {
        input: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,
    },

    /// Manage saved templates
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Verify storage and font setup
    Check,
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    /// List template names
    List,
    /// Print a template as JSON
    Show { name: String },
    /// Save the current settings as a template
    Save { name: String },
    /// Delete a template
    Delete { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Export {
            inputs,
            template,
            output,
            format,
            quality,
            text,
            anchor,
        } => {
            let overrides = ExportOverrides {
                template,
                output,
                format,
                quality,
                text,
                anchor,
            };
            run_export(&config, inputs, overrides).await
        }
        Commands::Preview {
            input,
            out,
            width,
            height,
        } => run_preview(&config, &input, &out, width, height),
        Commands::Template(cmd) => handle_template_command(&config, cmd),
        Commands::Check => run_checks(&config).await,
    }
}

fn load_config(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = if config_path.exists() {
        let config_content = std::fs::read_to_string(config_path)?;
        let config = toml_edit::de::from_str::<Config>(&config_content)?;
        info!("Configuration loaded from: {:?}", config_path);
        config
    } else {
        info!("Config file not found at {:?}, using defaults", config_path);
        Config::default()
    };
    info!("Storage directory: {:?}", config.storage_directory());
    Ok(config)
}

struct ExportOverrides {
    template: Option<String>,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    quality: Option<u8>,
    text: Option<String>,
    anchor: Option<Anchor>,
}

async fn run_export(
    config: &Config,
    inputs: Vec<PathBuf>,
    overrides: ExportOverrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut studio = Studio::new(config);

    if let Some(name) = &overrides.template {
        studio.load_template(name)?;
    }

    let mut export = studio.export_settings().clone();
    if let Some(output) = overrides.output {
        export.output_dir = Some(output);
    }
    if let Some(format) = overrides.format {
        export.output_format = format;
    }
    if let Some(quality) = overrides.quality {
        export.jpeg_quality = quality;
    }
    studio.set_export(export);

    if let Some(text) = overrides.text {
        let mut watermark = studio.watermark().clone();
        watermark.text.text = text;
        studio.update_watermark(watermark);
    }
    if let Some(anchor) = overrides.anchor {
        studio.select_anchor(anchor);
    }

    let added = studio.add_dropped(&inputs);
    if added.is_empty() {
        println!("No supported images found");
        return Ok(());
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let signal_flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current image");
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let exporter = studio.exporter().with_cancel_flag(cancel);
    let items = studio.collection().items().to_vec();
    let report = tokio::task::spawn_blocking(move || {
        exporter.run_with_progress(&items, |progress| match progress.outcome {
            ItemOutcome::Written(path) => {
                println!("[{}/{}] {}", progress.index, progress.total, path.display())
            }
            ItemOutcome::Skipped => println!(
                "[{}/{}] skipped {}",
                progress.index,
                progress.total,
                progress.source.display()
            ),
        })
    })
    .await??;

    println!(
        "Exported {} of {} images{}",
        report.success_count(),
        added.len(),
        if report.cancelled { " (cancelled)" } else { "" }
    );

    studio.close()?;
    Ok(())
}

fn run_preview(
    config: &Config,
    input: &Path,
    out: &Path,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut studio = Studio::new(config);
    if let (Some(width), Some(height)) = (width, height) {
        studio.resize_viewport(width, height);
    }

    studio.add_paths([input]);
    if studio.selected().is_none() {
        eprintln!("Error: cannot open {}", input.display());
        std::process::exit(1);
    }

    studio.preview().render_frame().save(out)?;
    println!("Preview written to {}", out.display());
    Ok(())
}

fn handle_template_command(
    config: &Config,
    cmd: TemplateCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        TemplateCommands::List => {
            let templates = TemplateStore::in_storage(&config.storage_directory()).list()?;
            if templates.is_empty() {
                println!("No templates saved");
            } else {
                for name in templates {
                    println!("  {}", name);
                }
            }
        }
        TemplateCommands::Show { name } => {
            let snapshot = TemplateStore::in_storage(&config.storage_directory()).load(&name)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        TemplateCommands::Save { name } => {
            let studio = Studio::new(config);
            let path = studio.save_template(&name)?;
            println!("Saved template '{}' to {}", name, path.display());
        }
        TemplateCommands::Delete { name } => {
            let studio = Studio::new(config);
            studio.delete_template(&name)?;
            println!("Deleted template '{}'", name);
        }
    }
    Ok(())
}

async fn run_checks(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match startup_checks::perform_startup_checks(config).await {
        Ok(()) => println!("All startup checks passed"),
        Err(errors) => {
            for error in &errors {
                println!("Startup check failed: {}", error);
            }
        }
    }
    Ok(())
}

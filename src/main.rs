use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use shademate::catalog::{CatalogSource, CatalogStore};
use shademate::intake::Gender;
use shademate::share::{ShareContent, ShareError, SharePlatform};
use shademate::upload::{PhotoFile, UploadError, UploadPipeline};
use shademate::workflow::{
    FlowController, FlowPresenter, PhaseTimings, ResultNavigator, WorkflowPhase,
};
use shademate::ShademateConfig;

#[derive(Parser)]
#[command(name = "shademate")]
#[command(about = "Face-shape based sunglasses recommendation demo")]
#[command(long_about = "Shademate walks through the guided intake flow: pick a gender and age, \
                       validate a face photo against the remote classifier, sit through the \
                       analysis sequence, and get a product recommendation from the catalog.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the guided flow end to end and print the recommendation
    Recommend {
        /// Gender selection
        #[arg(long, value_enum)]
        gender: GenderArg,
        /// Age as entered (must land in 15-100 to submit)
        #[arg(long)]
        age: String,
        /// Path to the face photo to validate
        #[arg(long)]
        photo: PathBuf,
        /// Skip the staged analysis pauses
        #[arg(long, help = "Skip the staged analysis pauses")]
        fast: bool,
        /// Share the recommendation after the result is shown
        #[arg(long, help = "Share the recommendation after the result is shown")]
        share: bool,
    },
    /// Print the loaded product catalog
    Catalog,
    /// Write the default configuration to shademate.toml
    Init {
        /// Overwrite an existing shademate.toml
        #[arg(long, help = "Overwrite an existing shademate.toml")]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

/// Renders state changes on the terminal; the core never prints.
struct TerminalPresenter;

impl FlowPresenter for TerminalPresenter {
    fn submit_enabled(&self, enabled: bool) {
        tracing::debug!(enabled, "submit control state");
    }

    fn age_error(&self, message: Option<&str>) {
        if let Some(message) = message {
            eprintln!("⚠️  {message}");
        }
    }

    fn photo_preview(&self, preview_data_uri: &str) {
        println!("📸 Photo validated ({} byte preview)", preview_data_uri.len());
    }

    fn upload_busy(&self, busy: bool) {
        if busy {
            println!("   Validating photo with the classifier...");
        }
    }

    fn upload_rejected(&self, error: &UploadError) {
        eprintln!("❌ {error}");
    }

    fn phase_changed(&self, phase: WorkflowPhase) {
        match phase {
            WorkflowPhase::Submitting => println!("🕶️  Starting analysis..."),
            WorkflowPhase::AnalyzingStep1 => println!("   Analyzing face shape..."),
            WorkflowPhase::AnalyzingStep2 => println!("   Matching frame styles..."),
            WorkflowPhase::AnalyzingStep3 => println!("   Picking your frame..."),
            WorkflowPhase::Navigating | WorkflowPhase::Idle => {}
        }
    }

    fn flow_reset(&self) {
        println!("Flow reset.");
    }
}

/// Result view: looks the product up in the session catalog and renders it.
struct TerminalNavigator {
    catalog: Arc<CatalogStore>,
    result_page: String,
}

impl ResultNavigator for TerminalNavigator {
    fn show_result(&self, product_id: i64) {
        let url = format!("{}?id={product_id}", self.result_page);
        println!();
        println!("✨ YOUR RECOMMENDATION");
        if let Some(entry) = self
            .catalog
            .cached()
            .and_then(|entries| entries.iter().find(|e| e.id == product_id).cloned())
        {
            println!("   {} {}", entry.brand, entry.model);
            println!("   \"{}\"", entry.recommended_name);
            println!("   {}", entry.description);
            println!("   Image: {}", entry.image_url);
        }
        println!("   → {url}");
    }
}

/// Terminal stand-in for the platform share sheet.
struct TerminalShare;

impl SharePlatform for TerminalShare {
    fn is_available(&self) -> bool {
        true
    }

    fn share(&self, content: &ShareContent) -> Result<(), ShareError> {
        println!("🔗 {}: {} ({})", content.title, content.text, content.url);
        Ok(())
    }
}

fn guess_mime_type(path: &Path) -> String {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
    .to_string()
}

async fn run_recommend(
    gender: GenderArg,
    age: String,
    photo_path: PathBuf,
    fast: bool,
    share: bool,
) -> Result<()> {
    let cfg = shademate::config()?;

    let catalog = Arc::new(CatalogStore::new(CatalogSource::from_config(
        &cfg.catalog.source,
    )));
    // Submission stays unreachable until the catalog is known to exist, so
    // the empty-catalog fallback can never fire from this entry point.
    catalog
        .load()
        .await
        .context("catalog unavailable; cannot recommend")?;

    let pipeline = UploadPipeline::new(
        cfg.classifier.endpoint.clone(),
        Duration::from_secs(cfg.classifier.timeout_seconds),
    );
    let navigator = Arc::new(TerminalNavigator {
        catalog: Arc::clone(&catalog),
        result_page: cfg.catalog.result_page.clone(),
    });
    let timings = if fast {
        PhaseTimings::immediate()
    } else {
        PhaseTimings::from_config(&cfg.sequence)
    };
    let controller = FlowController::new(
        pipeline,
        catalog,
        Arc::new(TerminalPresenter),
        navigator,
        timings,
    );

    controller.select_gender(gender.into()).await;
    controller.set_age_input(&age).await;

    let bytes = tokio::fs::read(&photo_path)
        .await
        .with_context(|| format!("cannot read photo {}", photo_path.display()))?;
    let file = PhotoFile {
        name: photo_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo")
            .to_string(),
        mime_type: guess_mime_type(&photo_path),
        bytes,
    };
    controller
        .attach_photo(file)
        .await
        .context("photo validation failed")?;

    let handle = controller
        .clone()
        .try_submit()
        .await
        .context("intake incomplete; nothing was submitted")?;
    handle.await?;

    if share {
        let product_id = controller
            .resolved_product()
            .await
            .map(|entry| entry.id)
            .context("no recommendation was resolved")?;
        let page_url = format!("{}?id={product_id}", cfg.catalog.result_page);
        controller.share_result(&TerminalShare, &page_url).await?;
    }

    Ok(())
}

async fn run_catalog() -> Result<()> {
    let cfg = shademate::config()?;
    let catalog = CatalogStore::new(CatalogSource::from_config(&cfg.catalog.source));

    let entries = catalog.load_or_empty().await;
    if entries.is_empty() {
        println!("Catalog is empty or unavailable ({}).", cfg.catalog.source);
        return Ok(());
    }
    println!("📋 CATALOG ({} products)", entries.len());
    for entry in entries.iter() {
        println!(
            "   [{}] {} {} - \"{}\"",
            entry.id, entry.brand, entry.model, entry.recommended_name
        );
    }
    Ok(())
}

fn run_init(force: bool) -> Result<()> {
    let path = Path::new("shademate.toml");
    if path.exists() && !force {
        anyhow::bail!("shademate.toml already exists (use --force to overwrite)");
    }
    ShademateConfig::default().save_to_file(path)?;
    println!("Wrote default configuration to shademate.toml");
    Ok(())
}

fn print_guidance() {
    println!("🕶️  SHADEMATE - Sunglasses Recommendation Demo");
    println!();
    println!("Quick start:");
    println!("  shademate recommend --gender female --age 27 --photo face.jpg");
    println!("  shademate catalog");
    println!("  shademate init");
    println!();
    println!("Submission needs a gender, an age between 15 and 100, and a face");
    println!("photo the classifier accepts. Rejected photos leave the intake");
    println!("untouched, so just try another one.");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = shademate::config()?;
    shademate::init_telemetry(&cfg.observability.log_level, cfg.observability.json_logs)?;

    match cli.command {
        Some(Commands::Recommend {
            gender,
            age,
            photo,
            fast,
            share,
        }) => run_recommend(gender, age, photo, fast, share).await,
        Some(Commands::Catalog) => run_catalog().await,
        Some(Commands::Init { force }) => run_init(force),
        None => {
            print_guidance();
            Ok(())
        }
    }
}

//! MeshMark 命令行宿主
//!
//! 用法:
//!   meshmark replay events.json --model chair -o annotations.json
//!   meshmark inspect annotations.json
//!   meshmark models

mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use meshmark_core::geometry::ShapeKind;
use meshmark_core::model::{ModelCatalog, DEFAULT_MODEL};
use meshmark_file::native;
use meshmark_ui::{AnnotationSession, DisplayOptions, DrawMode};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "meshmark")]
#[command(about = "Place point, line and polygon annotations on 3D models")]
struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a pointer-event script and write the resulting annotations
    Replay {
        /// JSON event script
        script: PathBuf,
        /// Model the annotations belong to
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,
        /// Drawing mode used by clicks without an explicit mode
        #[arg(long, default_value = "none")]
        mode: String,
        /// Annotation file to load before replaying
        #[arg(long)]
        import: Option<PathBuf>,
        /// Output annotation file
        #[arg(short, long, default_value = native::DEFAULT_FILE_NAME)]
        output: PathBuf,
        /// Indent the output JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print a summary of an annotation file
    Inspect {
        file: PathBuf,
    },
    /// List the builtin models
    Models,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Replay {
            script,
            model,
            mode,
            import,
            output,
            pretty,
        } => replay(script, &model, &mode, import, output, pretty),
        Commands::Inspect { file } => inspect(file),
        Commands::Models => {
            list_models();
            Ok(())
        }
    }
}

fn replay(
    script: PathBuf,
    model: &str,
    mode: &str,
    import: Option<PathBuf>,
    output: PathBuf,
    pretty: bool,
) -> Result<()> {
    let catalog = ModelCatalog::builtin();
    let entry = catalog
        .get(model)
        .with_context(|| format!("Unknown model '{}'", model))?;

    let options = DisplayOptions {
        mode: mode.parse::<DrawMode>()?,
        ..DisplayOptions::default()
    };
    let mut session = AnnotationSession::new(options);
    session.switch_model(entry.clone(), None);

    if let Some(path) = import {
        let set = native::load(&path)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        session
            .import(set)
            .with_context(|| format!("Failed to import {}", path.display()))?;
    }

    let text = std::fs::read_to_string(&script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let steps = script::parse(&text)
        .with_context(|| format!("Invalid script {}", script.display()))?;

    info!("Replaying {} steps on model '{}'", steps.len(), model);
    let summary = script::replay(&mut session, &catalog, &steps);
    info!(
        "Replay finished: {} applied, {} committed, {} deleted, {} failed",
        summary.applied, summary.committed, summary.deleted, summary.failed
    );

    if session.pending().is_some() {
        tracing::warn!("Discarding unfinished shape: {}", session.prompt());
    }

    let saved = if pretty {
        native::save_pretty(session.annotations(), &output)
    } else {
        native::save(session.annotations(), &output)
    };
    saved.with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(())
}

fn inspect(file: PathBuf) -> Result<()> {
    let set = native::load(&file).with_context(|| format!("Failed to load {}", file.display()))?;

    println!("{}", file.display());
    for kind in ShapeKind::ALL {
        println!("  {:<8} {}", kind.name(), set.count(kind));
    }
    for polygon in &set.polygons {
        println!(
            "  polygon {} vertices={} perimeter={:.4}",
            polygon.id,
            polygon.vertex_count(),
            polygon.perimeter()
        );
    }

    Ok(())
}

fn list_models() {
    for entry in ModelCatalog::builtin().entries() {
        println!("{:<8} scale={:<5} {}", entry.name, entry.scale, entry.url);
    }
}

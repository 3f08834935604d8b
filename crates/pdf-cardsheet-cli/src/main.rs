mod logger;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_cardsheet::{
    CancelToken, Card, ColorCache, CutLineMode, DirImageStore, ImageStore, PaperSize,
    PresetStore, PreviewQuality, ProgressFn, SheetConfig, SidesMode,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pdfcs", about = "Lay out card images on printable sheets", version)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a card list to a print-ready PDF
    Export {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        sheet: SheetArgs,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render a single page of the export
    Preview {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        sheet: SheetArgs,

        /// Page to render (1-based)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Image quality
        #[arg(long, default_value = "low", value_enum)]
        quality: QualityArg,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show page and sheet counts without rendering
    Stats {
        /// Card list CSV (columns: face, back, repeat)
        #[arg(short, long)]
        cards: PathBuf,

        #[command(flatten)]
        sheet: SheetArgs,
    },

    /// Manage named configuration presets
    Preset {
        /// Preset file
        #[arg(long, default_value = "presets.json")]
        presets: PathBuf,

        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand)]
enum PresetAction {
    /// Store a configuration file under a name
    Save {
        name: String,
        /// Configuration JSON file
        config: PathBuf,
    },
    /// List preset names
    List,
    /// Print a preset as JSON
    Show { name: String },
    /// Delete a preset
    Remove { name: String },
}

#[derive(Args)]
struct InputArgs {
    /// Card list CSV (columns: face, back, repeat)
    #[arg(short, long)]
    cards: PathBuf,

    /// Directory image paths are resolved against (defaults to the CSV's directory)
    #[arg(long)]
    images: Option<PathBuf>,
}

#[derive(Args)]
struct SheetArgs {
    /// Configuration JSON file
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Preset name to start from
    #[arg(long)]
    preset: Option<String>,

    /// Preset file used with --preset
    #[arg(long, default_value = "presets.json")]
    presets: PathBuf,

    /// Paper size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Landscape orientation
    #[arg(long)]
    landscape: bool,

    /// How cards are spread over sheet sides
    #[arg(long, value_enum)]
    sides: Option<SidesArg>,

    /// Cut marks on face pages
    #[arg(long, value_enum)]
    face_marks: Option<MarksArg>,

    /// Cut marks on back pages
    #[arg(long, value_enum)]
    back_marks: Option<MarksArg>,

    /// Fill margins with each card's border color
    #[arg(long)]
    margin_filling: bool,

    /// Print page numbers
    #[arg(long)]
    page_numbers: bool,

    /// Back image for cards without their own back
    #[arg(long)]
    background: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

#[derive(Clone, Copy, ValueEnum)]
enum SidesArg {
    One,
    Double,
    Fold,
    Brochure,
}

#[derive(Clone, Copy, ValueEnum)]
enum MarksArg {
    None,
    Normal,
    Cross,
    Complete,
}

#[derive(Clone, Copy, ValueEnum)]
enum QualityArg {
    Low,
    High,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl From<SidesArg> for SidesMode {
    fn from(arg: SidesArg) -> Self {
        match arg {
            SidesArg::One => Self::OneSide,
            SidesArg::Double => Self::DoubleSides,
            SidesArg::Fold => Self::FoldInHalf,
            SidesArg::Brochure => Self::Brochure,
        }
    }
}

impl From<MarksArg> for CutLineMode {
    fn from(arg: MarksArg) -> Self {
        match arg {
            MarksArg::None => Self::None,
            MarksArg::Normal => Self::Normal,
            MarksArg::Cross => Self::Cross,
            MarksArg::Complete => Self::Complete,
        }
    }
}

impl From<QualityArg> for PreviewQuality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Low => Self::Low,
            QualityArg::High => Self::High,
        }
    }
}

impl SheetArgs {
    /// Base config from a file or preset, with command line overrides applied
    async fn resolve(&self) -> Result<SheetConfig> {
        let mut config = if let Some(path) = &self.config {
            SheetConfig::load(path)
                .await
                .with_context(|| format!("loading config {}", path.display()))?
        } else if let Some(name) = &self.preset {
            let store = PresetStore::load(&self.presets).await?;
            match store.get(name) {
                Some(config) => config.clone(),
                None => bail!("no preset named '{}' in {}", name, self.presets.display()),
            }
        } else {
            SheetConfig::default()
        };

        if let Some(paper) = self.paper {
            config.paper_size = paper.into();
        }
        if self.landscape {
            config.landscape = true;
        }
        if let Some(sides) = self.sides {
            config.sides = sides.into();
        }
        if let Some(marks) = self.face_marks {
            config.face_cut_line = marks.into();
        }
        if let Some(marks) = self.back_marks {
            config.back_cut_line = marks.into();
        }
        if self.margin_filling {
            config.margin_filling = true;
        }
        if self.page_numbers {
            config.page_number = true;
        }
        if let Some(background) = &self.background {
            config.global_background = Some(pdf_cardsheet::ImageRef::new(background));
        }

        Ok(config)
    }
}

impl InputArgs {
    async fn load(&self) -> Result<(Vec<Card>, Arc<dyn ImageStore>)> {
        let cards = pdf_cardsheet::load_cards_csv(&self.cards)
            .await
            .with_context(|| format!("reading cards from {}", self.cards.display()))?;

        let root = match &self.images {
            Some(dir) => dir.clone(),
            None => self
                .cards
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        log::debug!("Resolving images against {}", root.display());

        Ok((cards, Arc::new(DirImageStore::new(root))))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::StderrLogger::from_verbosity(cli.verbose).init()?;

    match cli.command {
        Commands::Export {
            input,
            sheet,
            output,
        } => {
            let config = sheet.resolve().await?;
            let (cards, store) = input.load().await?;

            let cancel = CancelToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupted, stopping after the current page");
                    on_interrupt.cancel();
                }
            });

            let progress = ProgressFn(|percent: u8| {
                eprint!("\rRendering {:>3}%", percent);
                let _ = std::io::stderr().flush();
            });

            let mut colors = ColorCache::new();
            let result = pdf_cardsheet::export_to_file(
                &config,
                &cards,
                store,
                &mut colors,
                Arc::new(progress),
                &cancel,
                &output,
            )
            .await;
            eprintln!();

            match result {
                Ok(0) => println!("No cards to export"),
                Ok(pages) => println!("Exported {} pages → {}", pages, output.display()),
                Err(pdf_cardsheet::SheetError::Cancelled) => println!("Export cancelled"),
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Preview {
            input,
            sheet,
            page,
            quality,
            output,
        } => {
            if page == 0 {
                bail!("pages are numbered from 1");
            }
            let config = sheet.resolve().await?;
            let (cards, store) = input.load().await?;

            let total = pdf_cardsheet::page_count(&config, &cards)?;
            if page > total {
                bail!("page {} requested but the export has {} pages", page, total);
            }

            let mut colors = ColorCache::new();
            let bytes = pdf_cardsheet::render_preview(
                &config,
                &cards,
                store,
                &mut colors,
                page - 1,
                quality.into(),
            )
            .await?;
            tokio::fs::write(&output, bytes).await?;
            println!("Page {}/{} → {}", page, total, output.display());
        }

        Commands::Stats { cards, sheet } => {
            let config = sheet.resolve().await?;
            let cards = pdf_cardsheet::load_cards_csv(&cards).await?;

            let stats = pdf_cardsheet::calculate_statistics(&cards, &config)?;
            println!("Card Sheet Statistics:");
            println!("  Cards (after repeats): {}", stats.expanded_cards);
            println!("  Cards per page: {}", stats.tiles_per_page);
            println!("  Face pages: {}", stats.face_pages);
            println!("  Back pages: {}", stats.back_pages);
            println!("  Output pages: {}", stats.output_pages);
            println!("  Sheets to print: {}", stats.output_sheets);
            println!("  Blank slots: {}", stats.blank_slots);
        }

        Commands::Preset { presets, action } => {
            let mut store = PresetStore::load(&presets).await?;

            match action {
                PresetAction::Save { name, config } => {
                    let config = SheetConfig::load(&config)
                        .await
                        .with_context(|| format!("loading config {}", config.display()))?;
                    config.validate()?;
                    store.insert(name.clone(), config)?;
                    store.save().await?;
                    println!("Saved preset '{}'", name);
                }
                PresetAction::List => {
                    for name in store.names() {
                        println!("{}", name);
                    }
                }
                PresetAction::Show { name } => match store.get(&name) {
                    Some(config) => println!("{}", serde_json::to_string_pretty(config)?),
                    None => bail!("no preset named '{}'", name),
                },
                PresetAction::Remove { name } => {
                    if store.remove(&name).is_none() {
                        bail!("no preset named '{}'", name);
                    }
                    store.save().await?;
                    println!("Removed preset '{}'", name);
                }
            }
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_impose::{Bind, Creep, ImpositionOptions, Layout, Margins, Marks, PaperSize, Schema};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pdfimpose", about = "Perform imposition of PDF files", version)]
struct Cli {
    #[command(flatten)]
    global: Global,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Global {
    /// Log every step of the imposition
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print pages on both sides, then cut the sheets into cards
    Cards {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        layout: GridLayoutArgs,
    },

    /// Cut sheets into single leaves, stack them and bind with a wire
    Wire {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        layout: GridLayoutArgs,
    },

    /// Cut sheets, stack the pieces and fold the stack into one booklet
    Cutstackfold {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        layout: GridLayoutArgs,
        #[command(flatten)]
        folding: FoldingArgs,
        /// Sheets per booklet (0 puts every sheet in the same booklet)
        #[arg(short, long)]
        group: Option<usize>,
    },

    /// Print several copies of a booklet on each sheet, cut and fold them
    Copycutfold {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        layout: GridLayoutArgs,
        #[command(flatten)]
        folding: FoldingArgs,
        /// Sheets per booklet (0 puts every sheet in the same booklet)
        #[arg(short, long)]
        group: Option<usize>,
    },

    /// Eight pages on one side of a sheet, folded into a small zine
    Onepagezine {
        #[command(flatten)]
        common: CommonArgs,
        /// Binding edge
        #[arg(short, long, value_enum, default_value_t = BindArg::Left)]
        bind: BindArg,
        /// Center the zine on this paper size
        #[arg(short, long, value_parser = paper)]
        format: Option<PaperSize>,
    },

    /// Fold sheets into signatures, to be glued one after the other
    Perfect {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        layout: FoldLayoutArgs,
        /// Binding edge
        #[arg(short, long, value_enum, default_value_t = BindArg::Left)]
        bind: BindArg,
        /// Sheets per signature (0 puts every sheet in the same signature)
        #[arg(short, long)]
        group: Option<usize>,
    },

    /// Fold sheets, nest them all and stitch along the fold
    Saddle {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        layout: FoldLayoutArgs,
        #[command(flatten)]
        folding: FoldingArgs,
    },

    /// Fold sheets into signatures, to be sewn into a hard cover
    Hardcover {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        layout: FoldLayoutArgs,
        #[command(flatten)]
        folding: FoldingArgs,
        /// Sheets per signature (0 puts every sheet in the same signature)
        #[arg(short, long)]
        group: Option<usize>,
    },

    /// Run an imposition described by a JSON configuration file
    Apply {
        /// Configuration file, as written by --save-config
        config: PathBuf,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// PDF files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Destination file [default: "-impose" appended to the first source file]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Margin around output pages (e.g. "1cm")
    #[arg(short = 'M', long, default_value = "0", value_parser = length)]
    omargin: f64,

    /// Space between source pages on output pages (e.g. "5mm")
    #[arg(short = 'm', long, default_value = "0", value_parser = length)]
    imargin: f64,

    /// Number of source pages kept at the end, after blank pages
    #[arg(short, long, default_value_t = 0)]
    last: usize,

    /// Marks to draw; can be given multiple times
    #[arg(short = 'k', long = "mark", value_enum)]
    marks: Vec<MarkArg>,

    /// Show statistics only, don't generate PDF
    #[arg(long)]
    stats_only: bool,

    /// Also write the options to this JSON file, for `pdfimpose apply`
    #[arg(long, value_name = "FILE")]
    save_config: Option<PathBuf>,
}

#[derive(Args)]
#[group(multiple = false)]
struct GridLayoutArgs {
    /// Pages (or page pairs) per sheet side, as COLUMNSxROWS
    #[arg(short, long, value_parser = signature)]
    signature: Option<SignatureArg>,

    /// Output paper size, filled with as many pages as fit
    #[arg(short, long, value_parser = paper)]
    format: Option<PaperSize>,
}

#[derive(Args)]
#[group(multiple = false)]
struct FoldLayoutArgs {
    /// Pages per sheet side, as COLUMNSxROWS (powers of two)
    #[arg(short, long, value_parser = signature)]
    signature: Option<SignatureArg>,

    /// Output paper size, filled with as many pages as fit
    #[arg(short, long, value_parser = paper)]
    format: Option<PaperSize>,

    /// Fold sequence, e.g. "hvh" ('h' halves the width, 'v' the height)
    #[arg(long)]
    folds: Option<String>,
}

#[derive(Args)]
struct FoldingArgs {
    /// Binding edge
    #[arg(short, long, value_enum, default_value_t = BindArg::Left)]
    bind: BindArg,

    /// Space added at each fold, as a function of the number of nested
    /// sheets (e.g. ".1x+2mm")
    #[arg(short, long, default_value = "0", value_parser = creep)]
    creep: Creep,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MarkArg {
    Crop,
    Bind,
}

#[derive(Clone, Copy, ValueEnum)]
enum BindArg {
    Left,
    Top,
    Right,
    Bottom,
}

#[derive(Clone, Copy)]
struct SignatureArg {
    width: usize,
    height: usize,
}

impl From<BindArg> for Bind {
    fn from(arg: BindArg) -> Self {
        match arg {
            BindArg::Left => Self::Left,
            BindArg::Top => Self::Top,
            BindArg::Right => Self::Right,
            BindArg::Bottom => Self::Bottom,
        }
    }
}

impl From<SignatureArg> for Layout {
    fn from(arg: SignatureArg) -> Self {
        Layout::Signature {
            width: arg.width,
            height: arg.height,
        }
    }
}

fn length(text: &str) -> std::result::Result<f64, String> {
    pdf_impose::parse_length(text).map_err(|e| e.to_string())
}

fn signature(text: &str) -> std::result::Result<SignatureArg, String> {
    pdf_impose::parse_signature(text)
        .map(|(width, height)| SignatureArg { width, height })
        .map_err(|e| e.to_string())
}

fn paper(text: &str) -> std::result::Result<PaperSize, String> {
    text.parse().map_err(|e: pdf_impose::ImposeError| e.to_string())
}

fn creep(text: &str) -> std::result::Result<Creep, String> {
    text.parse().map_err(|e: pdf_impose::ImposeError| e.to_string())
}

impl GridLayoutArgs {
    fn layout(&self) -> Option<Layout> {
        match (self.signature, self.format) {
            (Some(signature), _) => Some(signature.into()),
            (None, Some(paper)) => Some(Layout::Format(paper)),
            (None, None) => None,
        }
    }
}

impl FoldLayoutArgs {
    fn layout(&self) -> Option<Layout> {
        match (self.signature, self.format, &self.folds) {
            (Some(signature), _, _) => Some(signature.into()),
            (None, Some(paper), _) => Some(Layout::Format(paper)),
            (None, None, Some(folds)) => Some(Layout::Folds(folds.clone())),
            (None, None, None) => None,
        }
    }
}

/// Accept `name` for `name.pdf`, when only the latter exists
fn resolve_input(path: &Path) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }
    let mut with_extension = path.as_os_str().to_owned();
    with_extension.push(".pdf");
    let with_extension = PathBuf::from(with_extension);
    if with_extension.exists() {
        with_extension
    } else {
        path.to_path_buf()
    }
}

/// What one invocation has to do
struct Job {
    options: ImpositionOptions,
    stats_only: bool,
    save_config: Option<PathBuf>,
}

impl CommonArgs {
    fn job(self, schema: Schema, layout: Option<Layout>) -> Job {
        let options = ImpositionOptions {
            input_files: self.files.iter().map(|file| resolve_input(file)).collect(),
            output_file: self.output,
            schema,
            layout,
            imargin: self.imargin,
            omargin: Margins::uniform(self.omargin),
            last: self.last,
            marks: Marks {
                crop: self.marks.contains(&MarkArg::Crop),
                bind: self.marks.contains(&MarkArg::Bind),
            },
            ..Default::default()
        };
        Job {
            options,
            stats_only: self.stats_only,
            save_config: self.save_config,
        }
    }
}

impl FoldingArgs {
    fn apply(&self, options: &mut ImpositionOptions) {
        options.bind = self.bind.into();
        options.creep = self.creep;
    }
}

async fn build_job(command: Commands) -> Result<Job> {
    let job = match command {
        Commands::Cards { common, layout } => common.job(Schema::Cards, layout.layout()),
        Commands::Wire { common, layout } => common.job(Schema::Wire, layout.layout()),
        Commands::Cutstackfold {
            common,
            layout,
            folding,
            group,
        } => {
            let mut job = common.job(Schema::CutStackFold, layout.layout());
            folding.apply(&mut job.options);
            job.options.group = group;
            job
        }
        Commands::Copycutfold {
            common,
            layout,
            folding,
            group,
        } => {
            let mut job = common.job(Schema::CopyCutFold, layout.layout());
            folding.apply(&mut job.options);
            job.options.group = group;
            job
        }
        Commands::Onepagezine {
            common,
            bind,
            format,
        } => {
            let mut job = common.job(Schema::OnePageZine, format.map(Layout::Format));
            job.options.bind = bind.into();
            job
        }
        Commands::Perfect {
            common,
            layout,
            bind,
            group,
        } => {
            let mut job = common.job(Schema::Perfect, layout.layout());
            job.options.bind = bind.into();
            job.options.group = group;
            job
        }
        Commands::Saddle {
            common,
            layout,
            folding,
        } => {
            let mut job = common.job(Schema::Saddle, layout.layout());
            folding.apply(&mut job.options);
            job
        }
        Commands::Hardcover {
            common,
            layout,
            folding,
            group,
        } => {
            let mut job = common.job(Schema::Hardcover, layout.layout());
            folding.apply(&mut job.options);
            job.options.group = group;
            job
        }
        Commands::Apply { config, stats_only } => {
            let options = ImpositionOptions::load(&config)
                .await
                .with_context(|| format!("Cannot read configuration {}", config.display()))?;
            Job {
                options,
                stats_only,
                save_config: None,
            }
        }
    };
    Ok(job)
}

async fn run(command: Commands) -> Result<()> {
    let Job {
        options,
        stats_only,
        save_config,
    } = build_job(command).await?;
    options.validate()?;

    if let Some(path) = save_config {
        options.save(&path).await?;
        log::info!("Saved options to {}", path.display());
    }

    // Load all input PDFs
    let documents = pdf_impose::load_multiple_pdfs(&options.input_files).await?;

    // Calculate and show statistics
    let stats = pdf_impose::calculate_statistics(&documents, &options)?;
    println!("Imposition Statistics:");
    println!("  Source pages: {}", stats.source_pages);
    println!("  Blank pages added: {}", stats.blank_pages_added);
    println!("  Output pages: {}", stats.output_pages);
    println!("  Output sheets: {}", stats.output_sheets);

    if stats_only {
        return Ok(());
    }

    // Perform imposition
    let output = options.output_path()?;
    let imposed = pdf_impose::impose(&documents, &options).await?;
    pdf_impose::save_pdf(imposed, &output).await?;
    println!("Imposed → {}", output.display());

    Ok(())
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.global.verbose);

    run(cli.command).await
}

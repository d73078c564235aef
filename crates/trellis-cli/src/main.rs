use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trellis_codegen::{ConvertError, ConvertOptions};
use trellis_model::{AnalysisConfig, StrategySignals};
use trellis_tree::{parse_document, DesignDocument, Flattener, NODE_LIMIT_CEILING};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Trellis — design tree to Angular component compiler")]
#[command(version)]
struct Cli {
    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a design JSON file into an Angular component
    Build {
        /// Input design file (.json)
        path: String,

        /// Directory for the generated files (defaults to the input's directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Print the output record as JSON instead of writing files
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        convert: ConvertArgs,
    },

    /// Check that a design file loads and analyzes without errors
    Check {
        /// Input design file (.json)
        path: String,

        #[command(flatten)]
        convert: ConvertArgs,
    },

    /// Report the complexity signals and the chosen conversion strategy
    Strategy {
        /// Input design file (.json)
        path: String,

        /// Free-text conversion instructions
        #[arg(short, long, default_value = "")]
        instructions: String,

        /// Force the structural path
        #[arg(long)]
        prefer_structural: bool,

        /// JSON file overriding analysis thresholds
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ConvertArgs {
    /// Component name (defaults to the input file stem)
    #[arg(short, long)]
    name: Option<String>,

    /// Maximum number of nodes to convert
    #[arg(short, long, default_value_t = trellis_tree::DEFAULT_NODE_LIMIT)]
    limit: usize,

    /// Emit fixed pixel sizes and no breakpoint
    #[arg(long)]
    no_responsive: bool,

    /// Emit plain HTML elements instead of Angular Material widgets
    #[arg(long)]
    no_material: bool,

    /// Drop hidden layers before conversion
    #[arg(long)]
    skip_hidden: bool,

    /// Free-text instructions; mentioning "material" enables the widget library
    #[arg(short, long, default_value = "")]
    instructions: String,

    /// JSON file overriding analysis thresholds
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ConvertArgs {
    fn options(&self, path: &str) -> ConvertOptions {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| file_stem(path).to_string());
        ConvertOptions {
            node_limit: self.limit,
            responsive: !self.no_responsive,
            use_widget_library: !self.no_material
                || trellis_model::prefers_structural(&self.instructions),
            component_name: name,
            skip_hidden: self.skip_hidden,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build {
            path,
            out_dir,
            json,
            convert,
        } => cmd_build(&path, out_dir.as_deref(), json, &convert),
        Command::Check { path, convert } => cmd_check(&path, &convert),
        Command::Strategy {
            path,
            instructions,
            prefer_structural,
            config,
        } => cmd_strategy(&path, &instructions, prefer_structural, config.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn read_config(path: Option<&Path>) -> AnalysisConfig {
    let Some(path) = path else {
        return AnalysisConfig::default();
    };
    let source = read_source(&path.to_string_lossy());
    match serde_json::from_str(&source) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error in {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn load(path: &str) -> DesignDocument {
    let source = read_source(path);
    match parse_document(&source) {
        Ok(document) => {
            tracing::debug!(path, name = ?document.name, "loaded design document");
            document
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn file_stem(path: &str) -> &str {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("component")
}

fn report(e: &ConvertError) -> ! {
    eprintln!("{e}");
    std::process::exit(1);
}

fn cmd_build(path: &str, out_dir: Option<&Path>, json: bool, args: &ConvertArgs) {
    let document = load(path);
    let options = args.options(path);
    let config = read_config(args.config.as_deref());

    let output = match trellis_codegen::convert(document.input, &options, &config) {
        Ok(output) => output,
        Err(e) => report(&e),
    };

    for warning in &output.warnings {
        eprintln!("Warning: {warning}");
    }

    if json {
        match serde_json::to_string_pretty(&output) {
            Ok(record) => println!("{record}"),
            Err(e) => {
                eprintln!("Error serializing output: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let stem = trellis_codegen::ComponentNames::new(&options.component_name).file_stem;
    let dir = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new(path).parent().unwrap_or(Path::new(".")).to_path_buf());

    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Error creating {}: {e}", dir.display());
        std::process::exit(1);
    }

    let files = [
        ("html", &output.markup),
        ("scss", &output.stylesheet),
        ("ts", &output.behavior),
    ];
    for (extension, contents) in files {
        let file = dir.join(format!("{stem}.component.{extension}"));
        if let Err(e) = std::fs::write(&file, contents) {
            eprintln!("Error writing {}: {e}", file.display());
            std::process::exit(1);
        }
        eprintln!("Built: {}", file.display());
    }
}

fn cmd_check(path: &str, args: &ConvertArgs) {
    let document = load(path);
    let options = args.options(path);
    let config = read_config(args.config.as_deref());

    let mut warnings = Vec::new();
    let limit = match options.effective_node_limit(&mut warnings) {
        Ok(limit) => limit,
        Err(e) => report(&e),
    };
    let flattened = document
        .input
        .flatten(&Flattener::new(limit).skip_hidden(options.skip_hidden));
    warnings.extend(flattened.warnings);

    let built = match trellis_model::analyze(&flattened.nodes, &config) {
        Ok(built) => built,
        Err(e) => report(&ConvertError::from(e)),
    };
    warnings.extend(built.warnings);

    for warning in &warnings {
        eprintln!("Warning: {warning}");
    }
    eprintln!(
        "OK: {path} ({} nodes, {} roots)",
        built.tree.len(),
        built.tree.roots().len()
    );
}

fn cmd_strategy(path: &str, instructions: &str, prefer_structural: bool, config: Option<&Path>) {
    let document = load(path);
    let config = read_config(config);

    // Signals look at the whole document, not the conversion budget.
    let all = document.input.flatten(&Flattener::new(usize::MAX));
    let signals = StrategySignals::collect(&all.nodes, &config);
    let prefer = prefer_structural || trellis_model::prefers_structural(instructions);
    let strategy = trellis_model::select_strategy(&signals, prefer, &config);

    println!("nodes:          {}", signals.node_count);
    println!("sampled:        {}", signals.sampled);
    println!("auto layout:    {}", signals.has_auto_layout);
    println!("constraints:    {}", signals.has_constraints);
    println!("type diversity: {}", signals.type_diversity);
    println!(
        "strategy:       {}",
        match strategy {
            trellis_model::Strategy::Structural => "structural",
            trellis_model::Strategy::Generative => "generative",
        }
    );
    if signals.node_count > NODE_LIMIT_CEILING {
        eprintln!(
            "Note: only the first {NODE_LIMIT_CEILING} nodes are converted; the rest are truncated."
        );
    }
}

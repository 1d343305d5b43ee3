use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use notegraph::{Frame, GraphData, LayoutConfig, LayoutEngine, NodeId, ReconcileReport};

/// Force-directed layout for backlink graphs.
#[derive(Parser)]
#[command(name = "notegraph")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a graph until it settles and write the positions as JSON
    Layout {
        /// Input graph file (.json)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Layout configuration (.json, .yaml or .yml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for initial positions (overrides the config)
        #[arg(long)]
        seed: Option<u64>,

        /// Give up after this many ticks
        #[arg(long, default_value = "2000")]
        max_ticks: usize,

        /// Surface width used for the projected frame
        #[arg(long, default_value = "800")]
        width: f32,

        /// Surface height used for the projected frame
        #[arg(long, default_value = "600")]
        height: f32,

        /// Padding in pixels when fitting the graph to the surface
        #[arg(long, default_value = "40")]
        padding: f32,
    },
    /// Print the default layout configuration
    Config {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ConfigFormat::Yaml)]
        format: ConfigFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ConfigFormat {
    Json,
    Yaml,
}

#[derive(Serialize)]
struct PositionedNode {
    id: NodeId,
    x: f32,
    y: f32,
}

#[derive(Serialize)]
struct LayoutOutput {
    ticks: usize,
    settled: bool,
    report: ReconcileReport,
    nodes: Vec<PositionedNode>,
    frame: Frame,
}

struct LayoutArgs<'a> {
    input: &'a Path,
    output: Option<&'a Path>,
    config: Option<&'a Path>,
    seed: Option<u64>,
    max_ticks: usize,
    width: f32,
    height: f32,
    padding: f32,
}

fn layout(args: LayoutArgs<'_>) -> anyhow::Result<()> {
    let mut config = match args.config {
        Some(path) => LayoutConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let data = GraphData::from_json_file(args.input)
        .with_context(|| format!("failed to read graph {}", args.input.display()))?;

    let mut engine = LayoutEngine::new(config)?;
    let report = engine.load(&data);
    info!(
        nodes = engine.graph().len(),
        edges = engine.graph().edges().len(),
        dangling = report.dangling_edges,
        "graph loaded"
    );

    let ticks = engine.run_until_idle(args.max_ticks);
    let settled = engine.is_idle();
    if settled {
        info!(ticks, "layout settled");
    } else {
        warn!(ticks, "layout did not settle within the tick budget");
    }

    engine.resize(args.width, args.height);
    engine.fit_to_view(args.padding);
    let frame = engine.tick(Duration::ZERO);

    let nodes = engine
        .graph()
        .nodes()
        .iter()
        .map(|n| PositionedNode {
            id: n.id.clone(),
            x: n.position.x,
            y: n.position.y,
        })
        .collect();
    let output = LayoutOutput {
        ticks,
        settled,
        report,
        nodes,
        frame,
    };

    match args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &output)?;
            writer.flush()?;
            info!(path = %path.display(), "layout written");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &output)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}

fn print_config(format: ConfigFormat) -> anyhow::Result<()> {
    let config = LayoutConfig::default();
    let text = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(&config)?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Layout {
            input,
            output,
            config,
            seed,
            max_ticks,
            width,
            height,
            padding,
        } => {
            if !(width > 0.0 && height > 0.0) {
                bail!("surface size must be positive, got {width}x{height}");
            }
            layout(LayoutArgs {
                input: &input,
                output: output.as_deref(),
                config: config.as_deref(),
                seed,
                max_ticks,
                width,
                height,
                padding,
            })?;
        }
        Commands::Config { format } => print_config(format)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_layout_with_defaults() {
        let cli = Cli::try_parse_from(["notegraph", "layout", "--input", "graph.json"]).unwrap();
        match cli.command {
            Commands::Layout {
                input,
                output,
                config,
                seed,
                max_ticks,
                width,
                height,
                ..
            } => {
                assert_eq!(input, PathBuf::from("graph.json"));
                assert!(output.is_none());
                assert!(config.is_none());
                assert!(seed.is_none());
                assert_eq!(max_ticks, 2000);
                assert_eq!(width, 800.0);
                assert_eq!(height, 600.0);
            }
            _ => panic!("Expected Layout command"),
        }
    }

    #[test]
    fn cli_parses_layout_options() {
        let cli = Cli::try_parse_from([
            "notegraph",
            "layout",
            "-i",
            "graph.json",
            "-o",
            "out.json",
            "-c",
            "layout.yaml",
            "--seed",
            "9",
            "--max-ticks",
            "300",
        ])
        .unwrap();
        match cli.command {
            Commands::Layout {
                output,
                config,
                seed,
                max_ticks,
                ..
            } => {
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert_eq!(config, Some(PathBuf::from("layout.yaml")));
                assert_eq!(seed, Some(9));
                assert_eq!(max_ticks, 300);
            }
            _ => panic!("Expected Layout command"),
        }
    }

    #[test]
    fn cli_parses_config_format() {
        let cli = Cli::try_parse_from(["notegraph", "config", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Config { format } => assert_eq!(format, ConfigFormat::Json),
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn cli_requires_input_for_layout() {
        assert!(Cli::try_parse_from(["notegraph", "layout"]).is_err());
    }
}

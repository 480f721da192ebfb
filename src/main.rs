use clap::{Parser, Subcommand};
use mason::config::{FileConfig, InvocationConfig};
use mason::registry::render_build_vars;
use mason::subprocess::{OutputRelay, ProcessCommand, ProcessCommandBuilder, ToolRunner};
use mason::term::StdoutProbe;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Run a graph-driven build tool with live output
#[derive(Parser)]
#[command(name = "mason")]
#[command(about = "Wrap a parallel build tool with readable live output", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the wrapped build tool and emit exported build variables
    Build {
        /// Path to the build tool executable
        #[arg(long)]
        tool: Option<PathBuf>,

        /// Output directory for generated build files
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,

        /// Target to build for; part of the cache key
        #[arg(long, default_value = "generic")]
        target: String,

        /// Path to a mason.toml with tool defaults
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// Extra arguments passed through to the tool
        #[arg(trailing_var_arg = true)]
        tool_args: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build {
            tool,
            out_dir,
            target,
            config,
            tool_args,
        } => run_build(tool, out_dir, target, config, tool_args).await,
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_build(
    tool: Option<PathBuf>,
    out_dir: PathBuf,
    target: String,
    config_path: Option<PathBuf>,
    tool_args: Vec<String>,
) -> anyhow::Result<()> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from("mason.toml"));
    let file_config = FileConfig::load(&config_path)?;

    let tool = tool.or(file_config.tool).ok_or_else(|| {
        anyhow::anyhow!("no build tool configured; pass --tool or set `tool` in mason.toml")
    })?;

    let mut args = file_config.tool_args;
    args.extend(tool_args);

    let config = InvocationConfig::new(out_dir, target, args);
    debug!("cache-key suffix: {}", config.cache_suffix());

    let command = tool_command(&tool, &config);
    let relay = OutputRelay::new(StdoutProbe, std::io::stdout(), std::io::stderr());
    ToolRunner.run(command, relay).await?;

    // Single export pass: drain what the build rules registered, in
    // deterministic order.
    let vars = config.exports().export_build_vars();
    let mut stdout = std::io::stdout();
    stdout.write_all(render_build_vars(&vars).as_bytes())?;
    stdout.flush()?;

    Ok(())
}

fn tool_command(tool: &Path, config: &InvocationConfig) -> ProcessCommand {
    ProcessCommandBuilder::new(&tool.to_string_lossy())
        .arg("--manifest")
        .arg(&config.manifest_file().to_string_lossy())
        .arg(&format!("--suffix={}", config.cache_suffix()))
        .arg("--regen")
        .args(config.tool_args())
        .envs(config.environ())
        .build()
}

use clap::{Parser, Subcommand, ValueEnum};
use anyhow::Result;
use std::path::PathBuf;
use gltf_merge::prelude::{BufferOutput, GltfOptimizer, IndexWidth, OptimizerConfig};

#[derive(Parser)]
#[command(name = "gltf-merge")]
#[command(about = "Reduces the draw calls of glTF scenes by merging compatible meshes")]
struct Cli {
    /// Directory the input files are read from
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory the optimized files are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// JSON config file; flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the binary buffer of .gltf output to a separate .bin file
    #[arg(long)]
    separate_buffers: bool,

    /// Index width of merged meshes
    #[arg(long, value_enum)]
    index_width: Option<IndexWidthArg>,

    /// Bake and concatenate merge buckets in parallel
    #[arg(long)]
    parallel: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Optimize the given files from the input directory
    Optimize {
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Optimize every .gltf/.glb file of the input directory
    All,
    /// List the .gltf/.glb files of the input directory
    List,
    /// Delete the output directory
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum IndexWidthArg {
    U16,
    U32,
}

impl From<IndexWidthArg> for IndexWidth {
    fn from(arg: IndexWidthArg) -> Self {
        match arg {
            IndexWidthArg::U16 => IndexWidth::U16,
            IndexWidthArg::U32 => IndexWidth::U32,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let optimizer = GltfOptimizer::new(load_config(&cli).await?);

    match cli.command {
        Command::Optimize { files } => {
            let outcomes = optimizer.optimize_multiple(&files).await?;
            report(&outcomes)
        }
        Command::All => {
            let outcomes = optimizer.optimize_all().await?;
            report(&outcomes)
        }
        Command::List => {
            for file in optimizer.available_files().await? {
                println!("{}", file);
            }
            Ok(())
        }
        Command::Clear => {
            optimizer.clear_output().await?;
            Ok(())
        }
    }
}

async fn load_config(cli: &Cli) -> Result<OptimizerConfig> {
    let mut config = match &cli.config {
        Some(path) => OptimizerConfig::from_json_file(path).await
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?,
        None => OptimizerConfig::default(),
    };
    if let Some(dir) = &cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if cli.separate_buffers {
        config.encode.buffer_output = BufferOutput::Separate;
    }
    if let Some(width) = cli.index_width {
        config.merge.index_width = width.into();
    }
    if cli.parallel {
        config.merge.parallel = true;
    }
    Ok(config)
}

fn report(outcomes: &[gltf_merge::optimizer::FileOutcome]) -> Result<()> {
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    log::info!("{} of {} files optimized", outcomes.len() - failed, outcomes.len());
    if failed > 0 {
        anyhow::bail!("{} file(s) failed to optimize", failed);
    }
    Ok(())
}

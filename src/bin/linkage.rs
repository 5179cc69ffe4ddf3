//! Linkage CLI
//!
//! Runs description scripts, checks and compiles single descriptions, and
//! manages configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use linkage_config::{
    load, new_delimited_file_schema, new_fixed_width_file_schema, serialize, validate, Compiled,
    DescriptorKind, LinkageConfig, Script,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "linkage")]
#[command(about = "Compile record-linkage schema and comparator descriptions")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    FixedWidth,
    Delimited,
    Comparator,
}

impl From<Kind> for DescriptorKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::FixedWidth => DescriptorKind::FixedWidthSchema,
            Kind::Delimited => DescriptorKind::DelimitedSchema,
            Kind::Comparator => DescriptorKind::RecordComparator,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script document
    Run {
        /// Script file (JSON array of statements)
        script: PathBuf,
    },

    /// Validate a description without building it
    Check {
        #[arg(short, long, value_enum)]
        kind: Kind,
        file: PathBuf,
    },

    /// Build a schema description and print its canonical form
    Compile {
        #[arg(short, long, value_enum)]
        kind: Kind,
        file: PathBuf,
        /// Write the canonical description here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// View and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "linkage.toml")]
        output: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = LinkageConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Run { script } => {
            let path = cfg.script_path(&script);
            let mut env = Script::with_config(&cfg);
            env.run(&path)?;

            println!("✅ {} ran", path.display());
            for name in env.ls() {
                if let Some(object) = env.get(name) {
                    println!("  {} ({})", name, object.kind_name());
                }
            }
        }

        Commands::Check { kind, file } => {
            let description = load(&file)?;
            let kind = DescriptorKind::from(kind);
            validate(kind, &description)?;
            println!("✅ {} is a valid {} description", file.display(), kind);
        }

        Commands::Compile { kind, file, output } => {
            let description = load(&file)?;
            let schema = match kind {
                Kind::FixedWidth => new_fixed_width_file_schema(&description)?,
                Kind::Delimited => new_delimited_file_schema(&description)?,
                Kind::Comparator => anyhow::bail!("record comparators have no canonical description"),
            };
            let object = Compiled::from(schema);

            match output {
                Some(path) => {
                    let checksum = serialize::write(&object, &path, cfg.output.format)?;
                    println!("✅ Wrote {} ({})", path.display(), checksum.short());
                }
                None => {
                    println!("{}", serialize::to_text(&object, cfg.output.format)?);
                    let checksum = linkage_config::Checksum::from_json(&serialize::to_canonical(&object)?);
                    eprintln!("checksum: {}", checksum);
                }
            }
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show { toml, json } => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&cfg)?);
                } else if toml {
                    println!("{}", ::toml::to_string_pretty(&cfg)?);
                } else {
                    println!("📋 Linkage Configuration\n");
                    println!("Output:");
                    println!("  Format: {:?}", cfg.output.format);
                    println!("\nScript:");
                    println!("  Max depth: {}", cfg.script.max_depth);
                    println!("  Base dir: {:?}", cfg.script.base_dir);
                }
            }

            ConfigCommands::Init { output } => {
                LinkageConfig::default().save(&output)?;
                println!("✅ Created config file: {}", output);
            }
        },
    }

    Ok(())
}

use anyhow::{Context as AnyhowContext, Result};
use ckg_graph::CkgConfig;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::io;
use std::path::PathBuf;

mod commands;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "ckg")]
#[command(about = "Code knowledge graph queries over a Python project", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph and print its size
    Build(RootArgs),

    /// Methods of a file whose qualified name contains a fragment
    Lookup(LookupArgs),

    /// Methods whose name contains a fragment
    Fuzzy(NameArgs),

    /// All relationship groups of a symbol
    Relations(LookupArgs),

    /// Classes and methods of a file
    #[command(name = "file-symbols")]
    FileSymbols(FileArgs),

    /// Constructors of a class
    Constructor(ClassArgs),

    /// Variables by exact name, or by qualified-name fragment when it has a dot
    Variables(VariablesArgs),

    /// Files whose symbols mention a keyword
    Files(KeywordArgs),

    /// Symbols calling (or referencing) a qualified name
    Callers(CallersArgs),

    /// Definition and reference tags
    Tags(TagsArgs),

    /// Structural tree of the project
    Structure(RootArgs),
}

#[derive(Args)]
struct RootArgs {
    /// Project root (defaults to current directory)
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[derive(Args)]
struct LookupArgs {
    #[command(flatten)]
    root: RootArgs,

    /// File path, absolute or relative to the root
    #[arg(long)]
    file: String,

    /// Fully qualified name (or a fragment of one, for lookup)
    #[arg(long)]
    fqn: String,
}

#[derive(Args)]
struct NameArgs {
    #[command(flatten)]
    root: RootArgs,

    #[arg(long)]
    name: String,
}

#[derive(Args)]
struct FileArgs {
    #[command(flatten)]
    root: RootArgs,

    #[arg(long)]
    file: String,
}

#[derive(Args)]
struct ClassArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Simple class name
    #[arg(long = "class")]
    class: String,
}

#[derive(Args)]
struct VariablesArgs {
    #[command(flatten)]
    root: RootArgs,

    #[arg(long)]
    name: String,

    /// Restrict to one file
    #[arg(long)]
    file: Option<String>,
}

#[derive(Args)]
struct KeywordArgs {
    #[command(flatten)]
    root: RootArgs,

    #[arg(long)]
    keyword: String,
}

#[derive(Args)]
struct CallersArgs {
    #[command(flatten)]
    root: RootArgs,

    #[arg(long)]
    fqn: String,

    /// Follow REFERENCES edges instead of CALLS
    #[arg(long)]
    references: bool,
}

#[derive(Args)]
struct TagsArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Tag a single file instead of the whole project
    #[arg(long)]
    file: Option<String>,
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = CkgConfig::resolve(cli.config.as_deref()).context("Invalid configuration")?;
    let output = run(cli.command, &config)?;
    print_stdout(&serde_json::to_string_pretty(&output)?)
}

fn run(command: Commands, config: &CkgConfig) -> Result<Value> {
    match command {
        Commands::Build(args) => commands::build(&args.root, config),
        Commands::Lookup(args) => commands::lookup(&args.root.root, config, &args.file, &args.fqn),
        Commands::Fuzzy(args) => commands::fuzzy(&args.root.root, config, &args.name),
        Commands::Relations(args) => {
            commands::relations(&args.root.root, config, &args.file, &args.fqn)
        }
        Commands::FileSymbols(args) => commands::file_symbols(&args.root.root, config, &args.file),
        Commands::Constructor(args) => commands::constructor(&args.root.root, config, &args.class),
        Commands::Variables(args) => {
            commands::variables(&args.root.root, config, &args.name, args.file.as_deref())
        }
        Commands::Files(args) => commands::files(&args.root.root, config, &args.keyword),
        Commands::Callers(args) => {
            commands::callers(&args.root.root, config, &args.fqn, args.references)
        }
        Commands::Tags(args) => commands::tags(&args.root.root, config, args.file.as_deref()),
        Commands::Structure(args) => commands::structure(&args.root, config),
    }
}

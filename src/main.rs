//! dirassoc - Associate values with files and directories.
//!
//! Usage:
//!   dirassoc import DIR [-o TREE]     Import a directory, associating file sizes
//!   dirassoc export TREE [-o FILE]    Flat export of a saved tree
//!   dirassoc show TREE                Print the directory hierarchy
//!   dirassoc get TREE PATH            Print the association of one file
//!   dirassoc --help                   Show help

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, bail, eyre};
use tracing_subscriber::EnvFilter;

use dirassoc_core::{AssociationTree, NodeId, TreeConfig};
use dirassoc_scan::{DirectoryImporter, ImportConfig};

#[derive(Parser)]
#[command(
    name = "dirassoc",
    version,
    about = "Associate values with files and directories",
    long_about = "dirassoc keeps a case-insensitive tree of directories and files, \
                  each carrying an associated value. Trees are saved as JSON relative \
                  to a base directory so they can be moved between machines."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a directory, associating every file with its size in bytes
    Import {
        /// Directory to import
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output file for the tree (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Base directory stored in the tree (defaults to the imported directory)
        #[arg(short, long)]
        base: Option<PathBuf>,

        /// Only import files directly inside the directory
        #[arg(long)]
        no_recursive: bool,

        /// Associate directories with their entry count
        #[arg(long)]
        associate_dirs: bool,

        /// Skip hidden files and directories
        #[arg(long)]
        skip_hidden: bool,

        /// Glob patterns of names to skip
        #[arg(short, long = "ignore")]
        ignore: Vec<String>,

        /// Number of threads for directory reads (0 = auto)
        #[arg(short, long, default_value = "0")]
        threads: usize,
    },

    /// Write a saved tree as separator-delimited text
    Export {
        /// Saved tree (JSON)
        tree: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column separator ("tab" or a single character)
        #[arg(short, long, default_value = "tab")]
        separator: String,

        /// Render sizes in human-readable form
        #[arg(long)]
        human: bool,

        /// Replace the stored base directory
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Print the directory hierarchy of a saved tree
    Show {
        /// Saved tree (JSON)
        tree: PathBuf,

        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Print the association of a file
    Get {
        /// Saved tree (JSON)
        tree: PathBuf,

        /// File path relative to the tree's base directory
        path: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Import {
            path,
            output,
            base,
            no_recursive,
            associate_dirs,
            skip_hidden,
            ignore,
            threads,
        } => {
            let config = ImportConfig::builder()
                .root(path.canonicalize().context("Invalid path")?)
                .include_subdirectories(!no_recursive)
                .associate_directories(associate_dirs)
                .include_hidden(!skip_hidden)
                .ignore_patterns(ignore)
                .threads(threads)
                .build()?;
            let base = match base {
                Some(base) => base.canonicalize().context("Invalid base directory")?,
                None => config.root.clone(),
            };
            run_import(&config, &base, output)?;
        }
        Command::Export {
            tree,
            output,
            separator,
            human,
            base,
        } => {
            run_export(&tree, output, parse_separator(&separator)?, human, base)?;
        }
        Command::Show { tree, depth } => {
            run_show(&tree, depth)?;
        }
        Command::Get { tree, path } => {
            run_get(&tree, &path)?;
        }
    }

    Ok(())
}

/// Initialize the tracing subscriber, honoring `RUST_LOG`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "dirassoc=debug" } else { "dirassoc=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Import a directory and save the resulting tree.
fn run_import(config: &ImportConfig, base: &Path, output: Option<PathBuf>) -> Result<()> {
    eprintln!("Importing {}...", config.root.display());

    let mut tree: AssociationTree<u64> =
        AssociationTree::with_config(base.to_string_lossy(), &TreeConfig::default());
    let mut directory_associator = |path: &str| {
        std::fs::read_dir(path)
            .map(|entries| entries.count() as u64)
            .unwrap_or(0)
    };
    let mut file_associator = |path: &str| match std::fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(err) => {
            tracing::warn!(path, error = %err, "could not read file size");
            0
        }
    };

    let summary = DirectoryImporter::new()
        .import(
            &mut tree,
            config,
            Some(&mut directory_associator),
            &mut file_associator,
        )
        .context("Import failed")?;

    eprintln!(
        " {} files in {} directories ({} skipped) in {:.2}s",
        summary.files_added,
        summary.directories_visited,
        summary.skipped,
        summary.elapsed.as_secs_f64()
    );

    match output {
        Some(output_path) => {
            tree.save(&output_path).context("Failed to save tree")?;
            eprintln!("Saved to {}", output_path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            tree.to_writer(&mut handle)?;
            writeln!(handle)?;
        }
    }

    Ok(())
}

/// Export a saved tree as delimited text.
fn run_export(
    path: &Path,
    output: Option<PathBuf>,
    separator: char,
    human: bool,
    base: Option<String>,
) -> Result<()> {
    let mut tree = load_tree(path)?;
    if let Some(base) = base {
        tree.set_base_directory(base);
    }

    let render = |size: &u64| {
        if human {
            format_size(*size)
        } else {
            size.to_string()
        }
    };

    match output {
        Some(output_path) => {
            tree.export_file_with(&output_path, separator, render)
                .context("Export failed")?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            tree.export_with(&mut handle, separator, render)?;
        }
    }

    Ok(())
}

/// Print the hierarchy of a saved tree.
fn run_show(path: &Path, max_depth: Option<usize>) -> Result<()> {
    let tree = load_tree(path)?;
    let stats = tree.stats();

    println!();
    println!("{}", "─".repeat(60));
    println!(" {}", tree.directory(tree.root()));
    println!(
        " {} files, {} directories, depth {}",
        stats.total_files, stats.total_dirs, stats.max_depth
    );
    println!("{}", "─".repeat(60));
    println!();

    print_node(&tree, tree.root(), 0, max_depth.unwrap_or(usize::MAX));
    Ok(())
}

/// Print the association of a single file.
fn run_get(path: &Path, file: &str) -> Result<()> {
    let tree = load_tree(path)?;
    match tree.get_file(file) {
        Some(size) => {
            println!("{size}");
            Ok(())
        }
        None => bail!("{file} is not in the tree"),
    }
}

fn load_tree(path: &Path) -> Result<AssociationTree<u64>> {
    AssociationTree::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Print a directory node, its files and its children.
fn print_node(tree: &AssociationTree<u64>, id: NodeId, depth: usize, max_depth: usize) {
    let node = tree.node(id);
    let indent = "  ".repeat(depth);

    let name = if id == tree.root() {
        tree.directory(id)
    } else {
        node.name().to_string()
    };
    let association = node
        .directory_association()
        .map(|count| format!("{count} entries"))
        .unwrap_or_default();
    println!("{indent}▼ {name}/ {association}");

    if depth >= max_depth {
        return;
    }

    for (file, size) in node.file_entries() {
        println!("{indent}    {:<40} {:>10}", file, format_size(*size));
    }
    for &child in node.children() {
        print_node(tree, child, depth + 1, max_depth);
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a column separator: "tab" or a single character.
fn parse_separator(s: &str) -> Result<char> {
    match s {
        "tab" | "\\t" => return Ok('\t'),
        _ => {}
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '\n' && c != '\r' => Ok(c),
        _ => Err(eyre!("Separator must be \"tab\" or a single character, got {s:?}")),
    }
}

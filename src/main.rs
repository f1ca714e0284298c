//! respak CLI - inspect and extract embedded resource archives.
//!
//! This is the main entry point for the respak command-line application.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use respak::archive::crypto::KeyMaterial;
use respak::prelude::*;

/// respak - embedded resource archive tool
#[derive(Parser)]
#[command(name = "respak")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads an archive.
#[derive(clap::Args)]
struct ArchiveArgs {
    /// Path to the archive file
    #[arg(short, long, env = "RESPAK_ARCHIVE")]
    archive: PathBuf,

    /// Byte order of the archive's integer fields (little or big)
    #[arg(long, env = "RESPAK_BYTE_ORDER", default_value = "little")]
    byte_order: ByteOrder,

    /// Fail when a decoded payload does not match its declared length
    #[arg(long)]
    strict: bool,
}

impl ArchiveArgs {
    fn resolver(&self) -> Result<ResourceResolver> {
        let policy = if self.strict {
            LengthPolicy::Strict
        } else {
            LengthPolicy::Warn
        };
        let config = ResolverConfig::new(&self.archive)
            .with_byte_order(self.byte_order)
            .with_length_policy(policy);

        ResourceResolver::new(config).context("Failed to open archive")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the records of an archive
    List {
        #[command(flatten)]
        archive: ArchiveArgs,

        /// Filter pattern for identifiers (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,

        /// Print the records as JSON
        #[arg(long, conflicts_with = "detailed")]
        json: bool,
    },

    /// Resolve one resource and write its bytes
    Get {
        #[command(flatten)]
        archive: ArchiveArgs,

        /// Namespace (`web`, `config` or a literal prefix)
        #[arg(short, long, default_value = "web")]
        namespace: String,

        /// Logical path of the resource
        #[arg(short, long)]
        path: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve every logical path listed in a manifest file
    Extract {
        #[command(flatten)]
        archive: ArchiveArgs,

        /// Namespace (`web`, `config` or a literal prefix)
        #[arg(short, long, default_value = "web")]
        namespace: String,

        /// Manifest with one logical path per line
        #[arg(short, long)]
        paths: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show the identifier and key material derived for a resource
    Hash {
        /// Namespace (`web`, `config` or a literal prefix)
        #[arg(short, long, default_value = "web")]
        namespace: String,

        /// Logical path of the resource
        #[arg(short, long)]
        path: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            archive,
            filter,
            detailed,
            json,
        } => {
            cmd_list(&archive, filter.as_deref(), detailed, json)?;
        }
        Commands::Get {
            archive,
            namespace,
            path,
            output,
        } => {
            cmd_get(&archive, namespace_prefix(&namespace), &path, output.as_deref())?;
        }
        Commands::Extract {
            archive,
            namespace,
            paths,
            output,
        } => {
            cmd_extract(&archive, namespace_prefix(&namespace), &paths, &output)?;
        }
        Commands::Hash { namespace, path } => {
            cmd_hash(namespace_prefix(&namespace), &path);
        }
    }

    Ok(())
}

/// Map the short namespace names to their prefixes; anything else is used
/// verbatim.
fn namespace_prefix(namespace: &str) -> &str {
    match namespace {
        "web" => WEB_NAMESPACE,
        "config" => CONFIG_NAMESPACE,
        other => other,
    }
}

fn cmd_list(args: &ArchiveArgs, filter: Option<&str>, detailed: bool, json: bool) -> Result<()> {
    let resolver = args.resolver()?;

    let filter = filter.map(build_filter).transpose()?;
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let start = Instant::now();
    let headers: Vec<RecordHeader> = resolver
        .list()
        .context("Failed to read archive records")?
        .into_iter()
        .filter(|h| {
            filter
                .as_ref()
                .map_or(true, |pattern| pattern.matches_with(h.identifier(), options))
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&headers)?);
        return Ok(());
    }

    for header in &headers {
        if detailed {
            println!(
                "{:>12} {:>12} {}{} {:<5} {}",
                header.offset(),
                header.declared_length(),
                if header.is_cooked() { "C" } else { " " },
                if hash::is_secure_identifier(header.identifier()) { "S" } else { " " },
                header.recipe_tag(),
                header.identifier()
            );
        } else {
            println!("{}", header.identifier());
        }
    }

    println!("\nTotal: {} records in {:?}", headers.len(), start.elapsed());

    Ok(())
}

fn cmd_get(args: &ArchiveArgs, namespace: &str, path: &str, output: Option<&Path>) -> Result<()> {
    let resolver = args.resolver()?;

    let resource = resolver
        .resolve(path, namespace)
        .with_context(|| format!("Failed to resolve {namespace}{path}"))?
        .with_context(|| format!("Resource not found: {namespace}{path}"))?;

    eprintln!(
        "{} ({} bytes, recipe {})",
        resource.content_type(),
        resource.data().len(),
        resource.recipe()
    );

    match output {
        Some(output) => {
            fs::write(output, resource.data()).context("Failed to write output file")?;
        }
        None => {
            std::io::stdout()
                .write_all(resource.data())
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

fn cmd_extract(args: &ArchiveArgs, namespace: &str, manifest: &Path, output: &Path) -> Result<()> {
    let resolver = args.resolver()?;

    let manifest = fs::read_to_string(manifest).context("Failed to read manifest")?;
    let paths: Vec<&str> = manifest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    println!("Extracting {} resources...", paths.len());

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    let mut extracted = 0;
    let mut missing = Vec::new();

    for path in &paths {
        let target = output_path(output, path)?;

        match resolver.resolve(path, namespace) {
            Ok(Some(resource)) => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, resource.data())?;
                extracted += 1;
            }
            Ok(None) => missing.push(*path),
            Err(e) => {
                pb.abandon();
                return Err(e).with_context(|| format!("Failed to resolve {namespace}{path}"));
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!(
        "Extracted {} resources in {:?} ({} not found)",
        extracted,
        start.elapsed(),
        missing.len()
    );
    for path in missing {
        println!("  missing: {path}");
    }

    Ok(())
}

fn cmd_hash(namespace: &str, path: &str) {
    let lookup = hash::lookup_string(namespace, path);
    let material = KeyMaterial::derive(&lookup);

    println!("lookup:     {lookup}");
    println!("identifier: {}", hash::secure_identifier(&lookup));
    println!("key:        {}", hex::encode(material.key()));
    println!("nonce:      {}", hex::encode(material.nonce()));
}

/// Compile a `--filter` pattern. A pattern without wildcards matches any
/// identifier containing it.
fn build_filter(pattern: &str) -> Result<Pattern> {
    let pattern = if pattern.contains(|c| matches!(c, '*' | '?' | '[')) {
        pattern.to_string()
    } else {
        format!("*{}*", Pattern::escape(pattern))
    };

    Pattern::new(&pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))
}

/// Place a logical path under the output directory, refusing paths that
/// climb out of it.
fn output_path(output: &Path, logical_path: &str) -> Result<PathBuf> {
    let mut path = output.to_path_buf();
    for component in Path::new(logical_path).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                anyhow::bail!("Refusing to write outside the output directory: {logical_path}")
            }
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matching() {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        let matches = |pattern: &str, name: &str| {
            build_filter(pattern).unwrap().matches_with(name, options)
        };

        assert!(matches("config/*", "config/io-config.xml"));
        assert!(matches("*.xml", "config/io-config.xml"));
        assert!(matches("*.xml", "config/a.xml.xml"));
        assert!(matches("www*.html", "wwwa.html.html"));
        assert!(matches("*.XML", "config/io-config.xml"));
        assert!(!matches("*.html", "config/io-config.xml"));
        assert!(!matches("www*", "config/wwwx"));
        assert!(matches("io-config", "config/io-config.xml"));
        assert!(build_filter("[").is_err());
    }

    #[test]
    fn test_output_path_stays_inside() {
        let root = Path::new("out");
        assert_eq!(
            output_path(root, "/css/app.css").unwrap(),
            Path::new("out").join("css").join("app.css")
        );
        assert_eq!(output_path(root, "./a.html").unwrap(), root.join("a.html"));
        assert!(output_path(root, "../../x").is_err());
        assert!(output_path(root, "css/../../x").is_err());
    }

    #[test]
    fn test_namespace_prefix() {
        assert_eq!(namespace_prefix("web"), "www");
        assert_eq!(namespace_prefix("config"), "config/");
        assert_eq!(namespace_prefix("assets/"), "assets/");
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

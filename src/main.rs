use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use syndic::syndication::{supported_versions, FormatKind};
use syndic::{LoadSettings, SyndicationDocument};

/// SEC-001: Documents larger than this are refused before reading.
const MAX_DOCUMENT_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(
    name = "syndic",
    about = "Detect and read syndication documents (RSS, Atom, OPML, RSD, APML, BlogML)"
)]
struct Args {
    /// Load settings from a TOML file
    #[arg(long, value_name = "FILE", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the detected format and version of a document
    Detect {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Read a document into its typed model
    Fill {
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Expected format (defaults to the detected one)
        #[arg(long, short)]
        format: Option<FormatKind>,

        /// Print the filled document as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported formats and versions
    Formats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => LoadSettings::load(path)
            .with_context(|| format!("Failed to load settings from '{}'", path.display()))?,
        None => LoadSettings::default(),
    };

    match args.command {
        Command::Detect { path } => {
            let bytes = read_document(&path).await?;
            let fingerprint = syndic::detect(&bytes, &settings)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            println!("{fingerprint}");
        }
        Command::Fill { path, format, json } => {
            let bytes = read_document(&path).await?;
            let loaded = syndic::load(&bytes, format, &settings)
                .with_context(|| format!("Failed to load '{}'", path.display()))?;

            if json {
                let out = serde_json::to_string_pretty(&loaded)
                    .context("Failed to serialize document")?;
                println!("{out}");
            } else {
                println!("{} via {} reader", loaded.fingerprint, loaded.variant);
                println!("{}", summarize(&loaded.document));
            }
        }
        Command::Formats => {
            for format in FormatKind::CONCRETE {
                let versions: Vec<String> =
                    supported_versions(format).map(|v| v.to_string()).collect();
                println!("{format:<8} {}", versions.join(", "));
            }
        }
    }

    Ok(())
}

async fn read_document(path: &Path) -> Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Cannot access '{}'", path.display()))?;
    if metadata.len() > MAX_DOCUMENT_SIZE {
        anyhow::bail!(
            "'{}' is {} bytes, larger than the {} byte limit",
            path.display(),
            metadata.len(),
            MAX_DOCUMENT_SIZE
        );
    }

    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))
}

/// One-line description of a filled document.
fn summarize(document: &SyndicationDocument) -> String {
    fn or_untitled(title: Option<&str>) -> &str {
        title.filter(|t| !t.is_empty()).unwrap_or("(untitled)")
    }

    match document {
        SyndicationDocument::Apml(apml) => format!(
            "{}: {} profile(s)",
            or_untitled(apml.head.title.as_deref()),
            apml.profiles.len()
        ),
        SyndicationDocument::AtomFeed(feed) => format!(
            "{}: {} entr(y/ies)",
            or_untitled(feed.title.as_ref().map(|t| t.value.as_str())),
            feed.entries.len()
        ),
        SyndicationDocument::AtomEntry(entry) => {
            or_untitled(entry.title.as_ref().map(|t| t.value.as_str())).to_string()
        }
        SyndicationDocument::BlogML(blog) => format!(
            "{}: {} post(s), {} categor(y/ies)",
            or_untitled(blog.title.as_ref().map(|t| t.value.as_str())),
            blog.posts.len(),
            blog.categories.len()
        ),
        SyndicationDocument::Opml(opml) => format!(
            "{}: {} top-level outline(s)",
            or_untitled(opml.head.title.as_deref()),
            opml.outlines.len()
        ),
        SyndicationDocument::Rsd(rsd) => format!(
            "{}: {} API(s)",
            or_untitled(rsd.engine_name.as_deref()),
            rsd.apis.len()
        ),
        SyndicationDocument::Rss(feed) => format!(
            "{}: {} item(s)",
            or_untitled(Some(feed.channel.title.as_str())),
            feed.channel.items.len()
        ),
    }
}

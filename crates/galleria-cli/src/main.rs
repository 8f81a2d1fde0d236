use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use galleria_core::manifest::{self, NoManifest};
use galleria_core::sync::SyncOutcome;
use galleria_core::upload::CompactOptions;
use galleria_core::{
    AddByPath, EditableRegionRegistry, Gallery, Repository, StoreImpl, SyncDispatcher, Transition,
    UploadForm,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod config;
mod page;

#[derive(Parser)]
#[command(name = "galleria", version, about = "Galleria photo-page editor")]
struct Cli {
    /// Local state database (overrides settings)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Photo manifest: file path or http(s) URL (overrides settings)
    #[arg(long, global = true)]
    manifest: Option<String>,
    /// Ignore the manifest and show local photos only
    #[arg(long, global = true, default_value_t = false)]
    no_manifest: bool,
    /// Push owner changes to this endpoint (overrides settings)
    #[arg(long, global = true)]
    sync_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the photo grid as HTML
    Render {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// Emit theme style, tag options and grid together
        #[arg(long)]
        document: bool,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List photos in display order
    List {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List tags available for filtering
    Tags,
    /// Add a photo that already lives next to the page
    Add {
        #[arg(long)]
        src: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        date: String,
        /// Comma-separated
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Upload an image file; it is stored inline as a data URI
    Upload {
        file: PathBuf,
        #[arg(long, default_value = "")]
        description: String,
        /// Comma-separated; only the first two are kept
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete local photos by image source
    Delete { src: String },
    /// Run one edit session on a page file: enter edit mode, apply changes, leave
    Edit {
        #[arg(long)]
        page: PathBuf,
        /// ID=MARKUP, repeatable
        #[arg(long = "set", value_parser = page::parse_assignment)]
        sets: Vec<(String, String)>,
    },
    /// Apply saved text to a page file
    Restore {
        #[arg(long)]
        page: PathBuf,
    },
    /// Background color and hero image
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Push current owner state to the sync endpoint now
    Sync,
    /// Show effective settings and paths
    Config {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Set the page background color
    Bg { color: String },
    /// Set the hero image: a path next to the page, or --file to embed one
    Hero {
        source: String,
        #[arg(long)]
        file: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn sync_dispatcher(endpoint: Option<&str>) -> Result<SyncDispatcher> {
    let Some(url) = endpoint.filter(|u| !u.trim().is_empty()) else {
        return Ok(SyncDispatcher::disabled());
    };
    #[cfg(feature = "http")]
    {
        let transport = galleria_core::sync::http::HttpTransport::new(url)?;
        Ok(SyncDispatcher::new(Arc::new(transport)))
    }
    #[cfg(not(feature = "http"))]
    {
        tracing::warn!(url, "built without http support; sync disabled");
        Ok(SyncDispatcher::disabled())
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let settings = config::load_settings();

    if let Commands::Config { json } = &cli.command {
        return print_config(&settings, *json);
    }

    let db_path = cli
        .db
        .clone()
        .or_else(|| settings.storage.db_path.clone())
        .unwrap_or_else(config::default_db_path);
    if let Some(dir) = db_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let store = StoreImpl::new(&db_path)
        .with_context(|| format!("opening {}", db_path.display()))?;

    let endpoint = cli
        .sync_url
        .clone()
        .or_else(|| settings.sync.as_ref().and_then(|s| s.endpoint.clone()));
    let sync = sync_dispatcher(endpoint.as_deref())?;

    let upload = settings.upload.clone().unwrap_or_default();
    let defaults = CompactOptions::default();
    let compact = CompactOptions {
        max_edge: upload.max_edge.unwrap_or(defaults.max_edge),
        jpeg_quality: upload.jpeg_quality.unwrap_or(defaults.jpeg_quality),
    };

    let mut gallery = Gallery::open(Repository::new(Box::new(store)), sync)
        .with_compact_options(compact);

    if !cli.no_manifest {
        let location = cli
            .manifest
            .clone()
            .or_else(|| settings.manifest.as_ref().and_then(|m| m.location.clone()))
            .unwrap_or_else(|| "photos.json".to_string());
        gallery.load(manifest::source_for(&location).as_ref());
    } else {
        gallery.load(&NoManifest);
    }

    let result = run(&mut gallery, cli.command);
    if gallery.has_unsaved_photos() {
        eprintln!("warning: storage refused the write; photo changes last only for this run");
    }
    for outcome in gallery.wait_for_sync() {
        if outcome == SyncOutcome::Failed {
            eprintln!("warning: sync failed (changes are saved locally)");
        }
    }
    result
}

fn run(gallery: &mut Gallery, command: Commands) -> Result<()> {
    match command {
        Commands::Render {
            query,
            tag,
            document,
            out,
        } => {
            gallery.set_query(query.unwrap_or_default());
            gallery.set_tag(tag.unwrap_or_default());
            let html = if document {
                format!(
                    "<style>{}</style>\n<select id=\"tagFilter\">{}</select>\n<div id=\"galleryGrid\">\n{}</div>\n",
                    gallery.render_theme(),
                    gallery.render_tag_options(),
                    gallery.render()
                )
            } else {
                gallery.render()
            };
            match out {
                Some(path) => std::fs::write(&path, html)?,
                None => print!("{}", html),
            }
        }
        Commands::List { query, tag, json } => {
            gallery.set_query(query.unwrap_or_default());
            gallery.set_tag(tag.unwrap_or_default());
            let items = gallery.view();
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for p in items {
                    println!(
                        "{}\t{}\t{}\t{}",
                        preview(&p.image_source),
                        p.title,
                        p.date.unwrap_or_default(),
                        p.tags.join(",")
                    );
                }
            }
        }
        Commands::Tags => {
            for t in gallery.tag_options() {
                println!("{}", t);
            }
        }
        Commands::Add {
            src,
            title,
            date,
            tags,
            description,
        } => {
            let p = gallery.add_by_path(AddByPath {
                src,
                title,
                date,
                tags,
                description,
            })?;
            println!("added {}", p.image_source);
        }
        Commands::Upload {
            file,
            description,
            tags,
            title,
            date,
        } => {
            let bytes =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let p = gallery.upload(UploadForm {
                file_name: file
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                bytes,
                description,
                tags,
                title,
                date,
            })?;
            println!("uploaded {} [{}]", p.title, p.tags.join(","));
        }
        Commands::Delete { src } => {
            let n = gallery.delete(&src)?;
            println!("deleted {} local photo(s)", n);
        }
        Commands::Edit { page: path, sets } => {
            let mut regions = page::load(&path)?;
            gallery.restore_texts(&mut regions);
            gallery.toggle_edit(&mut regions);
            for (id, markup) in &sets {
                if !regions.set_content(id, markup) {
                    anyhow::bail!("page has no region {}", id);
                }
            }
            match gallery.toggle_edit(&mut regions) {
                Transition::Exited { changed: Some(s) } => {
                    page::save(&path, &regions)?;
                    println!("saved {} region(s)", s.len());
                }
                _ => println!("no changes"),
            }
        }
        Commands::Restore { page: path } => {
            let mut regions = page::load(&path)?;
            let n = gallery.restore_texts(&mut regions);
            if n > 0 {
                page::save(&path, &regions)?;
            }
            println!("restored {} region(s)", n);
        }
        Commands::Theme { action } => match action {
            ThemeAction::Show { json } => {
                let theme = gallery.theme();
                if json {
                    println!("{}", serde_json::to_string_pretty(&theme)?);
                } else {
                    println!("background\t{}", theme.background.unwrap_or_default());
                    println!(
                        "hero\t{}",
                        theme.hero.as_deref().map(preview).unwrap_or_default()
                    );
                }
            }
            ThemeAction::Bg { color } => {
                let c = gallery.set_background(&color)?;
                println!("background {}", c);
            }
            ThemeAction::Hero { source, file } => {
                if file {
                    let bytes = std::fs::read(&source)
                        .with_context(|| format!("reading {}", source))?;
                    gallery.upload_hero(&bytes)?;
                } else {
                    gallery.set_hero(&source)?;
                }
                println!("hero updated");
            }
        },
        Commands::Sync => match gallery.sync_now() {
            Some(SyncOutcome::Delivered) => println!("synced"),
            Some(SyncOutcome::Failed) => anyhow::bail!("sync failed"),
            None => {
                anyhow::bail!("no sync endpoint configured (use --sync-url or [sync] endpoint)")
            }
        },
        Commands::Config { .. } => unreachable!("handled before opening the store"),
    }
    Ok(())
}

fn print_config(settings: &config::Settings, json: bool) -> Result<()> {
    let v = serde_json::json!({
        "storage": settings.storage,
        "manifest": settings.manifest,
        "sync": settings.sync,
        "upload": settings.upload,
        "config_dir": config::config_dir(),
        "settings_path": config::settings_path(),
        "default_db_path": config::default_db_path(),
    });
    if json {
        println!("{}", serde_json::to_string_pretty(&v)?);
    } else {
        println!("config dir: {}", config::config_dir().display());
        println!("settings:   {}", config::settings_path().display());
        println!("database:   {}", config::default_db_path().display());
    }
    Ok(())
}

fn preview(s: &str) -> String {
    const MAX: usize = 60;
    if s.chars().count() > MAX {
        let head: String = s.chars().take(MAX).collect();
        format!("{}…", head)
    } else {
        s.to_string()
    }
}

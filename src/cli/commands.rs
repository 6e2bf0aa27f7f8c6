//! Subcommand handlers.

use std::io::Write;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;

use super::args::{Args, CacheAction, Command, ConfigAction, DisplayArgs};
use super::enums::Style;
use crate::art::{prepare_image, BoxArea, Color, PrepareOptions, RenderStyle};
use crate::config::{default_path, Config, DEFAULT_CONFIG};
use crate::sprites::{
    extract_database, generate_all, open_archive, render_form, render_from_cache, ArchiveClient,
    ArchiveStatus, GenerateOptions, SpriteArchive, SpriteCache, SpriteError, Variant,
};

/// Run the parsed command line.
pub fn run(args: Args) -> Result<(), String> {
    // `config init` must work before a config file exists
    if let Command::Config {
        action: ConfigAction::Init,
    } = &args.command
    {
        return init_config(args.config.as_deref());
    }

    let config = Config::load(args.config.as_deref()).map_err(|e| e.to_string())?;
    let cache = SpriteCache::new(config.data_dir());

    match args.command {
        Command::List => list_forms(&config, &cache),
        Command::Show { name, display } => show_form(&config, &cache, &name, &display),
        Command::Random { display } => show_random(&config, &cache, &display),
        Command::File {
            path,
            style,
            transparent,
            crop,
            resize,
            threshold,
        } => render_file(
            &config,
            &path,
            FileOptions {
                style,
                transparent,
                crop,
                resize: resize.and_then(NonZeroU32::new),
                threshold,
            },
        ),
        Command::Generate { style } => generate(&config, &cache, &style),
        Command::Cache { action } => run_cache(&cache, action),
        Command::Config {
            action: ConfigAction::Show,
        } => {
            show_config(&config, args.config.as_deref());
            Ok(())
        }
        Command::Config {
            action: ConfigAction::Init,
        } => init_config(args.config.as_deref()),
    }
}

/// Write to stdout, treating a closed pipe (e.g. `| head`) as success.
fn emit(text: &str) -> Result<(), String> {
    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
        Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
            Err(format!("Failed to write output: {}", e))
        }
        _ => Ok(()),
    }
}

/// Download (if needed) and open the sprite archive.
fn fetch_archive(config: &Config, cache: &SpriteCache) -> Result<SpriteArchive, String> {
    let client = ArchiveClient::with_url(config.archive_url().to_string())
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;

    rt.block_on(open_archive(cache, &client))
        .map_err(|e| format!("Failed to fetch sprite archive: {}", e))
}

/// Read the cached form list, extracting the database on first use.
fn load_forms(config: &Config, cache: &SpriteCache) -> Result<Vec<String>, String> {
    match cache.forms() {
        Ok(forms) => Ok(forms),
        Err(SpriteError::DatabaseMissing) => {
            let mut archive = fetch_archive(config, cache)?;
            extract_database(cache, &mut archive)
                .map_err(|e| format!("Failed to extract form database: {}", e))
        }
        Err(e) => Err(format!("Failed to read form database: {}", e)),
    }
}

fn list_forms(config: &Config, cache: &SpriteCache) -> Result<(), String> {
    let forms = load_forms(config, cache)?;
    let mut out = String::new();
    for form in &forms {
        out.push_str(form);
        out.push('\n');
    }
    emit(&out)
}

fn show_form(
    config: &Config,
    cache: &SpriteCache,
    name: &str,
    display: &DisplayArgs,
) -> Result<(), String> {
    let forms = load_forms(config, cache)?;
    if !forms.iter().any(|form| form == name) {
        return Err(SpriteError::UnknownForm(name.to_string()).to_string());
    }
    print_form(config, cache, name, display)
}

fn show_random(config: &Config, cache: &SpriteCache, display: &DisplayArgs) -> Result<(), String> {
    let forms = load_forms(config, cache)?;
    let name = forms
        .choose(&mut rand::thread_rng())
        .ok_or_else(|| "The form database lists no forms.".to_string())?;
    log::info!("Picked {}", name);
    print_form(config, cache, name, display)
}

/// Print cached art for a known form, rendering it on a cache miss.
fn print_form(
    config: &Config,
    cache: &SpriteCache,
    name: &str,
    display: &DisplayArgs,
) -> Result<(), String> {
    let style = display.style.map(RenderStyle::from).unwrap_or(config.style());
    let variant = Variant::from_shiny(display.shiny || config.render.shiny);

    let art = match cache.get_art(style, variant, name) {
        Some(art) => {
            log::debug!("Cache hit: {} {} ({})", variant, name, style);
            art
        }
        None => render_art(config, cache, style, variant, name)
            .map_err(|e| format!("Failed to render '{}': {}", name, e))?,
    };

    if display.show_name || config.display.show_name {
        emit(&format!("{}\n", name))?;
    }
    emit(&art)
}

/// Render from the extracted sprite when there is one, otherwise from the archive.
fn render_art(
    config: &Config,
    cache: &SpriteCache,
    style: RenderStyle,
    variant: Variant,
    name: &str,
) -> Result<String, String> {
    let options = config.art_options();
    if let Some(art) = render_from_cache(cache, style, variant, name, &options)
        .map_err(|e| e.to_string())?
    {
        return Ok(art);
    }

    let mut archive = fetch_archive(config, cache)?;
    render_form(cache, &mut archive, style, variant, name, &options).map_err(|e| e.to_string())
}

struct FileOptions {
    style: Option<Style>,
    transparent: Option<Color>,
    crop: Option<BoxArea>,
    resize: Option<NonZeroU32>,
    threshold: Option<u8>,
}

fn render_file(config: &Config, path: &Path, options: FileOptions) -> Result<(), String> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("Failed to read image '{}': {}", path.display(), e))?;

    let style = options.style.map(RenderStyle::from).unwrap_or(config.style());
    let base = PrepareOptions {
        transparency_color: options.transparent.or(config.render.transparency_color),
        box_area: options.crop,
        resize_factor: options.resize,
    };
    let prepare_options = style.prepare_options(base, NonZeroU32::new(config.render.dots_resize));

    let grid = prepare_image(&bytes, &prepare_options)
        .map_err(|e| format!("Failed to prepare '{}': {}", path.display(), e))?;
    let threshold = options.threshold.unwrap_or(config.render.dots_threshold);

    emit(&style.render(&grid, threshold))
}

fn generate(config: &Config, cache: &SpriteCache, styles: &[Style]) -> Result<(), String> {
    let mut options = GenerateOptions {
        art: config.art_options(),
        ..GenerateOptions::default()
    };
    if !styles.is_empty() {
        options.styles = unique_styles(styles);
    }

    let mut archive = fetch_archive(config, cache)?;
    let report = generate_all(cache, &mut archive, &options)
        .map_err(|e| format!("Pre-render failed: {}", e))?;

    println!(
        "Rendered {} file{}, {} already cached, {} skipped.",
        report.rendered,
        if report.rendered == 1 { "" } else { "s" },
        report.existing,
        report.skipped
    );
    println!("Cache: {}", cache.data_dir().display());
    Ok(())
}

/// Requested styles in first-seen order, without repeats.
fn unique_styles(styles: &[Style]) -> Vec<RenderStyle> {
    let mut unique = Vec::with_capacity(styles.len());
    for style in styles.iter().copied().map(RenderStyle::from) {
        if !unique.contains(&style) {
            unique.push(style);
        }
    }
    unique
}

fn run_cache(cache: &SpriteCache, action: CacheAction) -> Result<(), String> {
    match action {
        CacheAction::List => {
            let entries = cache
                .list_entries()
                .map_err(|e| format!("Failed to list cache entries: {}", e))?;

            let archive = match cache
                .archive_status()
                .map_err(|e| format!("Failed to check sprite archive: {}", e))?
            {
                ArchiveStatus::Missing => "not downloaded",
                ArchiveStatus::Valid => "ok",
                ArchiveStatus::Unverified => "unverified",
                ArchiveStatus::Corrupt => "corrupt (will be downloaded again)",
            };
            println!("Cache: {}", cache.data_dir().display());
            println!("Archive: {}", archive);

            if entries.is_empty() {
                println!("No rendered art cached.");
            } else {
                println!("\nRendered art:\n");
                for entry in &entries {
                    println!(
                        "  {:<6} {:<8} {:>5} forms  {}",
                        entry.style,
                        entry.variant,
                        entry.files,
                        format_size(entry.size_bytes)
                    );
                }
            }

            let total_size = cache
                .total_size_bytes()
                .map_err(|e| format!("Failed to calculate total size: {}", e))?;
            println!("\nTotal: {}", format_size(total_size));
            Ok(())
        }
        CacheAction::Clear { all } => {
            let count = if all {
                cache.clear_all()
            } else {
                cache.clear_art()
            }
            .map_err(|e| format!("Failed to clear cache: {}", e))?;

            if count == 0 {
                println!("Cache is already empty.");
            } else {
                println!(
                    "Removed {} cached file{}.",
                    count,
                    if count == 1 { "" } else { "s" }
                );
            }
            Ok(())
        }
    }
}

fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_path)
}

fn show_config(config: &Config, explicit: Option<&Path>) {
    let render = &config.render;
    println!("Current configuration:");
    println!("  Style: {}", config.style());
    println!("  Shiny: {}", if render.shiny { "yes" } else { "no" });
    println!("  Dots threshold: {}", render.dots_threshold);
    println!("  Dots resize: {}", render.dots_resize);
    println!(
        "  Transparency color: {}",
        render
            .transparency_color
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("  Show name: {}", if config.display.show_name { "yes" } else { "no" });
    println!("  Data directory: {}", config.data_dir().display());
    println!("  Archive URL: {}", config.archive_url());
    println!();

    let path = config_path(explicit);
    if path.exists() {
        println!("Config file: {} (exists)", path.display());
    } else {
        println!("Config file: {} (not found)", path.display());
    }
}

fn init_config(explicit: Option<&Path>) -> Result<(), String> {
    let path = config_path(explicit);

    if path.exists() {
        return Err(format!(
            "Config file already exists: {}\nUse 'pokesprite config show' to view current settings.",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Error creating config directory: {}", e))?;
    }

    std::fs::write(&path, DEFAULT_CONFIG)
        .map_err(|e| format!("Error writing config file: {}", e))?;

    println!("Created config file: {}", path.display());
    Ok(())
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Style;
use crate::art::{BoxArea, Color, MAX_RESIZE_FACTOR};

/// Render Pokémon sprites as truecolor terminal art
#[derive(Parser, Debug)]
#[command(name = "pokesprite")]
#[command(version, about = "Pokémon sprites as truecolor terminal art", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log more (-v info, -vv debug)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all form names
    List,
    /// Print the sprite of a form
    Show {
        /// Form name (see `list`)
        name: String,
        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Print the sprite of a random form
    Random {
        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Render any image file
    File {
        /// Image to render
        path: PathBuf,
        /// Rendering style
        #[arg(long, short)]
        style: Option<Style>,
        /// Treat this color as transparent (#rrggbb or r,g,b)
        #[arg(long, value_name = "COLOR")]
        transparent: Option<Color>,
        /// Crop to left,upper,right,lower before rendering
        #[arg(long, value_name = "L,U,R,LO")]
        crop: Option<BoxArea>,
        /// Integer upscale factor (1-16)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_RESIZE_FACTOR as i64))]
        resize: Option<u32>,
        /// Alpha above this value sets a braille dot
        #[arg(long)]
        threshold: Option<u8>,
    },
    /// Download the sprite archive and pre-render every form
    Generate {
        /// Styles to pre-render (default: all)
        #[arg(long, short, value_delimiter = ',')]
        style: Vec<Style>,
    },
    /// Sprite cache management
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options shared by `show` and `random`.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayArgs {
    /// Rendering style
    #[arg(long, short)]
    pub style: Option<Style>,
    /// Use the shiny sprite
    #[arg(long)]
    pub shiny: bool,
    /// Print the form name above the art
    #[arg(long)]
    pub show_name: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheAction {
    /// List rendered art per style and variant
    List,
    /// Remove rendered art
    Clear {
        /// Also remove the archive and extracted sprites
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "product-index")]
#[command(about = "Build the product image index from a spreadsheet and image folders", long_about = None)]
pub(crate) struct Cli {
    /// Base directory holding the spreadsheet and the Items folder (defaults to current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    /// Defaults to `build` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Path overrides shared by commands that read the product tree.
#[derive(Args, Clone, Default)]
pub(crate) struct BuildArgs {
    /// Spreadsheet with product metadata (default: dataSet.xlsx)
    #[arg(long)]
    pub sheet: Option<PathBuf>,

    /// Directory with one folder per product (default: Items)
    #[arg(long)]
    pub items: Option<PathBuf>,

    /// Image subdirectory inside each product folder (default: Website)
    #[arg(long)]
    pub website_dir: Option<String>,

    /// Output JSON file (default: images_index.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image extensions to collect (e.g., png,jpg,webp)
    #[arg(long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Use only the low-level xlsx reader
    #[arg(long)]
    pub no_workbook_reader: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Scan product folders and write the image index
    Build {
        #[command(flatten)]
        args: BuildArgs,

        /// Also write one content file per product
        #[arg(long)]
        export: bool,

        /// Directory for content files (default: content/products)
        #[arg(long)]
        content_dir: Option<PathBuf>,
    },

    /// Convert an existing image index into content files
    Export {
        /// Index file to read (default: the configured output)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory for content files (default: content/products)
        #[arg(long)]
        content_dir: Option<PathBuf>,
    },

    /// Manage the product-index.toml settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show effective settings and where they come from
    Show,

    /// Write a settings file with the default values
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },

    /// Print the settings file path
    Path,
}

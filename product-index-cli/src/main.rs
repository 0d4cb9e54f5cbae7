//! product-index CLI
//!
//! Builds `images_index.json` from a product spreadsheet and per-product
//! image folders, and converts the index into site content files.

mod cli_types;
mod commands;
mod error;
mod logging;

use clap::Parser;

use cli_types::{BuildArgs, Cli, Commands, ConfigAction};
use error::CliError;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let base = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        None => commands::build::run_build(&base, BuildArgs::default(), false, None),
        Some(Commands::Build {
            args,
            export,
            content_dir,
        }) => commands::build::run_build(&base, args, export, content_dir),
        Some(Commands::Export { input, content_dir }) => {
            commands::export::run_export(&base, input, content_dir)
        }
        Some(Commands::Config { action }) => {
            match action {
                ConfigAction::Show => commands::config::run_config_show(&base),
                ConfigAction::Init { force } => commands::config::run_config_init(&base, force)?,
                ConfigAction::Path => commands::config::run_config_path(&base),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_build() {
        let cli = Cli::try_parse_from(["product-index"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.root.is_none());
    }

    #[test]
    fn test_build_flags() {
        let cli = Cli::try_parse_from([
            "product-index",
            "--root",
            "/data/images",
            "build",
            "--sheet",
            "products.csv",
            "--extensions",
            "png,webp",
            "--export",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/data/images")));
        match cli.command {
            Some(Commands::Build { args, export, .. }) => {
                assert!(export);
                assert_eq!(args.sheet, Some(PathBuf::from("products.csv")));
                assert_eq!(
                    args.extensions,
                    Some(vec!["png".to_string(), "webp".to_string()])
                );
            }
            _ => panic!("expected build command"),
        }
    }
}

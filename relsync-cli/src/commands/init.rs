//! `relsync init`: write a config skeleton.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use relsync_core::config;

/// Arguments for `relsync init`.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => config::config_path().context("cannot locate the default config path")?,
        };

        let written = config::init_file(&path)
            .with_context(|| format!("failed to write config to '{}'", path.display()))?;
        if written {
            println!("✓ Wrote config skeleton to {}", path.display());
            println!("  Fill in the sfera and google sections before running `relsync sync`.");
        } else {
            println!("· Config already exists at {}; left untouched", path.display());
        }
        Ok(())
    }
}

//! Command-line configuration.
//!
//! Only the data source and presentation settings are configurable. Query
//! state (search, role filter, sort) always starts empty.
use clap::Parser;
use std::path::PathBuf;

use crate::app::Theme;
use crate::app::keymap::Keymap;

/// Browse, search, filter and sort a directory of users.
#[derive(Parser, Debug, Clone)]
#[command(name = "userdir", version, about, long_about = None)]
pub struct Cli {
    /// JSON file holding an array of {id, name, email, role} records
    #[arg(short, long, env = "USERDIR_DATA", default_value = "data.json")]
    pub data: PathBuf,

    /// Theme file (key = #RRGGBB); created with defaults if missing
    #[arg(long, env = "USERDIR_THEME")]
    pub theme: Option<PathBuf>,

    /// Keybindings file (Action = Key); created with defaults if missing
    #[arg(long, env = "USERDIR_KEYBINDS")]
    pub keybinds: Option<PathBuf>,

    /// Write logs to this file (RUST_LOG controls the level)
    #[arg(long, env = "USERDIR_LOG")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn theme(&self) -> Theme {
        self.theme
            .as_deref()
            .map_or_else(Theme::mocha, Theme::load_or_init)
    }

    pub fn keymap(&self) -> Keymap {
        self.keybinds
            .as_deref()
            .map_or_else(Keymap::default, Keymap::load_or_init)
    }
}

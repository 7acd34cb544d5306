use clap::{Parser, Subcommand};

use wakachi_cli::commands::{config_ops, dict_ops};

#[derive(Parser)]
#[command(name = "dictool", about = "wakachi dictionary build tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile MeCab text sources (*.csv, matrix.def, char.def, unk.def)
    Compile {
        /// Source directory
        src_dir: String,
        /// Output dictionary directory
        out_dir: String,
    },
    /// Show dictionary statistics and character categories
    Info {
        /// Compiled dictionary directory
        dict_dir: String,
    },
    /// Look up a surface in the dictionary (exact match)
    Lookup {
        /// Compiled dictionary directory
        dict_dir: String,
        /// Surface to look up
        surface: String,
    },
    /// Look up the connection cost between context IDs
    ConnCost {
        /// Compiled dictionary directory
        dict_dir: String,
        /// Right context ID of the previous word
        forward: u16,
        /// Left context ID of the next word
        backward: u16,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile { src_dir, out_dir } => dict_ops::compile(&src_dir, &out_dir),
        Command::Info { dict_dir } => dict_ops::info(&dict_dir),
        Command::Lookup { dict_dir, surface } => dict_ops::lookup(&dict_dir, &surface),
        Command::ConnCost {
            dict_dir,
            forward,
            backward,
        } => dict_ops::conn_cost(&dict_dir, forward, backward),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}

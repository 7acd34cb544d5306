use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use wakachi::Mode;
use wakachi_cli::commands::tokenize_ops::{self, TokenizeOptions};

#[derive(Parser)]
#[command(name = "wakachi", about = "Japanese morphological analyzer")]
struct Cli {
    /// Directory for the JSON trace log (effective with --features trace)
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Common {
    /// Compiled dictionary directory
    dict_dir: String,
    /// Input text
    text: String,
    /// User dictionary CSV (optional)
    #[arg(long)]
    user_dict: Option<String>,
    /// Segmentation mode: normal, search or extended (default from settings)
    #[arg(long)]
    mode: Option<Mode>,
    /// Output as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl Common {
    fn options(&self) -> TokenizeOptions<'_> {
        TokenizeOptions {
            user_dict: self.user_dict.as_deref(),
            mode: self.mode,
            json: self.json,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print the best segmentation, one token per line
    Tokenize {
        #[command(flatten)]
        common: Common,
    },
    /// Print ranked alternative segmentations
    Multi {
        #[command(flatten)]
        common: Common,
        /// Maximum number of segmentations
        #[arg(short, long, default_value = "10")]
        n: usize,
        /// Maximum cost above the best segmentation
        #[arg(long, default_value = "10000")]
        slack: i64,
    },
    /// Show the lattice and the cost breakdown of the best path
    Explain {
        #[command(flatten)]
        common: Common,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Some(dir) = &cli.trace_dir {
        wakachi::init_tracing(dir);
    }

    match cli.command {
        Command::Tokenize { common } => {
            tokenize_ops::tokenize(&common.dict_dir, &common.text, &common.options())
        }
        Command::Multi { common, n, slack } => tokenize_ops::multi(
            &common.dict_dir,
            &common.text,
            n,
            slack,
            &common.options(),
        ),
        Command::Explain { common } => {
            tokenize_ops::explain(&common.dict_dir, &common.text, &common.options())
        }
    }
}

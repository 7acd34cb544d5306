use std::path::Path;
use std::process;

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use wakachi::settings::settings;
use wakachi::tokenizer::{ExplainNode, ExplainResult};
use wakachi::{Mode, Token, TokenKind, Tokenization, Tokenizer};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Options shared by every tokenizing command.
pub struct TokenizeOptions<'a> {
    pub user_dict: Option<&'a str>,
    pub mode: Option<Mode>,
    pub json: bool,
}

fn open(dict_dir: &str, opts: &TokenizeOptions<'_>) -> Tokenizer {
    let mode = opts.mode.unwrap_or(settings().tokenizer.mode);
    die!(
        Tokenizer::open(Path::new(dict_dir), opts.user_dict.map(Path::new), mode),
        "Error opening tokenizer: {}"
    )
}

/// JSON view of a token.
#[derive(Debug, Serialize)]
struct TokenRecord<'a> {
    surface: &'a str,
    start: usize,
    end: usize,
    kind: TokenKind,
    features: Vec<&'a str>,
}

impl<'a> From<&Token<'a>> for TokenRecord<'a> {
    fn from(t: &Token<'a>) -> Self {
        let range = t.char_range();
        Self {
            surface: t.surface(),
            start: range.start,
            end: range.end,
            kind: t.kind(),
            features: t.features(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PathRecord<'a> {
    cost: i64,
    tokens: Vec<TokenRecord<'a>>,
}

impl<'a> From<&Tokenization<'a>> for PathRecord<'a> {
    fn from(t: &Tokenization<'a>) -> Self {
        Self {
            cost: t.cost,
            tokens: t.tokens.iter().map(TokenRecord::from).collect(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).expect("JSON serialization failed")
}

/// MeCab-style output: one `surface\tfeatures` line per token, then `EOS`.
pub fn format_tokens(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    for t in tokens {
        out.push_str(&format!("{t}\n"));
    }
    out.push_str("EOS\n");
    out
}

pub fn format_paths(paths: &[Tokenization<'_>]) -> String {
    let mut out = String::new();
    for (i, path) in paths.iter().enumerate() {
        let segs: Vec<&str> = path.tokens.iter().map(|t| t.surface()).collect();
        out.push_str(&format!(
            "#{:>2}: {}  (cost={})\n",
            i + 1,
            segs.join(" | "),
            path.cost
        ));
    }
    out
}

fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{s}{}", " ".repeat(width.saturating_sub(w)))
}

fn format_node(n: &ExplainNode) -> String {
    let best = n
        .best_cost
        .map_or_else(|| "-".to_string(), |c| c.to_string());
    format!(
        "    [{},{}] {}  {:<8} cost={:<6} L={:<4} R={:<4} best={}\n",
        n.start,
        n.end,
        pad(&n.surface, 12),
        n.kind,
        n.word_cost,
        n.left_id,
        n.right_id,
        best,
    )
}

pub fn format_explain(result: &ExplainResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== \"{}\" (mode={}, {} clauses, cost={}) ===\n",
        result.text,
        result.mode,
        result.clauses.len(),
        result.total_cost,
    ));

    for clause in &result.clauses {
        out.push_str(&format!(
            "\n--- Clause \"{}\" at {} ({} chars, {} nodes) ---\n",
            clause.text,
            clause.char_offset,
            clause.lattice_char_count,
            clause.lattice_nodes.len(),
        ));

        let max_pos = clause
            .lattice_nodes
            .iter()
            .map(|n| n.start)
            .max()
            .unwrap_or(0);
        for pos in clause.char_offset..=max_pos {
            let at: Vec<&ExplainNode> = clause
                .lattice_nodes
                .iter()
                .filter(|n| n.start == pos && n.kind != "bos" && n.kind != "eos")
                .collect();
            if at.is_empty() {
                continue;
            }
            out.push_str(&format!("  Position {pos}:\n"));
            for n in at {
                out.push_str(&format_node(n));
            }
        }

        out.push_str("\n  Best path:\n");
        for t in &clause.best_path {
            out.push_str(&format!(
                "    {}  word={:<6} conn={:<6} penalty={:<5} total={}{}\n",
                pad(&t.surface, 12),
                t.word_cost,
                t.connection_cost,
                t.length_penalty,
                t.cumulative_cost,
                if t.inserted { "  (inserted)" } else { "" },
            ));
        }
        out.push_str(&format!("  Clause cost: {}\n", clause.cost));
    }
    out
}

pub fn tokenize(dict_dir: &str, text: &str, opts: &TokenizeOptions<'_>) {
    let tokenizer = open(dict_dir, opts);
    let result = tokenizer.tokenize_with_cost(text);
    if opts.json {
        println!("{}", to_json(&PathRecord::from(&result)));
    } else {
        print!("{}", format_tokens(&result.tokens));
    }
}

pub fn multi(dict_dir: &str, text: &str, n: usize, slack: i64, opts: &TokenizeOptions<'_>) {
    let tokenizer = open(dict_dir, opts);
    let paths = tokenizer.multi_tokenize_with_costs(text, n, slack);
    if opts.json {
        let records: Vec<PathRecord<'_>> = paths.iter().map(PathRecord::from).collect();
        println!("{}", to_json(&records));
    } else if paths.is_empty() {
        println!("No paths found.");
    } else {
        print!("{}", format_paths(&paths));
    }
}

pub fn explain(dict_dir: &str, text: &str, opts: &TokenizeOptions<'_>) {
    let tokenizer = open(dict_dir, opts);
    let result = tokenizer.explain(text);
    if opts.json {
        println!("{}", to_json(&result));
    } else {
        print!("{}", format_explain(&result));
    }
}

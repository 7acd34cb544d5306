use std::fs;
use std::process;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn settings_export() {
    print!("{}", wakachi::settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(wakachi::settings::parse_settings_toml(&content), "Error: {}");
    println!(
        "OK: tokenizer.mode={}, tokenizer.split_clauses={}, penalty.kanji_penalty={}, penalty.other_penalty={}",
        s.tokenizer.mode, s.tokenizer.split_clauses, s.penalty.kanji_penalty, s.penalty.other_penalty
    );
}

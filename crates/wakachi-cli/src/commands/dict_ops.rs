use std::fs;
use std::path::Path;
use std::process;

use wakachi::dict::{CategoryId, Dictionary, ARTIFACT_FILES};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

fn open(dict_dir: &str) -> Dictionary {
    die!(
        Dictionary::open(Path::new(dict_dir)),
        "Error opening dictionary: {}"
    )
}

fn dir_size(dir: &Path) -> u64 {
    ARTIFACT_FILES
        .iter()
        .filter_map(|name| fs::metadata(dir.join(name)).ok())
        .map(|m| m.len())
        .sum()
}

pub fn compile(src_dir: &str, out_dir: &str) {
    let src = Path::new(src_dir);
    if !src.is_dir() {
        eprintln!("Error: {src_dir} is not a directory");
        process::exit(1);
    }

    eprintln!("Compiling {src_dir}...");
    let dict = die!(Dictionary::compile_dir(src), "Error compiling dictionary: {}");
    eprintln!(
        "{} words, {} surfaces, {} unknown entries, matrix {}x{}",
        dict.token_info().len(),
        dict.token_info().surface_count(),
        dict.unknown().len(),
        dict.connection().cardinality(),
        dict.connection().cardinality(),
    );

    let out = Path::new(out_dir);
    die!(dict.save(out), "Error writing dictionary: {}");
    eprintln!(
        "Wrote {out_dir} ({:.1} MB)",
        dir_size(out) as f64 / 1_048_576.0
    );
}

pub fn info(dict_dir: &str) {
    let dict = open(dict_dir);
    let token_info = dict.token_info();
    let char_def = dict.char_def();

    println!("Dictionary:  {dict_dir}");
    println!("Size:        {:.1} MB", dir_size(Path::new(dict_dir)) as f64 / 1_048_576.0);
    println!("Words:       {}", token_info.len());
    println!("Surfaces:    {}", token_info.surface_count());
    println!("POS strings: {}", token_info.pos_count());
    println!("Features:    {}", token_info.other_count());
    println!("Matrix:      {0}x{0}", dict.connection().cardinality());
    println!("Unknown:     {} entries", dict.unknown().len());

    println!();
    println!("Character categories:");
    for id in 0..char_def.category_count() {
        let id = CategoryId(id as u8);
        let Some(cat) = char_def.category(id) else {
            continue;
        };
        println!(
            "  {:<14} invoke={} group={} length={} unknown_entries={}",
            cat.name,
            u8::from(cat.invoke),
            u8::from(cat.group),
            cat.length,
            dict.unknown().entries(id).len(),
        );
    }
}

pub fn lookup(dict_dir: &str, surface: &str) {
    let dict = open(dict_dir);
    let surface_id = dict.surfaces().lookup(surface);
    if surface_id < 0 {
        println!("{surface}: not found");
        return;
    }
    if surface_id == 0 {
        println!("{surface}: not found (prefix of longer surfaces)");
        return;
    }
    let token_info = dict.token_info();
    let targets = token_info.targets(surface_id as u32);
    println!("{surface}: {} entries", targets.len());
    for &word_id in targets {
        let Some(param) = token_info.param(word_id) else {
            continue;
        };
        println!(
            "  #{word_id:<8} L={:<5} R={:<5} cost={:<6} {}",
            param.left_id,
            param.right_id,
            param.cost,
            token_info.features(word_id).join(","),
        );
    }
}

pub fn conn_cost(dict_dir: &str, forward: u16, backward: u16) {
    let dict = open(dict_dir);
    let conn = dict.connection();
    let size = conn.cardinality();
    if forward as usize >= size || backward as usize >= size {
        eprintln!("Warning: id out of range (matrix is {size}x{size}), cost defaults to 0");
    }
    println!(
        "conn({forward}, {backward}) = {}",
        conn.cost(forward, backward)
    );
}

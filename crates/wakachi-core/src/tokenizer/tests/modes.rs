use crate::dict::LexType;
use crate::tokenizer::cost::length_penalty;
use crate::tokenizer::testutil::{penalty, surfaces, test_dictionary, tokenizer};
use crate::tokenizer::Mode;

#[test]
fn test_normal_keeps_compound() {
    let t = tokenizer(Mode::Normal);
    let result = t.tokenize_with_cost("関西国際空港");
    assert_eq!(surfaces(&result.tokens), vec!["関西国際空港"]);
    assert_eq!(result.cost, 2000);
}

#[test]
fn test_search_splits_compound() {
    // The compound pays (6 - 2) * 3000 on top of its 2000.
    let t = tokenizer(Mode::Search);
    let result = t.tokenize_with_cost("関西国際空港");
    assert_eq!(surfaces(&result.tokens), vec!["関西", "国際", "空港"]);
    assert_eq!(result.cost, 7500);
    assert!(result.tokens.iter().all(|tok| tok.is_known()));
}

#[test]
fn test_search_penalizes_long_unknown() {
    let text = "アイウエオカキクケ";
    assert_eq!(tokenizer(Mode::Normal).tokenize_with_cost(text).cost, 8000);
    let t = tokenizer(Mode::Search);
    let search = t.tokenize_with_cost(text);
    assert_eq!(surfaces(&search.tokens), vec![text]);
    assert_eq!(search.cost, 8000 + 2 * 1700);
}

#[test]
fn test_extended_splits_unknown() {
    let t = tokenizer(Mode::Extended);
    let tokens = t.tokenize("トトロ");
    assert_eq!(surfaces(&tokens), vec!["ト", "ト", "ロ"]);
    let dict = t.dictionary();
    let katakana = dict.char_def().category_id("KATAKANA").unwrap();
    let entry = dict.unknown().entries(katakana)[0];
    for (i, tok) in tokens.iter().enumerate() {
        assert!(tok.is_unknown());
        assert_eq!(tok.word_idx().lex_type, LexType::Unknown);
        assert_eq!(tok.word_id(), entry);
        assert_eq!(tok.char_range(), i..i + 1);
    }
    assert_eq!(tokens[2].byte_range(), 6..9);
}

#[test]
fn test_extended_keeps_known_words() {
    let extended = tokenizer(Mode::Extended);
    let normal = tokenizer(Mode::Normal);
    let text = "すしがたべたい";
    assert_eq!(
        surfaces(&extended.tokenize(text)),
        surfaces(&normal.tokenize(text))
    );
}

#[test]
fn test_extended_mixed_input() {
    let t = tokenizer(Mode::Extended);
    let tokens = t.tokenize("すしとトトロ");
    assert_eq!(surfaces(&tokens), vec!["すし", "と", "ト", "ト", "ロ"]);
    let positions: Vec<usize> = tokens.iter().map(|tok| tok.position()).collect();
    assert_eq!(positions, vec![0, 2, 3, 4, 5]);
}

#[test]
fn test_length_penalty() {
    let dict = test_dictionary();
    let p = penalty();
    let chars = |s: &str| s.chars().collect::<Vec<_>>();
    assert_eq!(length_penalty(&p, &chars("関西"), dict.char_def()), 0);
    assert_eq!(length_penalty(&p, &chars("関西国"), dict.char_def()), 3000);
    assert_eq!(length_penalty(&p, &chars("関西国際空港"), dict.char_def()), 12000);
    // Mixed script falls under the other threshold.
    assert_eq!(length_penalty(&p, &chars("関西の空港"), dict.char_def()), 0);
    assert_eq!(length_penalty(&p, &chars("あいうえおかきく"), dict.char_def()), 1700);
    assert_eq!(length_penalty(&p, &chars("関西国際空港関西国際"), dict.char_def()), 24000);
}

#[test]
fn test_mode_parsing() {
    assert_eq!("normal".parse::<Mode>().unwrap(), Mode::Normal);
    assert_eq!("Search".parse::<Mode>().unwrap(), Mode::Search);
    assert_eq!("EXTENDED".parse::<Mode>().unwrap(), Mode::Extended);
    assert!("greedy".parse::<Mode>().is_err());
    assert_eq!(Mode::Extended.to_string(), "extended");
    assert_eq!(Mode::default(), Mode::Normal);
}

use crate::tokenizer::testutil::{surfaces, tokenizer};
use crate::tokenizer::Mode;
use crate::{TokenKind, Tokenizer};

#[test]
fn test_tokenize_sushi() {
    let t = tokenizer(Mode::Normal);
    let result = t.tokenize_with_cost("すしがたべたい");
    // すし(3000) + が(1000) + たべ(3500) + たい(2000), all connections free
    assert_eq!(surfaces(&result.tokens), vec!["すし", "が", "たべ", "たい"]);
    assert_eq!(result.cost, 9500);
    assert!(result.tokens.iter().all(|tok| tok.is_known()));

    let positions: Vec<usize> = result.tokens.iter().map(|tok| tok.position()).collect();
    assert_eq!(positions, vec![0, 2, 3, 5]);
    assert_eq!(result.tokens[2].byte_range(), 9..15);
    assert_eq!(result.tokens[2].char_range(), 3..5);
}

#[test]
fn test_empty_input() {
    let t = tokenizer(Mode::Normal);
    assert!(t.tokenize("").is_empty());
    assert_eq!(t.tokenize_with_cost("").cost, 0);

    let multi = t.multi_tokenize_with_costs("", 3, 1000);
    assert_eq!(multi.len(), 1);
    assert!(multi[0].tokens.is_empty());
    assert_eq!(multi[0].cost, 0);
}

#[test]
fn test_token_accessors() {
    let t = tokenizer(Mode::Normal);
    let tokens = t.tokenize("たべたい");
    let tabe = &tokens[0];
    assert_eq!(tabe.surface(), "たべ");
    assert_eq!(tabe.kind(), TokenKind::Known);
    assert_eq!(tabe.part_of_speech(), Some("動詞"));
    assert_eq!(tabe.part_of_speech_level(2), Some("自立"));
    assert_eq!(tabe.part_of_speech_level(3), Some("*"));
    assert_eq!(tabe.part_of_speech_level(0), None);
    assert_eq!(tabe.part_of_speech_level(5), None);
    assert_eq!(tabe.conjugation_type(), Some("一段"));
    assert_eq!(tabe.conjugation_form(), Some("連用形"));
    assert_eq!(tabe.base_form(), Some("たべる"));
    assert_eq!(tabe.reading(), Some("タベ"));
    assert_eq!(tabe.pronunciation(), Some("タベ"));
    assert_eq!(tabe.feature(9), None);
    assert_eq!(tabe.features().len(), 9);
    assert_eq!(
        tabe.all_features(),
        "動詞,自立,*,*,一段,連用形,たべる,タベ,タベ"
    );
    assert_eq!(
        tabe.to_string(),
        "たべ\t動詞,自立,*,*,一段,連用形,たべる,タベ,タベ"
    );
}

#[test]
fn test_unknown_fallback_to_default() {
    // GREEK has no unknown entries, so each char falls back to DEFAULT.
    let t = tokenizer(Mode::Normal);
    let tokens = t.tokenize("αβ");
    assert_eq!(surfaces(&tokens), vec!["α", "β"]);
    for tok in &tokens {
        assert!(tok.is_unknown());
        assert_eq!(tok.all_features(), "記号,一般,*,*,*,*,*");
        assert_eq!(tok.base_form(), Some("*"));
        assert_eq!(tok.reading(), None);
    }
    assert_eq!(tokens[1].byte_range(), 2..4);
}

#[test]
fn test_unknown_grouping() {
    let t = tokenizer(Mode::Normal);
    let tokens = t.tokenize("トトロ");
    assert_eq!(surfaces(&tokens), vec!["トトロ"]);
    assert!(tokens[0].is_unknown());
    assert_eq!(tokens[0].part_of_speech(), Some("名詞"));

    assert_eq!(surfaces(&t.tokenize("abc123")), vec!["abc", "123"]);
    // KANJI does not group: one unknown word per char.
    assert_eq!(surfaces(&t.tokenize("森林")), vec!["森", "林"]);
}

#[test]
fn test_invoke_adds_unknown_next_to_known() {
    // SYMBOL is always invoked, but the known 、 is cheaper.
    let t = tokenizer(Mode::Normal);
    let tokens = t.tokenize("、");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_known());
    assert_eq!(tokens[0].part_of_speech_level(2), Some("読点"));
}

#[test]
fn test_clauses_are_transparent() {
    let text = "すし、たべたい。";
    let split = tokenizer(Mode::Normal);
    let whole = Tokenizer::builder(std::sync::Arc::new(crate::tokenizer::testutil::test_dictionary()))
        .penalty(crate::tokenizer::testutil::penalty())
        .split_clauses(false)
        .build();

    let a = split.tokenize_with_cost(text);
    let b = whole.tokenize_with_cost(text);
    assert_eq!(surfaces(&a.tokens), vec!["すし", "、", "たべ", "たい", "。"]);
    assert_eq!(surfaces(&a.tokens), surfaces(&b.tokens));
    assert_eq!(a.cost, 7500);
    assert_eq!(a.cost, b.cost);

    let ranges: Vec<_> = a.tokens.iter().map(|tok| tok.char_range()).collect();
    assert_eq!(ranges, vec![0..2, 2..3, 3..5, 5..7, 7..8]);
    assert_eq!(a.tokens[2].byte_range(), 9..15);
}

#[test]
fn test_tokenizer_is_send_sync_and_clone() {
    fn assert_send_sync<T: Send + Sync + Clone>() {}
    assert_send_sync::<Tokenizer>();
}

#[test]
fn test_explain() {
    let t = tokenizer(Mode::Search);
    let report = t.explain("関西国際空港。");
    assert_eq!(report.mode, Mode::Search);
    assert_eq!(report.clauses.len(), 1);

    let clause = &report.clauses[0];
    let best: Vec<&str> = clause.best_path.iter().map(|tok| tok.surface.as_str()).collect();
    assert_eq!(best, vec!["関西", "国際", "空港", "。"]);
    assert_eq!(clause.cost, 7000);
    assert_eq!(report.total_cost, 7000);
    assert_eq!(clause.best_path[3].cumulative_cost, 7000);
    assert!(clause.best_path.iter().all(|tok| tok.connection_cost == 0));

    let compound = clause
        .lattice_nodes
        .iter()
        .find(|n| n.surface == "関西国際空港")
        .unwrap();
    assert_eq!(compound.kind, "known");
    assert_eq!(compound.word_cost, 2000);
    assert!(clause.lattice_nodes.iter().any(|n| n.kind == "bos"));
    assert!(clause.lattice_nodes.iter().any(|n| n.kind == "eos"));
}

#[test]
fn test_explain_reports_penalty() {
    let t = tokenizer(Mode::Search);
    let report = t.explain("アイウエオカキクケ");
    let tok = &report.clauses[0].best_path[0];
    assert_eq!(tok.surface, "アイウエオカキクケ");
    assert_eq!(tok.word_cost, 8000);
    assert_eq!(tok.length_penalty, 3400);
    assert_eq!(tok.cumulative_cost, 11400);
}

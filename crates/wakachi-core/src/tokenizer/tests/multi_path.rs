use std::collections::HashSet;

use proptest::prelude::*;

use crate::tokenizer::cost::{CostFunction, ModeCost};
use crate::tokenizer::lattice::{build_lattice, Lattice};
use crate::tokenizer::multi_path::paths;
use crate::tokenizer::testutil::{penalty, surfaces, test_dictionary, tokenizer};
use crate::tokenizer::viterbi::forward;
use crate::tokenizer::Mode;
use crate::Dictionary;

/// Every BOS-to-EOS path with its cost, by depth-first enumeration.
fn brute_force(lattice: &Lattice<'_>, cost_fn: &dyn CostFunction) -> Vec<(Vec<usize>, i64)> {
    fn walk(
        lattice: &Lattice<'_>,
        cost_fn: &dyn CostFunction,
        node: usize,
        cost: i64,
        path: &mut Vec<usize>,
        out: &mut Vec<(Vec<usize>, i64)>,
    ) {
        let end = lattice.nodes[node].end;
        for &next in &lattice.nodes_by_start[end + 1] {
            let n = &lattice.nodes[next];
            let total = cost
                + cost_fn.transition_cost(&lattice.nodes[node], n)
                + cost_fn.word_cost(n, &lattice.chars);
            if next == lattice.eos {
                out.push((path.clone(), total));
                continue;
            }
            path.push(next);
            walk(lattice, cost_fn, next, total, path, out);
            path.pop();
        }
    }
    let mut out = Vec::new();
    walk(lattice, cost_fn, lattice.bos, 0, &mut Vec::new(), &mut out);
    out
}

fn compare_with_brute_force(dict: &Dictionary, mode: Mode, text: &str) {
    let cost_fn = ModeCost::new(dict.connection(), dict.char_def(), mode, penalty());
    let mut lattice = build_lattice(dict, None, mode, text);
    forward(&mut lattice, &cost_fn);

    let mut expected = brute_force(&lattice, &cost_fn);
    let mut actual: Vec<_> = paths(&lattice, &cost_fn, i64::MAX / 4).collect();
    assert_eq!(actual.len(), expected.len(), "path count for {text:?}");

    let costs: Vec<i64> = actual.iter().map(|p| p.1).collect();
    assert!(costs.windows(2).all(|w| w[0] <= w[1]), "not ascending: {costs:?}");

    let key = |p: &(Vec<usize>, i64)| (p.1, p.0.clone());
    expected.sort_by_key(key);
    actual.sort_by_key(key);
    assert_eq!(actual, expected, "paths for {text:?}");
}

#[test]
fn test_sushi_costs() {
    let t = tokenizer(Mode::Normal);
    let results = t.multi_tokenize_with_costs("すしがたべたい", 10, 100_000);
    let costs: Vec<i64> = results.iter().map(|r| r.cost).collect();
    assert_eq!(costs, vec![9500, 17500, 18000, 21500, 26000, 29500]);
    assert_eq!(surfaces(&results[1].tokens), vec!["す", "し", "が", "たべ", "たい"]);
    assert_eq!(surfaces(&results[2].tokens), vec!["すし", "が", "た", "べたい"]);
}

#[test]
fn test_first_is_best() {
    for mode in [Mode::Normal, Mode::Search, Mode::Extended] {
        let t = tokenizer(mode);
        for text in ["すしがたべたい", "関西国際空港", "すし、トトロ。αβ"] {
            let best = t.tokenize_with_cost(text);
            let multi = t.multi_tokenize_with_costs(text, 5, 50_000);
            assert_eq!(surfaces(&multi[0].tokens), surfaces(&best.tokens));
            assert_eq!(multi[0].cost, best.cost);
        }
    }
}

#[test]
fn test_max_count_and_slack() {
    let t = tokenizer(Mode::Normal);
    let text = "すしがたべたい";
    assert!(t.multi_tokenize(text, 0, 100_000).is_empty());
    assert_eq!(t.multi_tokenize(text, 2, 100_000).len(), 2);
    assert_eq!(t.multi_tokenize(text, 10, 0).len(), 1);

    let costs: Vec<i64> = t
        .multi_tokenize_with_costs(text, 10, 8500)
        .iter()
        .map(|r| r.cost)
        .collect();
    assert_eq!(costs, vec![9500, 17500, 18000]);
}

#[test]
fn test_clause_merge_matches_whole_input() {
    let split = tokenizer(Mode::Normal);
    let whole = crate::Tokenizer::builder(std::sync::Arc::new(test_dictionary()))
        .penalty(penalty())
        .split_clauses(false)
        .build();
    let text = "すし、たべたい";
    let a: Vec<i64> = split
        .multi_tokenize_with_costs(text, 20, 100_000)
        .iter()
        .map(|r| r.cost)
        .collect();
    let b: Vec<i64> = whole
        .multi_tokenize_with_costs(text, 20, 100_000)
        .iter()
        .map(|r| r.cost)
        .collect();
    assert_eq!(
        a,
        vec![8000, 9500, 16000, 16500, 17500, 18000, 20000, 21500, 24500, 26000, 28000, 29500]
    );
    assert_eq!(a, b);

    let bounded: Vec<i64> = split
        .multi_tokenize_with_costs(text, 4, 8000)
        .iter()
        .map(|r| r.cost)
        .collect();
    assert_eq!(bounded, vec![8000, 9500, 16000]);
}

#[test]
fn test_merged_offsets() {
    let t = tokenizer(Mode::Normal);
    let results = t.multi_tokenize("すし、たべたい", 3, 100_000);
    for tokens in &results {
        let text: String = tokens.iter().map(|tok| tok.surface()).collect();
        assert_eq!(text, "すし、たべたい");
        let mut pos = 0;
        for tok in tokens {
            assert_eq!(tok.position(), pos);
            pos = tok.char_range().end;
        }
    }
}

#[test]
fn test_brute_force_fixed_inputs() {
    let dict = test_dictionary();
    for mode in [Mode::Normal, Mode::Search] {
        for text in ["すしがたべたい", "関西国際空港", "たべたいたべたい", "アクロポリスa1"] {
            compare_with_brute_force(&dict, mode, text);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn multi_path_enumerates_every_path(
        atoms in prop::collection::vec(
            prop::sample::select(vec!["す", "し", "が", "た", "べ", "い", "関西", "国際", "空港", "ト", "a", "1", "α"]),
            0..6,
        ),
        search_mode in any::<bool>(),
    ) {
        let dict = test_dictionary();
        let mode = if search_mode { Mode::Search } else { Mode::Normal };
        compare_with_brute_force(&dict, mode, &atoms.concat());
    }
}

#[test]
fn test_extended_alternatives_are_distinct() {
    let t = tokenizer(Mode::Extended);
    for text in ["ーー", "トトロ", "すし、トトロ。"] {
        let results = t.multi_tokenize_with_costs(text, 10, 100_000);
        assert!(!results.is_empty());
        let keys: Vec<Vec<_>> = results
            .iter()
            .map(|r| {
                r.tokens
                    .iter()
                    .map(|tok| (tok.char_range(), tok.word_idx(), tok.kind()))
                    .collect()
            })
            .collect();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len(), "repeated segmentation for {text:?}");
        let costs: Vec<i64> = results.iter().map(|r| r.cost).collect();
        assert!(costs.windows(2).all(|w| w[0] <= w[1]), "not ascending: {costs:?}");
    }

    // Both the grouped run and the two single chars split to the same pair;
    // only the cheaper one is kept.
    let results = t.multi_tokenize_with_costs("ーー", 5, 100_000);
    let pairs: Vec<i64> = results
        .iter()
        .filter(|r| surfaces(&r.tokens) == ["ー", "ー"])
        .map(|r| r.cost)
        .collect();
    assert_eq!(pairs, vec![results[0].cost]);
}

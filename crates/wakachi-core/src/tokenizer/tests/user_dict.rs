use std::sync::Arc;

use crate::settings::UserDictSettings;
use crate::tokenizer::testutil::{
    penalty, surfaces, test_dictionary, tokenizer, tokenizer_with_user, user_params,
};
use crate::tokenizer::{Mode, TokenizerError};
use crate::user_dict::{UserDictError, UserDictionary};
use crate::{TokenKind, Tokenizer};

#[test]
fn test_acropolis() {
    let t = tokenizer_with_user(Mode::Normal, "クロ,クロ,クロ,カスタム名詞\n");
    let tokens = t.tokenize("アクロポリス");
    assert_eq!(surfaces(&tokens), vec!["ア", "クロ", "ポリス"]);
    let kinds: Vec<TokenKind> = tokens.iter().map(|tok| tok.kind()).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Inserted, TokenKind::User, TokenKind::Inserted]
    );

    let kuro = &tokens[1];
    assert!(kuro.is_user());
    assert_eq!(kuro.part_of_speech(), Some("カスタム名詞"));
    assert_eq!(kuro.base_form(), Some("クロ"));
    assert_eq!(kuro.reading(), Some("クロ"));
    assert_eq!(kuro.all_features(), "カスタム名詞,*,*,*,*,*,クロ,クロ,*");

    // Glue tokens carry the features of the unknown word they were cut from.
    assert_eq!(tokens[0].part_of_speech(), Some("名詞"));
    assert_eq!(tokens[2].char_range(), 3..6);
    assert!(!tokens[0].is_unknown());
}

#[test]
fn test_without_user_dictionary() {
    let t = tokenizer(Mode::Normal);
    assert_eq!(surfaces(&t.tokenize("アクロポリス")), vec!["アクロポリス"]);
}

#[test]
fn test_user_segmentation_overrides_lexicon() {
    let t = tokenizer_with_user(
        Mode::Normal,
        "関西国際空港,関西国際 空港,カンサイコクサイ クウコウ,カスタム名詞\n",
    );
    let tokens = t.tokenize("関西国際空港");
    assert_eq!(surfaces(&tokens), vec!["関西国際", "空港"]);
    assert!(tokens.iter().all(|tok| tok.is_user()));
    assert_eq!(tokens[0].reading(), Some("カンサイコクサイ"));
    assert_eq!(tokens[1].reading(), Some("クウコウ"));
    assert_eq!(tokens[1].word_id(), tokens[0].word_id() + 1);
}

#[test]
fn test_costly_user_entry_loses() {
    let params = UserDictSettings {
        word_cost_base: 10000,
        ..user_params()
    };
    let user = UserDictionary::from_csv_with("すし,す し,ス シ,名詞\n", &params).unwrap();
    let t = Tokenizer::builder(Arc::new(test_dictionary()))
        .user_dictionary(Arc::new(user))
        .penalty(penalty())
        .build();
    let tokens = t.tokenize("すし");
    assert_eq!(surfaces(&tokens), vec!["すし"]);
    assert!(tokens[0].is_known());
}

#[test]
fn test_user_entry_inside_clause() {
    let t = tokenizer_with_user(Mode::Normal, "トトロ,トトロ,トトロ,キャラクター\n");
    let tokens = t.tokenize("すし、トトロ。");
    assert_eq!(surfaces(&tokens), vec!["すし", "、", "トトロ", "。"]);
    assert!(tokens[2].is_user());
    assert_eq!(tokens[2].position(), 3);
    assert_eq!(tokens[2].part_of_speech(), Some("キャラクター"));
}

#[test]
fn test_open_with_user_dictionary() {
    let dict_dir = tempfile::tempdir().unwrap();
    test_dictionary().save(dict_dir.path()).unwrap();
    let csv = dict_dir.path().join("user.csv");
    std::fs::write(&csv, "# custom words\nクロ,クロ,クロ,カスタム名詞\n").unwrap();

    let t = Tokenizer::open(dict_dir.path(), Some(&csv), Mode::Normal).unwrap();
    assert_eq!(t.user_dictionary().map(|u| u.len()), Some(1));
    assert_eq!(
        surfaces(&t.tokenize("アクロポリス")),
        vec!["ア", "クロ", "ポリス"]
    );
}

#[test]
fn test_open_errors() {
    let dict_dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Tokenizer::open(dict_dir.path(), None, Mode::Normal),
        Err(TokenizerError::Dict(_))
    ));

    test_dictionary().save(dict_dir.path()).unwrap();
    let missing = dict_dir.path().join("missing.csv");
    assert!(matches!(
        Tokenizer::open(dict_dir.path(), Some(&missing), Mode::Normal),
        Err(TokenizerError::UserDict(UserDictError::Io(_)))
    ));

    let bad = dict_dir.path().join("bad.csv");
    std::fs::write(&bad, "クロ,クロ,クロ,名詞\nシロ,シ ロ,シロ,名詞\n").unwrap();
    match Tokenizer::open(dict_dir.path(), Some(&bad), Mode::Normal) {
        Err(TokenizerError::UserDict(UserDictError::Line { line, .. })) => assert_eq!(line, 2),
        other => panic!("expected a user dictionary line error, got {other:?}"),
    }
}

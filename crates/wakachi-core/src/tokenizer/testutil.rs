//! Small MeCab-format dictionary compiled in memory for tests.

use std::path::Path;
use std::sync::Arc;

use crate::dict::{DictSources, Dictionary};
use crate::settings::{PenaltySettings, UserDictSettings};
use crate::token::Token;
use crate::user_dict::UserDictionary;

use super::{Mode, Tokenizer};

pub const LEXICON: &str = "\
すし,1,1,3000,名詞,一般,*,*,*,*,すし,スシ,スシ
す,1,1,6000,名詞,一般,*,*,*,*,す,ス,ス
し,2,2,5000,動詞,自立,*,*,サ変・スル,連用形,する,シ,シ
が,3,3,1000,助詞,格助詞,一般,*,*,*,が,ガ,ガ
たべ,4,4,3500,動詞,自立,*,*,一段,連用形,たべる,タベ,タベ
たい,5,5,2000,助動詞,*,*,*,特殊・タイ,基本形,たい,タイ,タイ
た,5,5,4000,助動詞,*,*,*,特殊・タ,基本形,た,タ,タ
関西国際空港,1,1,2000,名詞,固有名詞,組織,*,*,*,関西国際空港,カンサイコクサイクウコウ,カンサイコクサイクーコー
関西,1,1,2500,名詞,固有名詞,地域,一般,*,*,関西,カンサイ,カンサイ
国際,1,1,2500,名詞,一般,*,*,*,*,国際,コクサイ,コクサイ
空港,1,1,2500,名詞,一般,*,*,*,*,空港,クウコウ,クーコー
、,6,6,-500,記号,読点,*,*,*,*,、,、,、
。,6,6,-500,記号,句点,*,*,*,*,。,。,。
";

/// Every connection costs 0, so path cost is the sum of word costs.
pub const MATRIX_DEF: &str = "10 10\n0 0 0\n";

pub const CHAR_DEF: &str = "\
# name invoke group length
DEFAULT 0 1 0
SPACE 0 1 0
KANJI 0 0 2
SYMBOL 1 1 0
NUMERIC 1 1 0
ALPHA 1 1 0
HIRAGANA 0 1 2
KATAKANA 1 1 2
KANJINUMERIC 1 1 0
GREEK 0 1 0  # no unknown entries

0x0020 SPACE
0x0021..0x002F SYMBOL
0x0030..0x0039 NUMERIC
0x0041..0x005A ALPHA
0x0061..0x007A ALPHA
0x0391..0x03C9 GREEK
0x3000 SPACE
0x3001..0x3002 SYMBOL
0x3041..0x309F HIRAGANA
0x30A1..0x30FF KATAKANA
0x30FC KATAKANA HIRAGANA
0x4E00..0x9FFF KANJI
0x4E00 KANJINUMERIC KANJI
0x4E8C KANJINUMERIC KANJI
0xFF10..0xFF19 NUMERIC
";

pub const UNK_DEF: &str = "\
DEFAULT,0,0,4769,記号,一般,*,*,*,*,*
SPACE,6,6,200,記号,空白,*,*,*,*,*
KANJI,1,1,16000,名詞,一般,*,*,*,*,*
SYMBOL,6,6,1000,記号,一般,*,*,*,*,*
NUMERIC,1,1,1500,名詞,数,*,*,*,*,*
ALPHA,1,1,4000,名詞,固有名詞,組織,*,*,*,*
HIRAGANA,1,1,10000,名詞,一般,*,*,*,*,*
KATAKANA,1,1,8000,名詞,一般,*,*,*,*,*
KANJINUMERIC,1,1,1500,名詞,数,*,*,*,*,*
";

pub fn sources() -> DictSources<'static> {
    DictSources {
        lexicon: &[LEXICON],
        matrix_def: MATRIX_DEF,
        char_def: CHAR_DEF,
        unk_def: UNK_DEF,
    }
}

pub fn test_dictionary() -> Dictionary {
    Dictionary::from_sources(&sources()).unwrap()
}

/// Write the text sources as a MeCab source directory.
pub fn write_sources(dir: &Path) {
    std::fs::write(dir.join("lex.csv"), LEXICON).unwrap();
    std::fs::write(dir.join("matrix.def"), MATRIX_DEF).unwrap();
    std::fs::write(dir.join("char.def"), CHAR_DEF).unwrap();
    std::fs::write(dir.join("unk.def"), UNK_DEF).unwrap();
}

/// Default penalties, independent of the global settings.
pub fn penalty() -> PenaltySettings {
    PenaltySettings {
        kanji_length_threshold: 2,
        kanji_penalty: 3000,
        other_length_threshold: 7,
        other_penalty: 1700,
    }
}

pub fn user_params() -> UserDictSettings {
    UserDictSettings {
        word_cost_base: -100000,
        minimum_word_cost: i32::MIN / 2,
        left_id: 5,
        right_id: 5,
    }
}

pub fn tokenizer(mode: Mode) -> Tokenizer {
    Tokenizer::builder(Arc::new(test_dictionary()))
        .mode(mode)
        .penalty(penalty())
        .split_clauses(true)
        .build()
}

pub fn tokenizer_with_user(mode: Mode, csv: &str) -> Tokenizer {
    let user = UserDictionary::from_csv_with(csv, &user_params()).unwrap();
    Tokenizer::builder(Arc::new(test_dictionary()))
        .user_dictionary(Arc::new(user))
        .mode(mode)
        .penalty(penalty())
        .split_clauses(true)
        .build()
}

pub fn surfaces<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
    tokens.iter().map(|t| t.surface()).collect()
}

//! A tiny MeCab source directory for command tests.

use std::fs;
use std::path::Path;

use wakachi::dict::{DictSources, Dictionary};

pub const LEXICON: &str = "\
すし,1,1,3000,名詞,一般,*,*,*,*,すし,スシ,スシ
す,1,1,6000,名詞,一般,*,*,*,*,す,ス,ス
し,2,2,5000,動詞,自立,*,*,サ変・スル,連用形,する,シ,シ
が,3,3,1000,助詞,格助詞,一般,*,*,*,が,ガ,ガ
たべ,4,4,3500,動詞,自立,*,*,一段,連用形,たべる,タベ,タベ
たい,5,5,2000,助動詞,*,*,*,特殊・タイ,基本形,たい,タイ,タイ
";

pub const MATRIX_DEF: &str = "6 6\n0 0 0\n";

pub const CHAR_DEF: &str = "\
DEFAULT 0 1 0
SPACE 0 1 0
HIRAGANA 0 1 2
KATAKANA 1 1 2
KANJI 0 0 2

0x0020 SPACE
0x3041..0x309F HIRAGANA
0x30A1..0x30FF KATAKANA
0x4E00..0x9FFF KANJI
";

pub const UNK_DEF: &str = "\
DEFAULT,0,0,4769,記号,一般,*,*,*,*,*
SPACE,0,0,200,記号,空白,*,*,*,*,*
HIRAGANA,1,1,10000,名詞,一般,*,*,*,*,*
KATAKANA,1,1,8000,名詞,一般,*,*,*,*,*
KANJI,1,1,16000,名詞,一般,*,*,*,*,*
";

pub fn dictionary() -> Dictionary {
    Dictionary::from_sources(&DictSources {
        lexicon: &[LEXICON],
        matrix_def: MATRIX_DEF,
        char_def: CHAR_DEF,
        unk_def: UNK_DEF,
    })
    .unwrap()
}

pub fn write_sources(dir: &Path) {
    fs::write(dir.join("lex.csv"), LEXICON).unwrap();
    fs::write(dir.join("matrix.def"), MATRIX_DEF).unwrap();
    fs::write(dir.join("char.def"), CHAR_DEF).unwrap();
    fs::write(dir.join("unk.def"), UNK_DEF).unwrap();
}

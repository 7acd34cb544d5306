/// Chars that close a clause. They stay with the clause they close.
const CLAUSE_TERMINATORS: [char; 2] = ['。', '、'];

/// A slice of the input tokenized on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Clause<'t> {
    pub text: &'t str,
    /// Offset of the first char in the whole input, in chars.
    pub char_offset: usize,
    pub byte_offset: usize,
}

/// Split after every `。` and `、`. An empty input yields no clauses.
pub(crate) fn split_clauses(text: &str) -> Vec<Clause<'_>> {
    let mut clauses = Vec::new();
    let (mut byte_start, mut char_start) = (0, 0);
    for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
        if CLAUSE_TERMINATORS.contains(&ch) {
            let end = byte_idx + ch.len_utf8();
            clauses.push(Clause {
                text: &text[byte_start..end],
                char_offset: char_start,
                byte_offset: byte_start,
            });
            byte_start = end;
            char_start = char_idx + 1;
        }
    }
    if byte_start < text.len() {
        clauses.push(Clause {
            text: &text[byte_start..],
            char_offset: char_start,
            byte_offset: byte_start,
        });
    }
    clauses
}

/// The whole input as one clause.
pub(crate) fn whole(text: &str) -> Vec<Clause<'_>> {
    if text.is_empty() {
        return Vec::new();
    }
    vec![Clause {
        text,
        char_offset: 0,
        byte_offset: 0,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'t>(clauses: &[Clause<'t>]) -> Vec<&'t str> {
        clauses.iter().map(|c| c.text).collect()
    }

    #[test]
    fn split_keeps_terminators() {
        let clauses = split_clauses("すし、たべたい。すし");
        assert_eq!(texts(&clauses), vec!["すし、", "たべたい。", "すし"]);
        assert_eq!(clauses[1].char_offset, 3);
        assert_eq!(clauses[1].byte_offset, 9);
        assert_eq!(clauses[2].char_offset, 8);
    }

    #[test]
    fn split_trailing_terminator_and_runs() {
        assert_eq!(texts(&split_clauses("すし。")), vec!["すし。"]);
        assert_eq!(texts(&split_clauses("。。")), vec!["。", "。"]);
    }

    #[test]
    fn split_empty_and_plain() {
        assert!(split_clauses("").is_empty());
        assert_eq!(texts(&split_clauses("abc")), vec!["abc"]);
        assert!(whole("").is_empty());
        assert_eq!(texts(&whole("a。b")), vec!["a。b"]);
    }
}

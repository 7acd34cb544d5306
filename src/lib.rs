//! Japanese morphological analyzer.
//!
//! Re-exports the analysis API of `wakachi-core` and adds tracing setup for
//! binaries built with the `trace` feature.

pub mod trace_init;

pub use trace_init::init_tracing;
pub use wakachi_core::{
    dict, fst, settings, token, tokenizer, user_dict, DictError, Dictionary, LexType, Mode,
    Token, TokenKind, Tokenization, Tokenizer, TokenizerBuilder, TokenizerError, UserDictError,
    UserDictionary, WordIdx,
};

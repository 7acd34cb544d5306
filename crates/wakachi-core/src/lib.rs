//! Japanese morphological analysis over flat binary dictionaries.
//!
//! A [`Tokenizer`] combines a compiled system [`Dictionary`] (surface FST,
//! token info, connection costs, character classes, unknown-word table) with
//! an optional [`UserDictionary`], builds a lattice per clause and picks the
//! cheapest segmentation, or several ranked alternatives.

pub(crate) mod csv;
pub mod dict;
pub mod fst;
pub mod settings;
pub mod token;
pub mod tokenizer;
pub mod user_dict;

pub use dict::{DictError, Dictionary, LexType, WordIdx};
pub use token::{Token, TokenKind};
pub use tokenizer::{Mode, Tokenization, Tokenizer, TokenizerBuilder, TokenizerError};
pub use user_dict::{UserDictError, UserDictionary};

pub mod config_ops;
pub mod dict_ops;
pub mod tokenize_ops;

#[cfg(test)]
pub(crate) mod fixture;

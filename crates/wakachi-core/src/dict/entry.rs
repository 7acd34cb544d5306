/// One lexicon row: a surface form with its connection ids, cost and features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub surface: String,
    pub left_id: u16,
    pub right_id: u16,
    pub cost: i16,
    pub features: Vec<String>,
}

/// Tokenize text into terms: split on whitespace, lowercase, and strip every
/// non-alphanumeric character. Fragments left empty are dropped; order and
/// duplicates are kept so term frequencies can be counted from the output.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|raw| {
            // whole-fragment lowercasing applies context rules such as final sigma
            let term: String = raw.to_lowercase().chars().filter(|c| c.is_alphanumeric()).collect();
            if term.is_empty() { None } else { Some(term) }
        })
        .collect()
}

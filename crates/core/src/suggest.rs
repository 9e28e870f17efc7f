//! "Did you mean" suggestions for invalid names
//!
//! Edit-distance ranking over the set of valid names, accepting candidates
//! within a threshold scaled to the input length.

/// Valid names close enough to `input` to be worth suggesting, nearest first.
pub fn suggestion_list(input: &str, options: &[String]) -> Vec<String> {
    let threshold = (input.len() as f64 * 0.4).floor() as usize + 1;
    let input_lower = input.to_lowercase();

    let mut scored: Vec<(usize, &String)> = options
        .iter()
        .filter_map(|option| {
            let distance = levenshtein(&input_lower, &option.to_lowercase());
            (distance <= threshold).then_some((distance, option))
        })
        .collect();

    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().map(|(_, option)| option.clone()).collect()
}

/// Classic two-row Levenshtein distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein("", "db"), 2);
        assert_eq!(levenshtein("db", "db"), 0);
        assert_eq!(levenshtein("db", "dbx"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn suggests_close_names_only() {
        let options = vec!["db".to_string(), "log".to_string(), "request".to_string()];
        assert_eq!(suggestion_list("dbx", &options), vec!["db".to_string()]);
        assert!(suggestion_list("completelyunrelated", &options).is_empty());
    }

    #[test]
    fn nearest_suggestion_first() {
        let options = vec!["worlds".to_string(), "world".to_string()];
        let suggestions = suggestion_list("wrold", &options);
        assert_eq!(suggestions.first().map(String::as_str), Some("world"));
    }
}

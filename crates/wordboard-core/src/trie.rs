use std::collections::BTreeMap;
use std::mem;

#[derive(Debug, Default)]
struct TrieNode {
    /// Children kept in ascending character order; the first-word query
    /// relies on this for its lexicographic tie-break.
    children: BTreeMap<char, TrieNode>,
    terminal: bool,
}

/// In-memory prefix dictionary, built once from a word list at startup.
#[derive(Debug, Default)]
pub struct PrefixDictionary {
    root: TrieNode,
}

impl PrefixDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::new();
        for word in words {
            dict.insert(word.as_ref());
        }
        dict
    }

    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.terminal = true;
    }

    /// Exact-membership query.
    pub fn contains(&self, word: &str) -> bool {
        self.walk(word).map(|n| n.terminal).unwrap_or(false)
    }

    /// All complete words extending `prefix`. Returned in ascending order,
    /// though callers must not rely on any particular ordering.
    pub fn find_all_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut words = Vec::new();
        if let Some(node) = self.walk(prefix) {
            collect_words(node, prefix.to_string(), &mut words);
        }
        words
    }

    /// The lexicographically smallest complete word extending `prefix`, or
    /// `None` if the prefix is unreachable.
    pub fn find_first_with_prefix(&self, prefix: &str) -> Option<String> {
        let mut node = self.walk(prefix)?;
        let mut word = prefix.to_string();
        loop {
            if node.terminal {
                return Some(word);
            }
            // Every node lies on the path of at least one complete word, so
            // descending into the smallest child always reaches the
            // lexicographically first match.
            let (ch, next) = node.children.iter().next()?;
            word.push(*ch);
            node = next;
        }
    }

    pub fn word_count(&self) -> usize {
        fn count(node: &TrieNode) -> usize {
            let own = usize::from(node.terminal);
            own + node.children.values().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    pub fn node_count(&self) -> usize {
        fn count(node: &TrieNode) -> usize {
            1 + node.children.values().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    /// Rough heap footprint, informational only.
    pub fn approx_memory_bytes(&self) -> usize {
        fn bytes(node: &TrieNode) -> usize {
            mem::size_of::<TrieNode>()
                + node
                    .children
                    .values()
                    .map(|c| mem::size_of::<char>() + bytes(c))
                    .sum::<usize>()
        }
        bytes(&self.root)
    }

    fn walk(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }
}

fn collect_words(node: &TrieNode, prefix: String, words: &mut Vec<String>) {
    if node.terminal {
        words.push(prefix.clone());
    }
    for (ch, child) in &node.children {
        let mut next = prefix.clone();
        next.push(*ch);
        collect_words(child, next, words);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PrefixDictionary {
        PrefixDictionary::from_words(["apple", "app", "apricot", "banana", "berry", "blueberry"])
    }

    #[test]
    fn contains_is_exact_match() {
        let dict = sample();
        assert!(dict.contains("app"));
        assert!(dict.contains("apple"));
        assert!(!dict.contains("ap"));
        assert!(!dict.contains("apples"));
        assert!(!dict.contains(""));
    }

    #[test]
    fn find_all_with_prefix_lists_extensions() {
        let dict = sample();
        let mut words = dict.find_all_with_prefix("ap");
        words.sort();
        assert_eq!(words, vec!["app", "apple", "apricot"]);
        assert!(dict.find_all_with_prefix("bat").is_empty());
        assert_eq!(dict.find_all_with_prefix("").len(), 6);
    }

    #[test]
    fn find_first_with_prefix_is_lexicographically_minimal() {
        let dict = sample();
        assert_eq!(dict.find_first_with_prefix("app").as_deref(), Some("app"));
        assert_eq!(dict.find_first_with_prefix("b").as_deref(), Some("banana"));
        assert_eq!(dict.find_first_with_prefix("bat"), None);
        assert_eq!(dict.find_first_with_prefix("").as_deref(), Some("app"));
    }

    #[test]
    fn shorter_word_wins_over_longer_extension() {
        let dict = PrefixDictionary::from_words(["ab", "a"]);
        assert_eq!(dict.find_first_with_prefix("").as_deref(), Some("a"));
        assert_eq!(dict.find_first_with_prefix("a").as_deref(), Some("a"));
        assert_eq!(dict.find_first_with_prefix("ab").as_deref(), Some("ab"));
    }

    #[test]
    fn counters_reflect_contents() {
        let dict = PrefixDictionary::from_words(["cab", "car"]);
        assert_eq!(dict.word_count(), 2);
        // root + c + a + b + r
        assert_eq!(dict.node_count(), 5);
        assert!(dict.approx_memory_bytes() > 0);
    }
}

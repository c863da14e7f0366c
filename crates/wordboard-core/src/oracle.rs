use crate::error::Error;
use crate::trie::PrefixDictionary;
use async_trait::async_trait;

/// Capability contract: "first complete word with this prefix, or none".
///
/// The tie-break rule is part of the contract, not an implementation
/// detail: implementations must return the word an ascending character
/// order depth-first walk of the dictionary would find first, i.e. the
/// lexicographically smallest match. A local dictionary and a remote
/// lookup must be indistinguishable to callers.
#[async_trait]
pub trait WordOracle: Send + Sync {
    async fn first_word_with_prefix(&self, prefix: &str) -> Result<Option<String>, Error>;
}

#[async_trait]
impl WordOracle for PrefixDictionary {
    async fn first_word_with_prefix(&self, prefix: &str) -> Result<Option<String>, Error> {
        Ok(self.find_first_with_prefix(prefix))
    }
}

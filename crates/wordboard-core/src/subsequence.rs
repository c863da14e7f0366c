//! Depth-first enumeration of order-preserving subsequences of a tagged
//! letter set, optionally pruned against a [`WordOracle`].
//!
//! For n distinct letters the unfiltered enumeration yields every
//! permutation of every non-empty subset, sum over k of n!/(n-k)! values
//! in total (n=2 gives 3, n=3 gives 15). Repeated letters are collapsed by the
//! duplicate-shadowing rule: among the remaining copies of a letter, only
//! the earliest-indexed copy may be taken at each branch point.

use crate::error::Error;
use crate::model::TaggedLetter;
use crate::oracle::WordOracle;

/// Default enumeration ceiling; inputs longer than this are rejected
/// before any traversal.
pub const DEFAULT_MAX_INPUT_LEN: usize = 8;

/// Tag each letter with its original index so repeated letters stay
/// distinguishable during the search.
pub fn tag_letters(letters: &str) -> Vec<TaggedLetter> {
    letters
        .chars()
        .enumerate()
        .map(|(i, ch)| TaggedLetter::new(ch, i as u32))
        .collect()
}

/// One pending node of the depth-first traversal.
#[derive(Debug, Clone)]
struct Frame {
    sequence: Vec<TaggedLetter>,
    remaining: Vec<TaggedLetter>,
}

impl Frame {
    fn prefix(&self) -> String {
        self.sequence.iter().map(|t| t.letter).collect()
    }
}

fn check_input_len(letters: &[TaggedLetter], max_length: usize) -> Result<(), Error> {
    if letters.len() > max_length {
        return Err(Error::Validation(format!(
            "input has {} letters, limit is {}",
            letters.len(),
            max_length
        )));
    }
    Ok(())
}

/// Push the expansions of `frame` onto `stack`, in reverse element order so
/// the lowest-index expansion is visited first.
fn push_children(stack: &mut Vec<Frame>, frame: &Frame) {
    for i in (0..frame.remaining.len()).rev() {
        let pick = frame.remaining[i];
        // Duplicate shadowing: a copy of a letter may only be taken if no
        // other remaining copy has a strictly smaller original index,
        // otherwise the same letter content would be generated through
        // several index choices.
        let shadowed = frame
            .remaining
            .iter()
            .any(|other| other.letter == pick.letter && other.index < pick.index);
        if shadowed {
            continue;
        }
        let mut sequence = frame.sequence.clone();
        sequence.push(pick);
        let mut remaining = frame.remaining.clone();
        remaining.remove(i);
        stack.push(Frame { sequence, remaining });
    }
}

/// Lazy, finite, restartable enumeration of all order-preserving
/// subsequences, unfiltered. Pre-order: a prefix is yielded before any of
/// its extensions.
pub struct Subsequences {
    stack: Vec<Frame>,
    min_length: usize,
}

impl Subsequences {
    pub fn new(
        letters: Vec<TaggedLetter>,
        min_length: usize,
        max_length: usize,
    ) -> Result<Self, Error> {
        check_input_len(&letters, max_length)?;
        Ok(Self {
            stack: vec![Frame {
                sequence: Vec::new(),
                remaining: letters,
            }],
            min_length,
        })
    }
}

impl Iterator for Subsequences {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(frame) = self.stack.pop() {
            push_children(&mut self.stack, &frame);
            if !frame.sequence.is_empty() && frame.sequence.len() >= self.min_length {
                return Some(frame.prefix());
            }
        }
        None
    }
}

/// Dictionary-pruned search. Each call to [`WordSearch::next_word`] resumes
/// the traversal and returns the next discovered word, making exactly one
/// oracle call per DFS node visited.
///
/// A branch whose prefix the oracle cannot extend is abandoned outright:
/// prefix extension is anti-monotonic with respect to dictionary
/// membership, so nothing at or below that prefix can match. A value is
/// emitted only when the accumulated prefix exactly equals the oracle's
/// returned word.
pub struct WordSearch {
    stack: Vec<Frame>,
    min_length: usize,
}

impl WordSearch {
    pub fn new(
        letters: Vec<TaggedLetter>,
        min_length: usize,
        max_length: usize,
    ) -> Result<Self, Error> {
        check_input_len(&letters, max_length)?;
        Ok(Self {
            stack: vec![Frame {
                sequence: Vec::new(),
                remaining: letters,
            }],
            min_length,
        })
    }

    pub async fn next_word(&mut self, oracle: &dyn WordOracle) -> Result<Option<String>, Error> {
        while let Some(frame) = self.stack.pop() {
            let mut hit = None;
            if !frame.sequence.is_empty() {
                match oracle.first_word_with_prefix(&frame.prefix()).await? {
                    // No word extends this prefix: prune the whole branch.
                    None => continue,
                    Some(word) => hit = Some(word),
                }
            }
            push_children(&mut self.stack, &frame);
            if let Some(word) = hit {
                if frame.sequence.len() >= self.min_length && word == frame.prefix() {
                    return Ok(Some(word));
                }
            }
        }
        Ok(None)
    }
}

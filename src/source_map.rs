//! Maps positions in a transformed string back to the original input.
//!
//! Conversions like half-width folding or romaji transliteration change the
//! number of characters in a string. [`TextSourceMap`] records, per output
//! character, how many input characters it consumed, so a multi-step text
//! pipeline stays position-addressable. Every conversion that accepts a map
//! behaves identically when given `None`.

/// An ordered sequence of weights, one per output character.
///
/// The sum of all weights always equals the length of the consumed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSourceMap {
    source: String,
    mapping: Vec<usize>,
}

impl TextSourceMap {
    /// Creates an identity map over `source`: one weight of 1 per character.
    pub fn new<T: Into<String>>(source: T) -> Self {
        let source = source.into();
        let mapping = source.chars().map(|_| 1).collect();
        Self { source, mapping }
    }

    pub fn with_mapping<T: Into<String>>(source: T, mapping: Vec<usize>) -> Self {
        Self {
            source: source.into(),
            mapping,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn mapping(&self) -> &[usize] {
        &self.mapping
    }

    /// How many source characters the first `output_length` output characters
    /// were derived from.
    pub fn source_length(&self, output_length: usize) -> usize {
        self.mapping.iter().take(output_length).sum()
    }

    /// Merges the `count` weights following `index` into the entry at `index`.
    ///
    /// Used when several input characters collapse into one output character.
    /// Out-of-range portions are clamped; the entry at `index` itself is never
    /// removed.
    pub fn combine(&mut self, index: usize, count: usize) {
        if count == 0 || index >= self.mapping.len() {
            return;
        }
        let end = (index + 1 + count).min(self.mapping.len());
        let merged: usize = self.mapping.drain(index + 1..end).sum();
        self.mapping[index] += merged;
    }

    /// Splices new weight entries in at `index`.
    ///
    /// A weight of 0 marks an output character synthesized with no
    /// corresponding input.
    pub fn insert(&mut self, index: usize, weights: &[usize]) {
        let index = index.min(self.mapping.len());
        self.mapping.splice(index..index, weights.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identity_map() {
        let map = TextSourceMap::new("あいう");
        assert_eq!(map.mapping(), &[1, 1, 1]);
        assert_eq!(map.source_length(2), 2);
    }

    #[test]
    fn combine_merges_following_weights() {
        let mut map = TextSourceMap::new("abcd");
        map.combine(1, 2);
        assert_eq!(map.mapping(), &[1, 3]);
        assert_eq!(map.source_length(2), 4);
    }

    #[test]
    fn combine_clamps_out_of_range() {
        let mut map = TextSourceMap::new("ab");
        map.combine(1, 5);
        assert_eq!(map.mapping(), &[1, 1]);
        map.combine(9, 1);
        assert_eq!(map.mapping(), &[1, 1]);
    }

    #[test]
    fn insert_splices_zero_width_entries() {
        let mut map = TextSourceMap::new("ab");
        map.insert(1, &[0, 0]);
        assert_eq!(map.mapping(), &[1, 0, 0, 1]);
        assert_eq!(map.source_length(4), 2);
    }

    #[test]
    fn weight_sum_is_preserved() {
        let mut map = TextSourceMap::new("abcdef");
        map.combine(0, 1);
        map.insert(3, &[0]);
        map.combine(3, 2);
        let total: usize = map.mapping().iter().sum();
        assert_eq!(total, 6);
    }
}

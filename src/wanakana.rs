//! Romaji transliteration behind an injectable backend.
//!
//! The romanization backend is an optional capability: a [`KanaConverter`]
//! built without one reports the affected conversions as unsupported and
//! fails them immediately instead of degrading silently.

use wana_kana::ConvertJapanese;

use crate::{errors::RomanizationError, source_map::TextSourceMap};

/// A romanization backend.
pub trait Romanizer {
    /// lowercase text will result in Hiragana,
    /// and UPPERCASE text will result in Katakana.
    fn to_kana(&self, text: &str) -> String;
    fn to_hiragana(&self, text: &str) -> String;
    fn to_romaji(&self, text: &str) -> String;
}

/// The default backend, over the `wana_kana` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WanaKana;

impl Romanizer for WanaKana {
    fn to_kana(&self, text: &str) -> String {
        text.to_kana()
    }

    fn to_hiragana(&self, text: &str) -> String {
        text.to_hiragana()
    }

    fn to_romaji(&self, text: &str) -> String {
        text.to_romaji()
    }
}

/// Kana/romaji conversion with an optional [`Romanizer`] backend.
#[derive(Debug, Clone)]
pub struct KanaConverter<R = WanaKana> {
    backend: Option<R>,
}

impl KanaConverter<WanaKana> {
    pub fn new() -> Self {
        Self {
            backend: Some(WanaKana),
        }
    }
}

impl Default for KanaConverter<WanaKana> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Romanizer> KanaConverter<R> {
    pub fn with_backend(backend: R) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A converter with no backend; every romanization-dependent conversion
    /// reports unsupported.
    pub fn without_backend() -> Self {
        Self { backend: None }
    }

    pub fn convert_to_kana_supported(&self) -> bool {
        self.backend.is_some()
    }

    pub fn convert_to_romaji_supported(&self) -> bool {
        self.backend.is_some()
    }

    pub fn convert_alphabetic_to_kana_supported(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Result<&R, RomanizationError> {
        self.backend.as_ref().ok_or(RomanizationError::Unsupported)
    }

    pub fn convert_to_kana(&self, text: &str) -> Result<String, RomanizationError> {
        Ok(self.backend()?.to_kana(text))
    }

    pub fn convert_to_hiragana(&self, text: &str) -> Result<String, RomanizationError> {
        Ok(self.backend()?.to_hiragana(text))
    }

    pub fn convert_to_romaji(&self, text: &str) -> Result<String, RomanizationError> {
        Ok(self.backend()?.to_romaji(text))
    }

    /// Transliterates runs of Latin letters (half or full width, plus '-')
    /// to hiragana; anything else passes through and flushes the pending
    /// run. Source positions for each run are aligned on the optional
    /// `source_map`.
    pub fn convert_alphabetic_to_kana(
        &self,
        text: &str,
        mut source_map: Option<&mut TextSourceMap>,
    ) -> Result<String, RomanizationError> {
        let backend = self.backend()?;
        let mut part = String::new();
        let mut result = String::new();
        let mut result_len = 0;

        for char in text.chars() {
            let code_point = match char as u32 {
                cp @ 0x41..=0x5a => cp + (0x61 - 0x41), // ['A', 'Z']
                cp @ 0x61..=0x7a => cp,                 // ['a', 'z']
                cp @ 0xff21..=0xff3a => cp - (0xff21 - 0x61), // ['Ａ', 'Ｚ']
                cp @ 0xff41..=0xff5a => cp - (0xff41 - 0x61), // ['ａ', 'ｚ']
                0x2d | 0xff0d => 0x2d, // '-' or fullwidth dash
                _ => {
                    if !part.is_empty() {
                        let converted = convert_alphabetic_part_to_kana(
                            backend,
                            &part,
                            source_map.as_deref_mut(),
                            result_len,
                        );
                        result_len += converted.chars().count();
                        result.push_str(&converted);
                        part.clear();
                    }
                    result.push(char);
                    result_len += 1;
                    continue;
                }
            };
            if let Some(normalized) = char::from_u32(code_point) {
                part.push(normalized);
            }
        }

        if !part.is_empty() {
            let converted =
                convert_alphabetic_part_to_kana(backend, &part, source_map.as_deref_mut(), result_len);
            result.push_str(&converted);
        }

        Ok(result)
    }
}

fn convert_alphabetic_part_to_kana<R: Romanizer>(
    backend: &R,
    text: &str,
    source_map: Option<&mut TextSourceMap>,
    source_map_start: usize,
) -> String {
    let result = backend.to_hiragana(text);

    // Align each source character with its output characters: grow the
    // source prefix until its own romanization is a prefix of the full
    // result, then record the merges and zero-width insertions.
    if let Some(map) = source_map {
        let text_chars: Vec<char> = text.chars().collect();
        let result_chars: Vec<char> = result.chars().collect();
        let mut map_index = source_map_start;
        let mut i = 0;
        let mut result_pos = 0;
        while i < text_chars.len() {
            let mut i_next = i + 1;
            let mut result_pos_next = result_chars.len();
            while i_next < text_chars.len() {
                let prefix: String = text_chars[..i_next].iter().collect();
                let converted: Vec<char> = backend.to_hiragana(&prefix).chars().collect();
                if converted.len() <= result_chars.len()
                    && converted[..] == result_chars[..converted.len()]
                {
                    result_pos_next = converted.len();
                    break;
                }
                i_next += 1;
            }

            // Merge characters
            let removals = i_next - i - 1;
            if removals > 0 {
                map.combine(map_index, removals);
            }
            map_index += 1;

            // Empty elements
            let additions = result_pos_next.saturating_sub(result_pos + 1);
            for _ in 0..additions {
                map.insert(map_index, &[0]);
                map_index += 1;
            }

            i = i_next;
            result_pos = result_pos_next;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_backend_is_unsupported() {
        let converter = KanaConverter::<WanaKana>::without_backend();
        assert!(!converter.convert_to_kana_supported());
        assert!(!converter.convert_to_romaji_supported());
        assert!(!converter.convert_alphabetic_to_kana_supported());
        assert_eq!(
            converter.convert_to_kana("yomikata"),
            Err(RomanizationError::Unsupported)
        );
        assert_eq!(
            converter.convert_alphabetic_to_kana("yomikata", None),
            Err(RomanizationError::Unsupported)
        );
    }

    #[test]
    fn basic_conversions() {
        let converter = KanaConverter::new();
        assert!(converter.convert_to_kana_supported());
        assert_eq!(
            converter.convert_to_hiragana("yomikata").as_deref(),
            Ok("よみかた")
        );
        assert_eq!(
            converter.convert_to_romaji("よみかた").as_deref(),
            Ok("yomikata")
        );
    }

    #[test]
    fn alphabetic_passthrough() {
        let converter = KanaConverter::new();
        assert_eq!(
            converter.convert_alphabetic_to_kana("wa!ta", None).as_deref(),
            Ok("わ!た")
        );
    }

    #[test]
    fn fullwidth_letters_are_narrowed() {
        let converter = KanaConverter::new();
        assert_eq!(
            converter.convert_alphabetic_to_kana("ＹＯＭＩ", None).as_deref(),
            Ok("よみ")
        );
    }

    #[test]
    fn alphabetic_source_map() {
        let converter = KanaConverter::new();
        let mut map = TextSourceMap::new("yomikata");
        let result = converter
            .convert_alphabetic_to_kana("yomikata", Some(&mut map))
            .unwrap();
        assert_eq!(result, "よみかた");
        // Each kana consumed two romaji characters
        assert_eq!(map.mapping(), &[2, 2, 2, 2]);
        assert_eq!(map.source_length(4), 8);
    }

    #[test]
    fn alphabetic_source_map_expansion() {
        let converter = KanaConverter::new();
        let mut map = TextSourceMap::new("kya");
        let result = converter
            .convert_alphabetic_to_kana("kya", Some(&mut map))
            .unwrap();
        assert_eq!(result, "きゃ");
        // All three romaji collapse into the first kana; the small kana is
        // synthesized with no source of its own
        assert_eq!(map.mapping(), &[3, 0]);
        assert_eq!(map.source_length(2), 3);
    }
}

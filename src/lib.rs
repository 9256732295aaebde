//! Japanese text analysis for dictionary lookup and flashcard export.
//!
//! The crate answers three questions about a term/reading pair pulled from a
//! dictionary: which code points are kana, kanji, or otherwise Japanese; how
//! a kana string splits into morae and where its pitch accent falls; and
//! which kana of the reading belong above which characters of the term
//! ([`distribute_furigana`]). Kana normalization (katakana/hiragana,
//! half-width, romaji) feeds all three, with an optional [`TextSourceMap`]
//! tracking positions across the conversions.
//!
//! ```
//! use yomikata::distribute_furigana;
//!
//! let segments = distribute_furigana("食べる".into(), "たべる".into());
//! assert_eq!(segments[0].text, "食");
//! assert_eq!(segments[0].reading.as_deref(), Some("た"));
//! assert_eq!(segments[1].text, "べる");
//! assert_eq!(segments[1].reading, None);
//! ```

pub mod cjk_utils;
pub mod errors;
pub mod japanese;
pub mod source_map;
pub mod text_utilities;
pub mod wanakana;

pub use cjk_utils::{is_code_point_kanji, CodepointRange};
pub use errors::RomanizationError;
pub use japanese::{
    collapse_emphatic_sequences, convert_halfwidth_kana_to_fullwidth,
    convert_hiragana_to_katakana, convert_katakana_to_hiragana, distribute_furigana,
    distribute_furigana_inflected, get_kana_diacritic_info, get_kana_mora_count, get_kana_morae,
    get_pitch_category, is_code_point_japanese, is_code_point_kana, is_mora_pitch_high,
    DiacriticInfo, DiacriticType, FuriganaSegment, PitchCategory,
};
pub use source_map::TextSourceMap;
pub use wanakana::{KanaConverter, Romanizer, WanaKana};

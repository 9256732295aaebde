//! Kana conversion, mora segmentation, pitch accent, and furigana
//! distribution.
//!
//! Everything in this module is a pure function over `char` code points; the
//! only mutation is the optional [`TextSourceMap`] some conversions accept to
//! keep transformed text position-addressable.

use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use log::trace;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    cjk_utils::{is_code_point_in_range, is_code_point_in_ranges, CodepointRange, CJK_IDEOGRAPH_RANGES},
    source_map::TextSourceMap,
};

pub const HIRAGANA_SMALL_TSU_CODE_POINT: u32 = 0x3063;
pub const KATAKANA_SMALL_TSU_CODE_POINT: u32 = 0x30c3;
pub const KATAKANA_SMALL_KA_CODE_POINT: u32 = 0x30f5;
pub const KATAKANA_SMALL_KE_CODE_POINT: u32 = 0x30f6;
pub const KANA_PROLONGED_SOUND_MARK_CODE_POINT: u32 = 0x30fc;

pub const HIRAGANA_CONVERSION_RANGE: CodepointRange = (0x3041, 0x3096);
pub const KATAKANA_CONVERSION_RANGE: CodepointRange = (0x30a1, 0x30f6);

// The hiragana and katakana blocks are offset by a fixed constant.
const KATAKANA_TO_HIRAGANA_OFFSET: u32 = KATAKANA_CONVERSION_RANGE.0 - HIRAGANA_CONVERSION_RANGE.0;

pub const HIRAGANA_RANGE: CodepointRange = (0x3040, 0x309f);
pub const KATAKANA_RANGE: CodepointRange = (0x30a0, 0x30ff);

pub const KANA_RANGES: &[CodepointRange] = &[HIRAGANA_RANGE, KATAKANA_RANGE];

const JAPANESE_RANGES_BASE: [CodepointRange; 14] = [
    HIRAGANA_RANGE,
    KATAKANA_RANGE,
    (0xff66, 0xff9f), // Halfwidth katakana
    (0x30fb, 0x30fc), // Katakana punctuation
    (0xff61, 0xff65), // Kana punctuation
    (0x3000, 0x303f), // CJK punctuation
    (0xff10, 0xff19), // Fullwidth numbers
    (0xff21, 0xff3a), // Fullwidth upper case Latin letters
    (0xff41, 0xff5a), // Fullwidth lower case Latin letters
    (0xff01, 0xff0f), // Fullwidth punctuation 1
    (0xff1a, 0xff1f), // Fullwidth punctuation 2
    (0xff3b, 0xff3f), // Fullwidth punctuation 3
    (0xff5b, 0xff60), // Fullwidth punctuation 4
    (0xffe0, 0xffee), // Currency markers
];

/// Every range considered "Japanese" text, ordered by expected frequency.
pub static JAPANESE_RANGES: LazyLock<[CodepointRange; 26]> = LazyLock::new(|| {
    let mut combined: [CodepointRange; 26] = [(0, 0); 26];
    combined[..14].copy_from_slice(&JAPANESE_RANGES_BASE);
    combined[14..].copy_from_slice(&CJK_IDEOGRAPH_RANGES);
    combined
});

/// Small kana which merge into the preceding mora. The small tsu is absent
/// because the sokuon counts as a mora of its own.
pub static SMALL_KANA_SET: LazyLock<HashSet<char>> = LazyLock::new(|| {
    HashSet::from([
        'ぁ', 'ぃ', 'ぅ', 'ぇ', 'ぉ', 'ゃ', 'ゅ', 'ょ', 'ゎ', 'ァ', 'ィ', 'ゥ', 'ェ', 'ォ', 'ャ',
        'ュ', 'ョ', 'ヮ',
    ])
});

/// Half-width katakana to the plain/dakuten/handakuten full-width forms.
/// A missing column means the voiced variant does not exist.
#[rustfmt::skip]
pub static HALFWIDTH_KATAKANA_MAP: LazyLock<HashMap<char, &str>> = LazyLock::new(|| {
    HashMap::from([
        ('･', "・"),('ｦ', "ヲヺ"),('ｧ', "ァ"),('ｨ', "ィ"),('ｩ', "ゥ"),('ｪ', "ェ"),
        ('ｫ', "ォ"),('ｬ', "ャ"),('ｭ', "ュ"),('ｮ', "ョ"),('ｯ', "ッ"),('ｰ', "ー"),
        ('ｱ', "ア"),('ｲ', "イ"),('ｳ', "ウヴ"),('ｴ', "エ"),('ｵ', "オ"),('ｶ', "カガ"),
        ('ｷ', "キギ"),('ｸ', "クグ"),('ｹ', "ケゲ"),('ｺ', "コゴ"),('ｻ', "サザ"),
        ('ｼ', "シジ"),('ｽ', "スズ"),('ｾ', "セゼ"),('ｿ', "ソゾ"),('ﾀ', "タダ"),('ﾁ', "チヂ"),
        ('ﾂ', "ツヅ"),('ﾃ', "テデ"),('ﾄ', "トド"),('ﾅ', "ナ"),('ﾆ', "ニ"),('ﾇ', "ヌ"),
        ('ﾈ', "ネ"),('ﾉ', "ノ"),('ﾊ', "ハバパ"),('ﾋ', "ヒビピ"),('ﾌ', "フブプ"),
        ('ﾍ', "ヘベペ"),('ﾎ', "ホボポ"),('ﾏ', "マ"),('ﾐ', "ミ"),('ﾑ', "ム"),
        ('ﾒ', "メ"),('ﾓ', "モ"),('ﾔ', "ヤ"),('ﾕ', "ユ"),('ﾖ', "ヨ"),('ﾗ', "ラ"),
        ('ﾘ', "リ"),('ﾙ', "ル"),('ﾚ', "レ"),('ﾛ', "ロ"),('ﾜ', "ワ"),('ﾝ', "ン"),
    ])
});

#[rustfmt::skip]
static VOWEL_TO_KANA_MAPPING: LazyLock<HashMap<char, &str>> = LazyLock::new(|| {
    HashMap::from([
        ('a', "ぁあかがさざただなはばぱまゃやらゎわヵァアカガサザタダナハバパマャヤラヮワヵヷ"),
        ('i', "ぃいきぎしじちぢにひびぴみりゐィイキギシジチヂニヒビピミリヰヸ"),
        ('u', "ぅうくぐすずっつづぬふぶぷむゅゆるゥウクグスズッツヅヌフブプムュユルヴ"),
        ('e', "ぇえけげせぜてでねへべぺめれゑヶェエケゲセゼテデネヘベペメレヱヶヹ"),
        ('o', "ぉおこごそぞとどのほぼぽもょよろをォオコゴソゾトドノホボポモョヨロヲヺ"),
        ('_', "のノ"),
    ])
});

pub static KANA_TO_VOWEL_MAPPING: LazyLock<HashMap<char, char>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (&vowel, characters) in VOWEL_TO_KANA_MAPPING.iter() {
        for char in characters.chars() {
            map.insert(char, vowel);
        }
    }
    map
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiacriticType {
    Dakuten,
    Handakuten,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiacriticInfo {
    pub character: char,
    pub diacritic_type: DiacriticType,
}

pub static DIACRITIC_MAPPING: LazyLock<HashMap<char, DiacriticInfo>> = LazyLock::new(|| {
    const KANA: &str = "うゔ-かが-きぎ-くぐ-けげ-こご-さざ-しじ-すず-せぜ-そぞ-ただ-ちぢ-つづ-てで-とど-はばぱひびぴふぶぷへべぺほぼぽワヷ-ヰヸ-ウヴ-ヱヹ-ヲヺ-カガ-キギ-クグ-ケゲ-コゴ-サザ-シジ-スズ-セゼ-ソゾ-タダ-チヂ-ツヅ-テデ-トド-ハバパヒビピフブプヘベペホボポ";
    let mut map = HashMap::new();
    let chars: Vec<char> = KANA.chars().collect();
    for chunk in chars.chunks(3) {
        if let [character, dakuten, handakuten] = *chunk {
            map.insert(
                dakuten,
                DiacriticInfo {
                    character,
                    diacritic_type: DiacriticType::Dakuten,
                },
            );
            if handakuten != '-' {
                map.insert(
                    handakuten,
                    DiacriticInfo {
                        character,
                        diacritic_type: DiacriticType::Handakuten,
                    },
                );
            }
        }
    }
    map
});

/// One span of a term paired with its kana reading. A `None` reading means
/// the span is already kana and needs no annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuriganaSegment {
    pub text: String,
    pub reading: Option<String>,
}

impl FuriganaSegment {
    pub fn new(text: String, reading: Option<String>) -> Self {
        Self { text, reading }
    }
}

/// A maximal run of kana or non-kana characters within a term.
#[derive(Debug, Clone)]
struct FuriganaGroup {
    is_kana: bool,
    text: String,
    text_normalized: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchCategory {
    Heiban,
    Kifuku,
    Atamadaka,
    Odaka,
    Nakadaka,
}

pub fn is_code_point_kana(code_point: u32) -> bool {
    is_code_point_in_ranges(code_point, KANA_RANGES)
}

pub fn is_code_point_japanese(code_point: u32) -> bool {
    is_code_point_in_ranges(code_point, &*JAPANESE_RANGES)
}

pub fn is_string_entirely_kana<T: AsRef<str>>(text: T) -> bool {
    let text = text.as_ref();
    if text.is_empty() {
        return false;
    }
    text.chars().all(|c| is_code_point_kana(c as u32))
}

pub fn is_string_partially_japanese<T: AsRef<str>>(text: T) -> bool {
    text.as_ref()
        .chars()
        .any(|c| is_code_point_japanese(c as u32))
}

/// Whether a given string may be worth looking up in a dictionary.
///
/// Used as a filter for situations such as whether a clipboard monitor
/// should activate when text is copied.
pub fn is_lookup_worthy<T: AsRef<str>>(text: T) -> bool {
    text.as_ref()
        .graphemes(true)
        .filter_map(|g| g.chars().next())
        .any(|c| is_code_point_japanese(c as u32))
}

/// The hiragana vowel that continues the previous character's vowel sound.
/// Elongated `o` is written with う per standard orthography.
fn get_prolonged_hiragana(previous: char) -> Option<char> {
    match KANA_TO_VOWEL_MAPPING.get(&previous) {
        Some('a') => Some('あ'),
        Some('i') => Some('い'),
        Some('u') => Some('う'),
        Some('e') => Some('え'),
        Some('o') => Some('う'),
        _ => None,
    }
}

pub fn convert_katakana_to_hiragana<T: AsRef<str>>(
    text: T,
    keep_prolonged_sound_marks: bool,
) -> String {
    let text = text.as_ref();
    let mut result = String::new();

    for char in text.chars() {
        let mut converted_char = char;
        let code_point = char as u32;
        match code_point {
            KATAKANA_SMALL_KA_CODE_POINT | KATAKANA_SMALL_KE_CODE_POINT => {
                // No hiragana counterpart
            }
            KANA_PROLONGED_SOUND_MARK_CODE_POINT => {
                if !keep_prolonged_sound_marks {
                    if let Some(char2) = result.chars().last().and_then(get_prolonged_hiragana) {
                        converted_char = char2;
                    }
                }
            }
            _ => {
                if is_code_point_in_range(code_point, KATAKANA_CONVERSION_RANGE) {
                    if let Some(new_char) = char::from_u32(code_point - KATAKANA_TO_HIRAGANA_OFFSET)
                    {
                        converted_char = new_char;
                    }
                }
            }
        }
        result.push(converted_char);
    }

    result
}

pub fn convert_hiragana_to_katakana<T: AsRef<str>>(text: T) -> String {
    let text = text.as_ref();
    let mut result = String::new();

    for char in text.chars() {
        let mut converted_char = char;
        let code_point = char as u32;
        if is_code_point_in_range(code_point, HIRAGANA_CONVERSION_RANGE) {
            if let Some(new_char) = char::from_u32(code_point + KATAKANA_TO_HIRAGANA_OFFSET) {
                converted_char = new_char;
            }
        }
        result.push(converted_char);
    }

    result
}

pub fn convert_numeric_to_fullwidth<T: AsRef<str>>(text: T) -> String {
    text.as_ref()
        .chars()
        .map(|c| match c {
            '0'..='9' => char::from_u32(c as u32 + (0xff10 - 0x30)).unwrap_or(c),
            _ => c,
        })
        .collect()
}

pub fn convert_alphanumeric_to_fullwidth<T: AsRef<str>>(text: T) -> String {
    text.as_ref()
        .chars()
        .map(|c| {
            let code_point = match c as u32 {
                cp @ 0x30..=0x39 => cp + (0xff10 - 0x30), // ['0', '9']
                cp @ 0x41..=0x5a => cp + (0xff21 - 0x41), // ['A', 'Z']
                cp @ 0x61..=0x7a => cp + (0xff41 - 0x61), // ['a', 'z']
                cp => cp,
            };
            char::from_u32(code_point).unwrap_or(c)
        })
        .collect()
}

pub fn convert_fullwidth_alphanumeric_to_normal<T: AsRef<str>>(text: T) -> String {
    text.as_ref()
        .chars()
        .map(|c| {
            let code_point = match c as u32 {
                cp @ 0xff10..=0xff19 => cp - (0xff10 - 0x30), // ['０', '９']
                cp @ 0xff21..=0xff3a => cp - (0xff21 - 0x41), // ['Ａ', 'Ｚ']
                cp @ 0xff41..=0xff5a => cp - (0xff41 - 0x61), // ['ａ', 'ｚ']
                cp => cp,
            };
            char::from_u32(code_point).unwrap_or(c)
        })
        .collect()
}

/// Converts half-width katakana to full width, folding a following combining
/// dakuten/handakuten mark into the voiced form when one exists. Each fold
/// records a 2→1 collapse on the optional `source_map`.
pub fn convert_halfwidth_kana_to_fullwidth(
    text: &str,
    mut source_map: Option<&mut TextSourceMap>,
) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::new();
    let mut result_len = 0;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let Some(mapping) = HALFWIDTH_KATAKANA_MAP.get(&c) else {
            result.push(c);
            result_len += 1;
            i += 1;
            continue;
        };

        let mut index = 0;
        match chars.get(i + 1).map(|&c2| c2 as u32) {
            Some(0xff9e) => index = 1, // Dakuten
            Some(0xff9f) => index = 2, // Handakuten
            _ => {}
        }

        let mut converted = mapping.chars().nth(index);
        if index > 0 {
            match converted {
                Some('-') | None => {
                    // No voiced variant; leave the combining mark alone
                    converted = mapping.chars().next();
                }
                Some(_) => {
                    if let Some(map) = source_map.as_deref_mut() {
                        map.combine(result_len, 1);
                    }
                    i += 1;
                }
            }
        }

        if let Some(converted) = converted {
            result.push(converted);
            result_len += 1;
        }
        i += 1;
    }

    result
}

pub fn get_kana_diacritic_info(character: char) -> Option<DiacriticInfo> {
    DIACRITIC_MAPPING.get(&character).cloned()
}

pub fn dakuten_allowed(code_point: u32) -> bool {
    // かがきぎくぐけげこごさざしじすずせぜそぞただちぢっつづてでとはばぱひびぴふぶぷへべぺほ
    // カガキギクグケゲコゴサザシジスズセゼソゾタダチヂッツヅテデトハバパヒビピフブプヘベペホ
    (0x304b..=0x3068).contains(&code_point)
        || (0x306f..=0x307b).contains(&code_point)
        || (0x30ab..=0x30c8).contains(&code_point)
        || (0x30cf..=0x30db).contains(&code_point)
}

pub fn handakuten_allowed(code_point: u32) -> bool {
    // はばぱひびぴふぶぷへべぺほ
    // ハバパヒビピフブプヘベペホ
    (0x306f..=0x307b).contains(&code_point) || (0x30cf..=0x30db).contains(&code_point)
}

/// Composes combining dakuten (U+3099) and handakuten (U+309A) marks into
/// the precomposed kana one code point above their base.
pub fn normalize_combining_characters(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::new();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let combined = match chars.get(i + 1) {
            Some('\u{3099}') if dakuten_allowed(c as u32) => char::from_u32(c as u32 + 1),
            Some('\u{309a}') if handakuten_allowed(c as u32) => char::from_u32(c as u32 + 2),
            _ => None,
        };
        match combined {
            Some(c2) => {
                result.push(c2);
                i += 2;
            }
            None => {
                result.push(c);
                i += 1;
            }
        }
    }

    result
}

pub fn is_emphatic_code_point(code_point: u32) -> bool {
    code_point == HIRAGANA_SMALL_TSU_CODE_POINT
        || code_point == KATAKANA_SMALL_TSU_CODE_POINT
        || code_point == KANA_PROLONGED_SOUND_MARK_CODE_POINT
}

/// Collapses interior runs of emphatic characters (っ, ッ, ー): repeated
/// characters collapse to one, or disappear entirely with `full_collapse`.
/// Leading and trailing emphatics are left alone. Removals are recorded on
/// the optional `source_map`.
pub fn collapse_emphatic_sequences(
    text: &str,
    full_collapse: bool,
    mut source_map: Option<&mut TextSourceMap>,
) -> String {
    let chars: Vec<char> = text.chars().collect();

    let mut left = 0;
    while left < chars.len() && is_emphatic_code_point(chars[left] as u32) {
        left += 1;
    }
    // Whole string is emphatic
    if left == chars.len() {
        return text.to_string();
    }
    let mut right = chars.len() - 1;
    while is_emphatic_code_point(chars[right] as u32) {
        right -= 1;
    }

    let leading: String = chars[..left].iter().collect();
    let trailing: String = chars[right + 1..].iter().collect();
    let mut middle = String::new();
    let mut middle_len = 0;
    let mut current_collapsed: Option<char> = None;

    for &c in &chars[left..=right] {
        if is_emphatic_code_point(c as u32) {
            if current_collapsed != Some(c) {
                current_collapsed = Some(c);
                if !full_collapse {
                    middle.push(c);
                    middle_len += 1;
                    continue;
                }
            }
        } else {
            current_collapsed = None;
            middle.push(c);
            middle_len += 1;
            continue;
        }
        if let Some(map) = source_map.as_deref_mut() {
            map.combine((left + middle_len).saturating_sub(1), 1);
        }
    }

    format!("{leading}{middle}{trailing}")
}

pub fn is_mora_pitch_high(mora_index: usize, pitch_accent_downstep_position: usize) -> bool {
    match pitch_accent_downstep_position {
        0 => mora_index > 0,
        1 => mora_index < 1,
        _ => mora_index > 0 && mora_index < pitch_accent_downstep_position,
    }
}

pub fn get_pitch_category<T: AsRef<str>>(
    text: T,
    pitch_accent_downstep_position: usize,
    is_verb_or_adjective: bool,
) -> Option<PitchCategory> {
    if pitch_accent_downstep_position == 0 {
        return Some(PitchCategory::Heiban);
    }
    if is_verb_or_adjective {
        return Some(PitchCategory::Kifuku);
    }
    if pitch_accent_downstep_position == 1 {
        return Some(PitchCategory::Atamadaka);
    }
    if pitch_accent_downstep_position > 1 {
        if pitch_accent_downstep_position >= get_kana_mora_count(text) {
            return Some(PitchCategory::Odaka);
        }
        return Some(PitchCategory::Nakadaka);
    }
    None
}

pub fn get_kana_morae<T: AsRef<str>>(text: T) -> Vec<String> {
    let mut morae: Vec<String> = Vec::new();
    for char in text.as_ref().chars() {
        if SMALL_KANA_SET.contains(&char) && !morae.is_empty() {
            if let Some(last) = morae.last_mut() {
                last.push(char);
            }
        } else {
            morae.push(char.to_string());
        }
    }
    morae
}

pub fn get_kana_mora_count<T: AsRef<str>>(text: T) -> usize {
    let mut mora_count = 0;
    for c in text.as_ref().chars() {
        if !SMALL_KANA_SET.contains(&c) || mora_count == 0 {
            mora_count += 1;
        }
    }
    mora_count
}

/// Byte offset of the `count`th character of `text`, clamped to the end.
fn char_offset(text: &str, count: usize) -> usize {
    text.char_indices()
        .nth(count)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Character count of the longest common prefix of two strings.
pub fn get_stem_length<T: AsRef<str>>(text1: T, text2: T) -> usize {
    text1
        .as_ref()
        .chars()
        .zip(text2.as_ref().chars())
        .take_while(|(a, b)| a == b)
        .count()
}

fn segmentize_furigana(
    reading: &str,
    reading_normalized: &str,
    groups: &[FuriganaGroup],
    groups_start: usize,
) -> Option<Vec<FuriganaSegment>> {
    let group_count = groups.len().saturating_sub(groups_start);
    if group_count == 0 {
        return reading.is_empty().then(Vec::new);
    }

    let group = &groups[groups_start];
    let group_char_count = group.text.chars().count();

    if group.is_kana {
        let text_normalized = group.text_normalized.as_deref()?;
        if !reading_normalized.starts_with(text_normalized) {
            return None;
        }
        let split = char_offset(reading, group_char_count);
        let split_normalized = char_offset(reading_normalized, group_char_count);
        let mut segments = segmentize_furigana(
            &reading[split..],
            &reading_normalized[split_normalized..],
            groups,
            groups_start + 1,
        )?;
        if reading.starts_with(&group.text) {
            segments.insert(0, FuriganaSegment::new(group.text.clone(), None));
        } else {
            // The reading is written in a different kana script or with
            // different diacritics; annotate only the differing stretches.
            segments.splice(
                0..0,
                get_furigana_kana_segments(&group.text, &reading[..split]),
            );
        }
        return Some(segments);
    }

    let reading_char_count = reading.chars().count();
    let mut result: Option<Vec<FuriganaSegment>> = None;
    for i in (group_char_count..=reading_char_count).rev() {
        let split = char_offset(reading, i);
        let split_normalized = char_offset(reading_normalized, i);
        if let Some(mut segments) = segmentize_furigana(
            &reading[split..],
            &reading_normalized[split_normalized..],
            groups,
            groups_start + 1,
        ) {
            if result.is_some() {
                // More than one way to segmentize the tail; mark as ambiguous
                return None;
            }
            segments.insert(
                0,
                FuriganaSegment::new(group.text.clone(), Some(reading[..split].to_string())),
            );
            result = Some(segments);

            // There is only one way to segmentize the last non-kana group
            if group_count == 1 {
                break;
            }
        }
    }
    result
}

/// Splits matched kana spans character by character, grouping consecutive
/// positions with the same matches/differs state.
fn get_furigana_kana_segments(text: &str, reading: &str) -> Vec<FuriganaSegment> {
    let mut segments: Vec<FuriganaSegment> = Vec::new();
    let mut text_start = 0;
    let mut reading_start = 0;
    let mut state: Option<bool> = None;

    for ((text_index, text_char), (reading_index, reading_char)) in
        text.char_indices().zip(reading.char_indices())
    {
        let new_state = text_char == reading_char;
        match state {
            Some(matches) if matches == new_state => {}
            Some(matches) => {
                segments.push(FuriganaSegment::new(
                    text[text_start..text_index].to_string(),
                    (!matches).then(|| reading[reading_start..reading_index].to_string()),
                ));
                state = Some(new_state);
                text_start = text_index;
                reading_start = reading_index;
            }
            None => state = Some(new_state),
        }
    }
    if let Some(matches) = state {
        segments.push(FuriganaSegment::new(
            text[text_start..].to_string(),
            (!matches).then(|| reading[reading_start..].to_string()),
        ));
    }
    segments
}

/// Segments `term` into spans annotated with the parts of `reading` they
/// correspond to, suitable for ruby markup.
///
/// Non-kana runs are aligned against the reading by recursive search; when
/// more than one alignment is possible the whole result is considered
/// ambiguous and the entire term is annotated with the entire reading
/// instead, preferring no furigana placement over a wrong one.
pub fn distribute_furigana(term: String, reading: String) -> Vec<FuriganaSegment> {
    if reading == term {
        // Same
        return vec![FuriganaSegment::new(term, None)];
    }

    let mut groups: Vec<FuriganaGroup> = Vec::new();
    for c in term.chars() {
        let is_kana = is_code_point_kana(c as u32);
        match groups.last_mut() {
            Some(group) if group.is_kana == is_kana => group.text.push(c),
            _ => groups.push(FuriganaGroup {
                is_kana,
                text: c.to_string(),
                text_normalized: None,
            }),
        }
    }
    for group in &mut groups {
        if group.is_kana {
            group.text_normalized = Some(convert_katakana_to_hiragana(&group.text, false));
        }
    }

    let reading_normalized = convert_katakana_to_hiragana(&reading, false);
    if let Some(segments) = segmentize_furigana(&reading, &reading_normalized, &groups, 0) {
        return segments;
    }

    trace!("ambiguous furigana segmentation for {term}/{reading}, using fallback");
    vec![FuriganaSegment::new(term, Some(reading))]
}

/// [`distribute_furigana`] for an inflected surface form.
///
/// `source` is the conjugated form whose stem matches either `term` or
/// `reading`; the dictionary tail past the stem is distributed normally and
/// the conjugated remainder of `source` is appended without annotation.
pub fn distribute_furigana_inflected(
    term: String,
    mut reading: String,
    source: String,
) -> Vec<FuriganaSegment> {
    let term_normalized = convert_katakana_to_hiragana(&term, false);
    let reading_normalized = convert_katakana_to_hiragana(&reading, false);
    let source_normalized = convert_katakana_to_hiragana(&source, false);

    let mut main_text = term;
    let mut stem_length = get_stem_length(&term_normalized, &source_normalized);

    // Check if source is derived from the reading instead of the term
    let reading_stem_length = get_stem_length(&reading_normalized, &source_normalized);
    if reading_stem_length > 0 && reading_stem_length >= stem_length {
        main_text = reading.clone();
        stem_length = reading_stem_length;
        reading = format!(
            "{}{}",
            &source[..char_offset(&source, stem_length)],
            &reading[char_offset(&reading, stem_length)..]
        );
    }

    let mut segments: Vec<FuriganaSegment> = Vec::new();
    if stem_length > 0 {
        main_text = format!(
            "{}{}",
            &source[..char_offset(&source, stem_length)],
            &main_text[char_offset(&main_text, stem_length)..]
        );
        let mut consumed = 0;
        for segment in distribute_furigana(main_text.clone(), reading) {
            let start = consumed;
            consumed += segment.text.chars().count();
            if consumed < stem_length {
                segments.push(segment);
            } else if consumed == stem_length {
                segments.push(segment);
                break;
            } else {
                if start < stem_length {
                    let text = main_text
                        [char_offset(&main_text, start)..char_offset(&main_text, stem_length)]
                        .to_string();
                    segments.push(FuriganaSegment::new(text, None));
                }
                break;
            }
        }
    }

    if stem_length < source.chars().count() {
        let remainder = &source[char_offset(&source, stem_length)..];
        match segments.last_mut() {
            // Append to the last segment if it has no reading
            Some(last) if last.reading.is_none() => last.text.push_str(remainder),
            _ => segments.push(FuriganaSegment::new(remainder.to_string(), None)),
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn annotated(text: &str, reading: &str) -> FuriganaSegment {
        FuriganaSegment::new(text.to_string(), Some(reading.to_string()))
    }

    fn unannotated(text: &str) -> FuriganaSegment {
        FuriganaSegment::new(text.to_string(), None)
    }

    #[test]
    fn code_point_classification() {
        assert!(is_code_point_kana('あ' as u32));
        assert!(is_code_point_kana('ン' as u32));
        assert!(!is_code_point_kana('食' as u32));
        assert!(is_code_point_japanese('食' as u32));
        assert!(is_code_point_japanese('。' as u32));
        assert!(is_code_point_japanese('ﾊ' as u32));
        assert!(!is_code_point_japanese('a' as u32));
    }

    #[test]
    fn string_classification() {
        assert!(is_string_entirely_kana("よみちゃんデス"));
        assert!(!is_string_entirely_kana("食べる"));
        assert!(!is_string_entirely_kana(""));
        assert!(is_string_partially_japanese("reading 食べる now"));
        assert!(!is_string_partially_japanese("plain ascii"));
        assert!(is_lookup_worthy("ことば"));
        assert!(!is_lookup_worthy(""));
    }

    #[test]
    fn katakana_to_hiragana() {
        assert_eq!(convert_katakana_to_hiragana("ヨミチャン", false), "よみちゃん");
        // Small ka/ke have no hiragana counterpart
        assert_eq!(convert_katakana_to_hiragana("ヵヶ", false), "ヵヶ");
    }

    #[test]
    fn prolonged_sound_marks() {
        assert_eq!(convert_katakana_to_hiragana("コーヒー", false), "こうひい");
        assert_eq!(convert_katakana_to_hiragana("コーヒー", true), "こーひー");
        // String-initial mark has nothing to continue
        assert_eq!(convert_katakana_to_hiragana("ー", false), "ー");
        // Elongated e continues with え, elongated o with う
        assert_eq!(convert_katakana_to_hiragana("ネー", false), "ねえ");
        assert_eq!(convert_katakana_to_hiragana("ソー", false), "そう");
    }

    #[test]
    fn hiragana_to_katakana() {
        assert_eq!(convert_hiragana_to_katakana("よみちゃん"), "ヨミチャン");
        assert_eq!(
            convert_katakana_to_hiragana(convert_hiragana_to_katakana("たべる"), false),
            "たべる"
        );
    }

    #[test]
    fn width_conversions() {
        assert_eq!(convert_numeric_to_fullwidth("2024年"), "２０２４年");
        assert_eq!(convert_alphanumeric_to_fullwidth("abc012"), "ａｂｃ０１２");
        assert_eq!(
            convert_fullwidth_alphanumeric_to_normal("ＡＢＣ０１２"),
            "ABC012"
        );
    }

    #[test]
    fn halfwidth_katakana_plain() {
        assert_eq!(
            convert_halfwidth_kana_to_fullwidth("ﾖﾐﾁｬﾝ", None),
            "ヨミチャン"
        );
    }

    #[test]
    fn halfwidth_katakana_diacritics() {
        assert_eq!(convert_halfwidth_kana_to_fullwidth("ｶﾞｷﾞ", None), "ガギ");
        assert_eq!(convert_halfwidth_kana_to_fullwidth("ﾊﾟ", None), "パ");
        // ｱ has no voiced variant; the mark stays
        assert_eq!(convert_halfwidth_kana_to_fullwidth("ｱﾞ", None), "アﾞ");
    }

    #[test]
    fn halfwidth_katakana_source_map() {
        let mut map = TextSourceMap::new("ﾊﾟｲﾝ");
        let result = convert_halfwidth_kana_to_fullwidth("ﾊﾟｲﾝ", Some(&mut map));
        assert_eq!(result, "パイン");
        assert_eq!(map.mapping(), &[2, 1, 1]);
        assert_eq!(map.source_length(1), 2);
    }

    #[test]
    fn diacritic_info() {
        assert_eq!(
            get_kana_diacritic_info('が'),
            Some(DiacriticInfo {
                character: 'か',
                diacritic_type: DiacriticType::Dakuten,
            })
        );
        assert_eq!(
            get_kana_diacritic_info('ぱ'),
            Some(DiacriticInfo {
                character: 'は',
                diacritic_type: DiacriticType::Handakuten,
            })
        );
        assert_eq!(get_kana_diacritic_info('あ'), None);
    }

    #[test]
    fn combining_character_normalization() {
        assert_eq!(normalize_combining_characters("ト\u{3099}"), "ド");
        assert_eq!(normalize_combining_characters("ハ\u{309a}"), "パ");
        // A mark with no valid base passes through
        assert_eq!(normalize_combining_characters("ア\u{3099}"), "ア\u{3099}");
    }

    #[test]
    fn emphatic_sequences() {
        assert_eq!(
            collapse_emphatic_sequences("すっっごーーい", false, None),
            "すっごーい"
        );
        assert_eq!(
            collapse_emphatic_sequences("すっっごーーい", true, None),
            "すごい"
        );
        // Leading and trailing emphatics are preserved
        assert_eq!(collapse_emphatic_sequences("っすごい", true, None), "っすごい");
        assert_eq!(collapse_emphatic_sequences("っっっ", true, None), "っっっ");
    }

    #[test]
    fn emphatic_sequences_source_map() {
        let mut map = TextSourceMap::new("すっっごーーい");
        let result = collapse_emphatic_sequences("すっっごーーい", true, Some(&mut map));
        assert_eq!(result, "すごい");
        assert_eq!(map.mapping(), &[3, 3, 1]);
        assert_eq!(map.source_length(3), 7);
    }

    #[test]
    fn morae() {
        assert_eq!(get_kana_morae("よみちゃん"), vec!["よ", "み", "ちゃ", "ん"]);
        // The sokuon is a mora of its own
        assert_eq!(get_kana_morae("ちょっと"), vec!["ちょ", "っ", "と"]);
        assert_eq!(get_kana_morae(""), Vec::<String>::new());
        // A string-initial small kana starts its own mora
        assert_eq!(get_kana_morae("ゃあ"), vec!["ゃ", "あ"]);
    }

    #[test]
    fn mora_count_matches_morae() {
        for text in ["", "よみちゃん", "ちょっと", "ゃあ", "トーキョー"] {
            assert_eq!(get_kana_mora_count(text), get_kana_morae(text).len());
        }
    }

    #[test]
    fn mora_pitch() {
        assert!(is_mora_pitch_high(0, 1));
        assert!(!is_mora_pitch_high(1, 1));
        assert!(!is_mora_pitch_high(0, 0));
        assert!(is_mora_pitch_high(1, 0));
        assert!(is_mora_pitch_high(1, 3));
        assert!(is_mora_pitch_high(2, 3));
        assert!(!is_mora_pitch_high(3, 3));
    }

    #[test]
    fn pitch_categories() {
        assert_eq!(
            get_pitch_category("はし", 0, false),
            Some(PitchCategory::Heiban)
        );
        assert_eq!(
            get_pitch_category("たべる", 2, true),
            Some(PitchCategory::Kifuku)
        );
        assert_eq!(
            get_pitch_category("はし", 1, false),
            Some(PitchCategory::Atamadaka)
        );
        assert_eq!(
            get_pitch_category("はな", 2, false),
            Some(PitchCategory::Odaka)
        );
        assert_eq!(
            get_pitch_category("こころ", 2, false),
            Some(PitchCategory::Nakadaka)
        );
    }

    #[test]
    fn distribute_same_term() {
        assert_eq!(
            distribute_furigana("たべる".into(), "たべる".into()),
            vec![unannotated("たべる")]
        );
    }

    #[test]
    fn distribute_kanji_and_kana() {
        assert_eq!(
            distribute_furigana("食べる".into(), "たべる".into()),
            vec![annotated("食", "た"), unannotated("べる")]
        );
        assert_eq!(
            distribute_furigana("お茶".into(), "おちゃ".into()),
            vec![unannotated("お"), annotated("茶", "ちゃ")]
        );
    }

    #[test]
    fn distribute_last_group_consumes_remainder() {
        assert_eq!(
            distribute_furigana("火傷".into(), "やけど".into()),
            vec![annotated("火傷", "やけど")]
        );
    }

    #[test]
    fn distribute_ambiguous_falls_back() {
        // Both 1+1+3 and 2+1+2 splits segmentize; position cannot be
        // determined uniquely.
        assert_eq!(
            distribute_furigana("実み耳".into(), "みみみみみ".into()),
            vec![annotated("実み耳", "みみみみみ")]
        );
    }

    #[test]
    fn distribute_katakana_term_hiragana_reading() {
        assert_eq!(
            distribute_furigana("ウたう".into(), "うたう".into()),
            vec![annotated("ウ", "う"), unannotated("たう")]
        );
    }

    #[test]
    fn distribute_inflected_from_term() {
        assert_eq!(
            distribute_furigana_inflected("食べる".into(), "たべる".into(), "食べた".into()),
            vec![annotated("食", "た"), unannotated("べた")]
        );
    }

    #[test]
    fn distribute_inflected_from_reading() {
        assert_eq!(
            distribute_furigana_inflected(
                "可愛い".into(),
                "かわいい".into(),
                "かわいかった".into()
            ),
            vec![unannotated("かわいかった")]
        );
    }

    #[test]
    fn distribute_inflected_no_stem() {
        assert_eq!(
            distribute_furigana_inflected("来る".into(), "くる".into(), "きた".into()),
            vec![unannotated("きた")]
        );
    }

    #[test]
    fn stem_length() {
        assert_eq!(get_stem_length("たべた", "たべる"), 2);
        assert_eq!(get_stem_length("たべる", "のむ"), 0);
        assert_eq!(get_stem_length("", "たべる"), 0);
    }

    #[test]
    fn furigana_segment_serialization() {
        let segment = annotated("食", "た");
        let json = serde_json::to_string(&segment).unwrap();
        assert_eq!(json, r#"{"text":"食","reading":"た"}"#);
        assert_eq!(
            serde_json::to_string(&PitchCategory::Heiban).unwrap(),
            r#""heiban""#
        );
    }
}

//! Unicode code point range tables shared by the character classifiers.

/// 1 - minInclusive
/// 2 - maxInclusive
pub type CodepointRange = (u32, u32);

const CJK_UNIFIED_IDEOGRAPHS_RANGE: CodepointRange = (0x4e00, 0x9fff);
const CJK_UNIFIED_IDEOGRAPHS_EXTENSION_A_RANGE: CodepointRange = (0x3400, 0x4dbf);
const CJK_UNIFIED_IDEOGRAPHS_EXTENSION_B_RANGE: CodepointRange = (0x20000, 0x2a6df);
const CJK_UNIFIED_IDEOGRAPHS_EXTENSION_C_RANGE: CodepointRange = (0x2a700, 0x2b73f);
const CJK_UNIFIED_IDEOGRAPHS_EXTENSION_D_RANGE: CodepointRange = (0x2b740, 0x2b81f);
const CJK_UNIFIED_IDEOGRAPHS_EXTENSION_E_RANGE: CodepointRange = (0x2b820, 0x2ceaf);
const CJK_UNIFIED_IDEOGRAPHS_EXTENSION_F_RANGE: CodepointRange = (0x2ceb0, 0x2ebef);
const CJK_UNIFIED_IDEOGRAPHS_EXTENSION_G_RANGE: CodepointRange = (0x30000, 0x3134f);
const CJK_UNIFIED_IDEOGRAPHS_EXTENSION_H_RANGE: CodepointRange = (0x31350, 0x323af);
const CJK_UNIFIED_IDEOGRAPHS_EXTENSION_I_RANGE: CodepointRange = (0x2ebf0, 0x2ee5f);
const CJK_COMPATIBILITY_IDEOGRAPHS_RANGE: CodepointRange = (0xf900, 0xfaff);
const CJK_COMPATIBILITY_IDEOGRAPHS_SUPPLEMENT_RANGE: CodepointRange = (0x2f800, 0x2fa1f);

pub const CJK_IDEOGRAPH_RANGES: [CodepointRange; 12] = [
    CJK_UNIFIED_IDEOGRAPHS_RANGE,
    CJK_UNIFIED_IDEOGRAPHS_EXTENSION_A_RANGE,
    CJK_UNIFIED_IDEOGRAPHS_EXTENSION_B_RANGE,
    CJK_UNIFIED_IDEOGRAPHS_EXTENSION_C_RANGE,
    CJK_UNIFIED_IDEOGRAPHS_EXTENSION_D_RANGE,
    CJK_UNIFIED_IDEOGRAPHS_EXTENSION_E_RANGE,
    CJK_UNIFIED_IDEOGRAPHS_EXTENSION_F_RANGE,
    CJK_UNIFIED_IDEOGRAPHS_EXTENSION_G_RANGE,
    CJK_UNIFIED_IDEOGRAPHS_EXTENSION_H_RANGE,
    CJK_UNIFIED_IDEOGRAPHS_EXTENSION_I_RANGE,
    CJK_COMPATIBILITY_IDEOGRAPHS_RANGE,
    CJK_COMPATIBILITY_IDEOGRAPHS_SUPPLEMENT_RANGE,
];

pub fn is_code_point_in_range(code_point: u32, range: CodepointRange) -> bool {
    code_point >= range.0 && code_point <= range.1
}

pub fn is_code_point_in_ranges(code_point: u32, ranges: &[CodepointRange]) -> bool {
    ranges
        .iter()
        .any(|&(min, max)| code_point >= min && code_point <= max)
}

/// Whether the code point is a CJK ideograph, including the extension
/// and compatibility blocks.
pub fn is_code_point_kanji(code_point: u32) -> bool {
    is_code_point_in_ranges(code_point, &CJK_IDEOGRAPH_RANGES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unified_ideographs_are_kanji() {
        for code_point in [0x4e00, 0x98df, 0x9fff] {
            assert!(is_code_point_kanji(code_point));
        }
    }

    #[test]
    fn hiragana_is_not_kanji() {
        for code_point in 0x3040..=0x309f {
            assert!(!is_code_point_kanji(code_point));
        }
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(is_code_point_in_range(0x4e00, CJK_UNIFIED_IDEOGRAPHS_RANGE));
        assert!(is_code_point_in_range(0x9fff, CJK_UNIFIED_IDEOGRAPHS_RANGE));
        assert!(!is_code_point_in_range(0x4dff, CJK_UNIFIED_IDEOGRAPHS_RANGE));
        assert!(!is_code_point_in_range(0xa000, CJK_UNIFIED_IDEOGRAPHS_RANGE));
    }
}

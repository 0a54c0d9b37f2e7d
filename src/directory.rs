// Directory Index - kana-row bucketing of staff readings

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::catalog::{Catalog, Staff};

/// One of the eleven picker tabs: the ten kana rows plus a catch-all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    A,
    Ka,
    Sa,
    Ta,
    Na,
    Ha,
    Ma,
    Ya,
    Ra,
    Wa,
    Other,
}

impl Bucket {
    /// Picker order
    pub const ALL: [Bucket; 11] = [
        Bucket::A,
        Bucket::Ka,
        Bucket::Sa,
        Bucket::Ta,
        Bucket::Na,
        Bucket::Ha,
        Bucket::Ma,
        Bucket::Ya,
        Bucket::Ra,
        Bucket::Wa,
        Bucket::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::A => "あ",
            Bucket::Ka => "か",
            Bucket::Sa => "さ",
            Bucket::Ta => "た",
            Bucket::Na => "な",
            Bucket::Ha => "は",
            Bucket::Ma => "ま",
            Bucket::Ya => "や",
            Bucket::Ra => "ら",
            Bucket::Wa => "わ",
            Bucket::Other => "他",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.label() == label)
    }

    /// Hiragana that open a reading in this bucket
    fn members(&self) -> &'static str {
        match self {
            Bucket::A => "あいうえお",
            Bucket::Ka => "かきくけこがぎぐげご",
            Bucket::Sa => "さしすせそざじずぜぞ",
            Bucket::Ta => "たちつてとだぢづでど",
            Bucket::Na => "なにぬねの",
            Bucket::Ha => "はひふへほばびぶべぼぱぴぷぺぽ",
            Bucket::Ma => "まみむめも",
            Bucket::Ya => "やゆよ",
            Bucket::Ra => "らりるれろ",
            Bucket::Wa => "わをん",
            Bucket::Other => "",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

const KATAKANA_FIRST: u32 = 0x30A1;
const KATAKANA_LAST: u32 = 0x30F6;
const KANA_OFFSET: u32 = 0x60;

/// Katakana → hiragana for a single character; anything else passes through
pub fn to_hiragana(ch: char) -> char {
    let code = ch as u32;
    if (KATAKANA_FIRST..=KATAKANA_LAST).contains(&code) {
        char::from_u32(code - KANA_OFFSET).unwrap_or(ch)
    } else {
        ch
    }
}

/// Bucket of a reading, decided by its first non-blank character.
/// Total: empty input and unknown characters land in [`Bucket::Other`].
pub fn group_key_for(reading: &str) -> Bucket {
    let Some(first) = reading.trim().chars().next() else {
        return Bucket::Other;
    };

    let hiragana = to_hiragana(first);
    Bucket::ALL
        .into_iter()
        .find(|bucket| bucket.members().contains(hiragana))
        .unwrap_or(Bucket::Other)
}

fn fold_small_kana(ch: char) -> char {
    match ch {
        'ぁ' => 'あ',
        'ぃ' => 'い',
        'ぅ' => 'う',
        'ぇ' => 'え',
        'ぉ' => 'お',
        'っ' => 'つ',
        'ゃ' => 'や',
        'ゅ' => 'ゆ',
        'ょ' => 'よ',
        'ゎ' => 'わ',
        'ゕ' => 'か',
        'ゖ' => 'け',
        other => other,
    }
}

const COMBINING_VOICED: char = '\u{3099}';
const COMBINING_SEMI_VOICED: char = '\u{309A}';
const LONG_VOWEL_MARK: char = 'ー';
const ITERATION_MARK: char = 'ゝ';
const KATAKANA_ITERATION_MARK: char = 'ヽ';

/// Vowel a long-vowel mark stands for after `kana`
fn vowel_of(kana: char) -> Option<char> {
    const ROWS: [(&str, char); 5] = [
        ("あかさたなはまやらわ", 'あ'),
        ("いきしちにひみりゐ", 'い'),
        ("うくすつぬふむゆるゔ", 'う'),
        ("えけせてねへめれゑ", 'え'),
        ("おこそとのほもよろを", 'お'),
    ];
    ROWS.iter()
        .find(|(members, _)| members.contains(kana))
        .map(|(_, vowel)| *vowel)
}

/// Replace ー with the vowel of the kana before it and iteration marks
/// with the kana they repeat. Marks with nothing to refer to stay as-is.
fn expand_marks(chars: impl Iterator<Item = char>) -> Vec<char> {
    let mut expanded: Vec<char> = Vec::new();
    for c in chars {
        let resolved = match (c, expanded.last().copied()) {
            (LONG_VOWEL_MARK, Some(previous)) => vowel_of(previous).unwrap_or(c),
            (ITERATION_MARK | KATAKANA_ITERATION_MARK, Some(previous)) => previous,
            _ => c,
        };
        expanded.push(resolved);
    }
    expanded
}

/// Japanese-style comparison of readings.
///
/// Primary level ignores script (hiragana = katakana), voicing marks and
/// small-kana size, reads ー as the preceding vowel and ゝ/ヽ as the
/// preceding kana. Ties are broken by voicing, then size, then raw code
/// points, so the order is total and stable.
pub fn collate_readings(a: &str, b: &str) -> Ordering {
    fn levels(reading: &str) -> (Vec<char>, Vec<char>, Vec<char>) {
        let decomposed: Vec<char> = reading.nfd().map(to_hiragana).collect();
        let primary = expand_marks(
            decomposed
                .iter()
                .copied()
                .filter(|c| *c != COMBINING_VOICED && *c != COMBINING_SEMI_VOICED)
                .map(fold_small_kana),
        );
        let secondary = decomposed.iter().copied().map(fold_small_kana).collect();
        (primary, secondary, decomposed)
    }

    let (a_primary, a_secondary, a_tertiary) = levels(a);
    let (b_primary, b_secondary, b_tertiary) = levels(b);

    a_primary
        .cmp(&b_primary)
        .then_with(|| a_secondary.cmp(&b_secondary))
        .then_with(|| a_tertiary.cmp(&b_tertiary))
        .then_with(|| a.cmp(b))
}

fn sort_by_reading(staff: &mut [&Staff]) {
    staff.sort_by(|a, b| collate_readings(&a.reading, &b.reading));
}

/// Staff of one organization whose reading falls in `bucket`, sorted by
/// reading. An empty result is a normal "no matching staff" state.
pub fn list_by_organization_and_bucket<'a>(
    catalog: &'a Catalog,
    organization_id: &str,
    bucket: Bucket,
) -> Vec<&'a Staff> {
    let mut members: Vec<&Staff> = catalog
        .staff
        .iter()
        .filter(|s| s.organization_id == organization_id)
        .filter(|s| group_key_for(&s.reading) == bucket)
        .collect();
    sort_by_reading(&mut members);
    members
}

/// Admin staff list: everyone, or one organization's members, by reading
pub fn list_staff<'a>(catalog: &'a Catalog, organization_id: Option<&str>) -> Vec<&'a Staff> {
    let mut members: Vec<&Staff> = catalog
        .staff
        .iter()
        .filter(|s| organization_id.map_or(true, |id| s.organization_id == id))
        .collect();
    sort_by_reading(&mut members);
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    #[test]
    fn test_group_key_for_rows_and_voiced_members() {
        assert_eq!(group_key_for("さとういちろう"), Bucket::Sa);
        assert_eq!(group_key_for("じろう"), Bucket::Sa);
        assert_eq!(group_key_for("ぱんだ"), Bucket::Ha);
        assert_eq!(group_key_for("をかだ"), Bucket::Wa);
        assert_eq!(group_key_for("  やまだ"), Bucket::Ya);
    }

    #[test]
    fn test_group_key_for_folds_katakana() {
        assert_eq!(group_key_for("タカハシ"), Bucket::Ta);
        assert_eq!(group_key_for("ガトウ"), Bucket::Ka);
        assert_eq!(group_key_for("ン"), Bucket::Wa);
    }

    #[test]
    fn test_group_key_for_falls_back_to_other() {
        assert_eq!(group_key_for(""), Bucket::Other);
        assert_eq!(group_key_for("   "), Bucket::Other);
        assert_eq!(group_key_for("yamada"), Bucket::Other);
        assert_eq!(group_key_for("山田"), Bucket::Other);
        assert_eq!(group_key_for("ゃ"), Bucket::Other);
        assert_eq!(group_key_for("ー"), Bucket::Other);
    }

    #[test]
    fn test_bucket_labels_round_trip() {
        for bucket in Bucket::ALL {
            assert_eq!(Bucket::from_label(bucket.label()), Some(bucket));
        }
        assert_eq!(Bucket::from_label("ん"), None);
    }

    #[test]
    fn test_collation_ignores_script_and_voicing_at_first_level() {
        assert_eq!(collate_readings("かとう", "カトウ"), Ordering::Less);
        assert_eq!(collate_readings("かとう", "がとう"), Ordering::Less);
        assert_eq!(collate_readings("がとう", "かとうぎ"), Ordering::Less);
        assert_eq!(collate_readings("さとう", "さとう"), Ordering::Equal);
        assert_eq!(collate_readings("いとう", "さとう"), Ordering::Less);
    }

    #[test]
    fn test_collation_reads_long_vowel_and_iteration_marks() {
        // かーど sorts as かあど: before かいと, after かあど itself
        assert_eq!(collate_readings("かーど", "かいと"), Ordering::Less);
        assert_eq!(collate_readings("かあど", "かーど"), Ordering::Less);
        assert_eq!(collate_readings("カード", "かーと"), Ordering::Greater);
        assert_eq!(collate_readings("すゞき", "すずきあ"), Ordering::Less);
        assert_eq!(collate_readings("ささき", "さゝき"), Ordering::Less);
        assert_eq!(collate_readings("さゝき", "さしき"), Ordering::Less);
        // a leading mark has nothing to refer to
        assert_eq!(collate_readings("ーあ", "ーい"), Ordering::Less);
    }

    #[test]
    fn test_list_by_organization_and_bucket_sorts_by_reading() {
        let mut catalog = default_catalog();
        catalog.add_staff("own", "斎藤 五郎", "さいとうごろう").unwrap();
        catalog.add_staff("own", "ザイツ", "ザイツ").unwrap();

        let names: Vec<&str> = list_by_organization_and_bucket(&catalog, "own", Bucket::Sa)
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["ザイツ", "斎藤 五郎", "佐藤 一郎"]);
    }

    #[test]
    fn test_list_by_organization_and_bucket_empty_is_not_an_error() {
        let catalog = default_catalog();
        assert!(list_by_organization_and_bucket(&catalog, "own", Bucket::Ma).is_empty());
        assert!(list_by_organization_and_bucket(&catalog, "missing", Bucket::Sa).is_empty());
    }

    #[test]
    fn test_list_staff_filters_optionally() {
        let catalog = default_catalog();
        assert_eq!(list_staff(&catalog, None).len(), catalog.staff.len());

        let names: Vec<&str> = list_staff(&catalog, Some("a")).iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["伊藤 次郎", "山田 太郎"]);
    }
}

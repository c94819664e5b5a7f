//! Hangul <-> QWERTY keystroke conversion for the standard Korean 2-set layout.
//!
//! Triggers are tracked in the keystroke domain: the buffer holds the QWERTY
//! keys the user physically pressed, while the IME composes Hangul on screen.
//! This module converts between the two domains and measures how many visual
//! units the IME rendered for a given keystroke sequence.

/// First precomposed Hangul syllable (가).
const SYLLABLE_BASE: u32 = 0xAC00;
/// Last precomposed Hangul syllable (힣).
const SYLLABLE_LAST: u32 = 0xD7A3;

const JUNGSEONG_COUNT: u32 = 21;
const JONGSEONG_COUNT: u32 = 28;

/// Keystrokes per choseong index (ㄱ ㄲ ㄴ ㄷ ㄸ ㄹ ㅁ ㅂ ㅃ ㅅ ㅆ ㅇ ㅈ ㅉ ㅊ ㅋ ㅌ ㅍ ㅎ).
const CHOSEONG_KEYS: [&str; 19] = [
    "r", "R", "s", "e", "E", "f", "a", "q", "Q", "t", "T", "d", "w", "W", "c", "z", "x", "v", "g",
];

/// Keystrokes per jungseong index (ㅏ ㅐ ㅑ ㅒ ㅓ ㅔ ㅕ ㅖ ㅗ ㅘ ㅙ ㅚ ㅛ ㅜ ㅝ ㅞ ㅟ ㅠ ㅡ ㅢ ㅣ).
const JUNGSEONG_KEYS: [&str; 21] = [
    "k", "o", "i", "O", "j", "p", "u", "P", "h", "hk", "ho", "hl", "y", "n", "nj", "np", "nl",
    "b", "m", "ml", "l",
];

/// Keystrokes per jongseong index; index 0 means no final consonant.
const JONGSEONG_KEYS: [&str; 28] = [
    "", "r", "R", "rt", "s", "sw", "sg", "e", "f", "fr", "fa", "fq", "ft", "fx", "fv", "fg", "a",
    "q", "qt", "t", "T", "d", "w", "c", "z", "x", "v", "g",
];

/// True for a precomposed Hangul syllable.
pub fn is_syllable(c: char) -> bool {
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&(c as u32))
}

/// True for a compatibility jamo (ㄱ..ㅣ).
pub fn is_jamo(c: char) -> bool {
    ('\u{3131}'..='\u{3163}').contains(&c)
}

/// True for any Hangul character this codec understands.
pub fn is_hangul(c: char) -> bool {
    is_syllable(c) || is_jamo(c)
}

/// Split a precomposed syllable into (choseong, jungseong, jongseong) indices.
pub fn decompose_syllable(c: char) -> Option<(usize, usize, usize)> {
    let code = c as u32;
    if !(SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code) {
        return None;
    }
    let offset = code - SYLLABLE_BASE;
    Some((
        (offset / (JUNGSEONG_COUNT * JONGSEONG_COUNT)) as usize,
        ((offset / JONGSEONG_COUNT) % JUNGSEONG_COUNT) as usize,
        (offset % JONGSEONG_COUNT) as usize,
    ))
}

/// Keystrokes that produce a compatibility jamo on the 2-set layout.
/// Compound vowels and compound finals need more than one key.
fn jamo_to_keys(c: char) -> Option<&'static str> {
    let keys = match c {
        'ㄱ' => "r",
        'ㄲ' => "R",
        'ㄴ' => "s",
        'ㄷ' => "e",
        'ㄸ' => "E",
        'ㄹ' => "f",
        'ㅁ' => "a",
        'ㅂ' => "q",
        'ㅃ' => "Q",
        'ㅅ' => "t",
        'ㅆ' => "T",
        'ㅇ' => "d",
        'ㅈ' => "w",
        'ㅉ' => "W",
        'ㅊ' => "c",
        'ㅋ' => "z",
        'ㅌ' => "x",
        'ㅍ' => "v",
        'ㅎ' => "g",
        'ㅏ' => "k",
        'ㅐ' => "o",
        'ㅑ' => "i",
        'ㅒ' => "O",
        'ㅓ' => "j",
        'ㅔ' => "p",
        'ㅕ' => "u",
        'ㅖ' => "P",
        'ㅗ' => "h",
        'ㅘ' => "hk",
        'ㅙ' => "ho",
        'ㅚ' => "hl",
        'ㅛ' => "y",
        'ㅜ' => "n",
        'ㅝ' => "nj",
        'ㅞ' => "np",
        'ㅟ' => "nl",
        'ㅠ' => "b",
        'ㅡ' => "m",
        'ㅢ' => "ml",
        'ㅣ' => "l",
        'ㄳ' => "rt",
        'ㄵ' => "sw",
        'ㄶ' => "sg",
        'ㄺ' => "fr",
        'ㄻ' => "fa",
        'ㄼ' => "fq",
        'ㄽ' => "ft",
        'ㄾ' => "fx",
        'ㄿ' => "fv",
        'ㅀ' => "fg",
        'ㅄ' => "qt",
        _ => return None,
    };
    Some(keys)
}

/// The jamo a single QWERTY key produces. Covers the 19 consonants and the
/// 14 vowels expressible with one key; compound vowels and compound finals
/// have no single-key form and stay unmapped.
fn key_to_jamo(c: char) -> Option<char> {
    let jamo = match c {
        'r' => 'ㄱ',
        'R' => 'ㄲ',
        's' => 'ㄴ',
        'e' => 'ㄷ',
        'E' => 'ㄸ',
        'f' => 'ㄹ',
        'a' => 'ㅁ',
        'q' => 'ㅂ',
        'Q' => 'ㅃ',
        't' => 'ㅅ',
        'T' => 'ㅆ',
        'd' => 'ㅇ',
        'w' => 'ㅈ',
        'W' => 'ㅉ',
        'c' => 'ㅊ',
        'z' => 'ㅋ',
        'x' => 'ㅌ',
        'v' => 'ㅍ',
        'g' => 'ㅎ',
        'k' => 'ㅏ',
        'o' => 'ㅐ',
        'i' => 'ㅑ',
        'O' => 'ㅒ',
        'j' => 'ㅓ',
        'p' => 'ㅔ',
        'u' => 'ㅕ',
        'P' => 'ㅖ',
        'h' => 'ㅗ',
        'y' => 'ㅛ',
        'n' => 'ㅜ',
        'b' => 'ㅠ',
        'm' => 'ㅡ',
        'l' => 'ㅣ',
        _ => return None,
    };
    Some(jamo)
}

/// Merge two jamo into the compound final the IME composes from them.
pub fn combine_batchim(first: char, second: char) -> Option<char> {
    let merged = match (first, second) {
        ('ㄱ', 'ㅅ') => 'ㄳ',
        ('ㄴ', 'ㅈ') => 'ㄵ',
        ('ㄴ', 'ㅎ') => 'ㄶ',
        ('ㄹ', 'ㄱ') => 'ㄺ',
        ('ㄹ', 'ㅁ') => 'ㄻ',
        ('ㄹ', 'ㅂ') => 'ㄼ',
        ('ㄹ', 'ㅅ') => 'ㄽ',
        ('ㄹ', 'ㅌ') => 'ㄾ',
        ('ㄹ', 'ㅍ') => 'ㄿ',
        ('ㄹ', 'ㅎ') => 'ㅀ',
        ('ㅂ', 'ㅅ') => 'ㅄ',
        _ => return None,
    };
    Some(merged)
}

/// Convert Hangul text to the QWERTY keystrokes that produce it.
/// Precomposed syllables are decomposed arithmetically; characters outside
/// the codec pass through unchanged. Total, never fails.
pub fn to_keystrokes(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars() {
        if let Some((cho, jung, jong)) = decompose_syllable(c) {
            out.push_str(CHOSEONG_KEYS[cho]);
            out.push_str(JUNGSEONG_KEYS[jung]);
            out.push_str(JONGSEONG_KEYS[jong]);
        } else if let Some(keys) = jamo_to_keys(c) {
            out.push_str(keys);
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert QWERTY keystrokes to the literal jamo they produce, key by key.
/// Not a full inverse of [`to_keystrokes`]: multi-key compounds such as
/// "hk" (ㅘ) come back as two separate jamo.
pub fn to_literal(keystrokes: &str) -> String {
    keystrokes
        .chars()
        .map(|c| key_to_jamo(c).unwrap_or(c))
        .collect()
}

/// Number of visual units the IME renders for a keystroke sequence.
/// Adjacent jamo that form a registered compound final merge into one unit.
/// This sizes the backspace burst needed to erase the rendered text.
pub fn visual_length(keystrokes: &str) -> usize {
    let jamo: Vec<char> = to_literal(keystrokes).chars().collect();
    let mut count = 0;
    let mut i = 0;
    while i < jamo.len() {
        if i + 1 < jamo.len() && combine_batchim(jamo[i], jamo[i + 1]).is_some() {
            i += 2;
        } else {
            i += 1;
        }
        count += 1;
    }
    count
}

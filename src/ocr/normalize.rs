//! Cleanup of raw Tesseract output for a single field.
//!
//! Japanese text comes back split into several space-separated tokens, and a
//! token often starts with the semi-voiced twin of the character that ended the
//! previous token ("ば ぱく" for "ばく"). Joining the tokens and dropping that
//! duplicate restores the original word.

/// Returns the dakuten/handakuten counterpart of a kana (ぱ ↔ ば, パ ↔ バ, ...).
fn voicing_pair(c: char) -> Option<char> {
    let pair = match c {
        'ぱ' => 'ば',
        'ぴ' => 'び',
        'ぷ' => 'ぶ',
        'ぺ' => 'べ',
        'ぽ' => 'ぼ',

        'ば' => 'ぱ',
        'び' => 'ぴ',
        'ぶ' => 'ぷ',
        'べ' => 'ぺ',
        'ぼ' => 'ぽ',

        'パ' => 'バ',
        'ピ' => 'ビ',
        'プ' => 'ブ',
        'ペ' => 'ベ',
        'ポ' => 'ボ',

        'バ' => 'パ',
        'ビ' => 'ピ',
        'ブ' => 'プ',
        'ベ' => 'ペ',
        'ボ' => 'ポ',

        _ => return None,
    };
    Some(pair)
}

/// Joins space-split OCR tokens into one string, merging voiced/semi-voiced
/// duplicates at token boundaries.
pub fn normalize(raw: &str) -> String {
    let mut tokens = raw.trim().split(' ');
    let mut result = tokens.next().unwrap_or_default().to_string();

    for token in tokens {
        let mut chars = token.chars();
        let duplicate = match (chars.next().and_then(voicing_pair), result.chars().last()) {
            (Some(pair), Some(last)) => pair == last,
            _ => false,
        };

        if duplicate {
            result.push_str(chars.as_str());
        } else {
            result.push_str(token);
        }
    }

    result
}

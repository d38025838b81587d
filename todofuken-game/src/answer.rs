//! Typed-answer matching.

use crate::catalog::Prefecture;

const NAME_SUFFIXES: [char; 3] = ['県', '府', '都'];
const KANA_SUFFIXES: [&str; 3] = ["けん", "ふ", "と"];

/// Name without its administrative suffix (`東京都` -> `東京`).
#[must_use]
pub fn short_name(name: &str) -> &str {
    name.strip_suffix(&NAME_SUFFIXES[..]).unwrap_or(name)
}

/// Reading without its administrative suffix (`とうきょうと` -> `とうきょう`).
#[must_use]
pub fn short_kana(kana: &str) -> &str {
    KANA_SUFFIXES
        .iter()
        .find_map(|suffix| kana.strip_suffix(*suffix))
        .unwrap_or(kana)
}

/// Every spelling accepted for `prefecture`: kana, name, and both short forms.
#[must_use]
pub fn accepted_answers(prefecture: &Prefecture) -> Vec<String> {
    let mut answers: Vec<String> = Vec::with_capacity(4);
    for spelling in [
        prefecture.kana,
        prefecture.name,
        short_name(prefecture.name),
        short_kana(prefecture.kana),
    ] {
        let spelling = spelling.to_lowercase();
        if !answers.contains(&spelling) {
            answers.push(spelling);
        }
    }
    answers
}

/// Whether `input` names `prefecture`. Surrounding whitespace and letter case
/// are ignored; otherwise the match is exact.
#[must_use]
pub fn is_correct(prefecture: &Prefecture, input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }
    accepted_answers(prefecture).contains(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::prefecture;

    #[test]
    fn short_forms() {
        assert_eq!(short_name("東京都"), "東京");
        assert_eq!(short_name("京都府"), "京都");
        assert_eq!(short_name("神奈川県"), "神奈川");
        assert_eq!(short_name("北海道"), "北海道");
        assert_eq!(short_kana("かながわけん"), "かながわ");
        assert_eq!(short_kana("おおさかふ"), "おおさか");
        assert_eq!(short_kana("とうきょうと"), "とうきょう");
        assert_eq!(short_kana("ほっかいどう"), "ほっかいどう");
    }

    #[test]
    fn accepts_all_four_spellings() {
        let tokyo = prefecture(13).unwrap();
        for input in ["とうきょうと", "東京都", "東京", "とうきょう", "  東京 "] {
            assert!(is_correct(tokyo, input), "{input} rejected");
        }
        assert!(!is_correct(tokyo, "とうき"));
        assert!(!is_correct(tokyo, ""));
        assert!(!is_correct(tokyo, "京都"));
    }

    #[test]
    fn hokkaido_has_no_short_form() {
        let hokkaido = prefecture(1).unwrap();
        assert_eq!(accepted_answers(hokkaido), vec!["ほっかいどう", "北海道"]);
    }
}

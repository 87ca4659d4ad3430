use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

const PARENTHETICAL_RE: &str = r"\s*[(\[][^()\[\]]*[)\]]";

pub static REGEX_COLLECTION: LazyLock<RegexCollection> = LazyLock::new(|| {
    let punctuation_removal = Regex::new(r"[^\w\s]").expect("Invalid regex");
    let parenthetical = Regex::new(PARENTHETICAL_RE).expect("Invalid regex");
    let whitespace = Regex::new(r"\s+").expect("Invalid regex");
    RegexCollection {
        punctuation_removal,
        parenthetical,
        whitespace,
    }
});

pub struct RegexCollection {
    pub punctuation_removal: Regex,
    pub parenthetical: Regex,
    pub whitespace: Regex,
}

/// Lookup key for name searches against the card store.
#[must_use]
pub fn normalise(name: &str) -> String {
    REGEX_COLLECTION
        .punctuation_removal
        .replace_all(&name.replace('-', " ").nfkc().collect::<String>(), "")
        .to_lowercase()
}

/// Grouping key for a card: print-variant suffixes such as `(Full Art)` or
/// `[Alt]` are dropped, whitespace is collapsed and the result is case-folded.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    let mut stripped = name.nfkc().collect::<String>();
    loop {
        let next = REGEX_COLLECTION
            .parenthetical
            .replace_all(&stripped, " ")
            .into_owned();
        if next == stripped {
            break;
        }
        stripped = next;
    }

    REGEX_COLLECTION
        .whitespace
        .replace_all(stripped.trim(), " ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_simple_string() {
        assert_eq!(normalise("Ultra Ball"), "ultra ball");
    }

    #[test]
    fn test_normalise_with_apostrophe() {
        assert_eq!(normalise("Boss's Orders"), "bosss orders");
    }

    #[test]
    fn test_normalise_with_hyphen() {
        assert_eq!(normalise("Chien-Pao ex"), "chien pao ex");
    }

    #[test]
    fn test_normalise_accented_characters() {
        assert_eq!(normalise("Pokémon Catcher"), "pokémon catcher");
    }

    #[test]
    fn test_normalise_empty_string() {
        assert_eq!(normalise(""), "");
    }

    #[test]
    fn test_normalise_idempotent() {
        let first = normalise("Professor's Research (Professor Turo)");
        assert_eq!(first, normalise(&first));
    }

    #[test]
    fn test_canonical_name_strips_variants() {
        assert_eq!(canonical_name("Widget (Variant A)"), "widget");
        assert_eq!(canonical_name("Widget (Variant B)"), "widget");
        assert_eq!(canonical_name("Widget [Alt Art]"), "widget");
    }

    #[test]
    fn test_canonical_name_keeps_punctuation() {
        assert_eq!(
            canonical_name("Boss's Orders (Ghetsis)"),
            "boss's orders"
        );
    }

    #[test]
    fn test_canonical_name_collapses_whitespace() {
        assert_eq!(canonical_name("  Iron   Hands  ex "), "iron hands ex");
    }

    #[test]
    fn test_canonical_name_nested_parentheses() {
        assert_eq!(canonical_name("Widget ((promo))"), "widget");
    }

    #[test]
    fn test_canonical_name_unbalanced_parenthesis() {
        assert_eq!(canonical_name("Widget (Variant"), "widget (variant");
    }

    #[test]
    fn test_canonical_name_idempotent() {
        for name in [
            "Widget (Variant A)",
            "Widget ((promo)) [x]",
            "Jinx - Loose Cannon",
            "  MIXED  Case ",
            "",
            "(only)",
        ] {
            let once = canonical_name(name);
            assert_eq!(canonical_name(&once), once, "not idempotent for {name:?}");
        }
    }
}

use crate::classify::{ScriptClass, classify_char};

/// Overall reading direction of a block of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    /// Lowercase CSS value, usable for both the `direction` style property
    /// and `dir` attributes.
    pub fn as_css(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

impl ScriptClass {
    /// The direction a run of this class reads in, if it has one.
    pub fn direction(self) -> Option<Direction> {
        match self {
            ScriptClass::Rtl => Some(Direction::Rtl),
            ScriptClass::Ltr => Some(Direction::Ltr),
            ScriptClass::Neutral => None,
        }
    }
}

/// Decide the dominant direction of `text` by strong-character majority.
///
/// Neutral characters are not counted. RTL wins only on a strict majority;
/// ties and text with no strong characters at all fall back to LTR, the safe
/// default for ambiguous content.
pub fn dominant_direction(text: &str) -> Direction {
    let mut rtl = 0usize;
    let mut ltr = 0usize;
    for ch in text.chars() {
        match classify_char(ch) {
            ScriptClass::Rtl => rtl += 1,
            ScriptClass::Ltr => ltr += 1,
            ScriptClass::Neutral => {}
        }
    }
    if rtl > ltr { Direction::Rtl } else { Direction::Ltr }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rtl_majority_wins() {
        assert_eq!(dominant_direction("این یک test ساده است"), Direction::Rtl);
        assert_eq!(dominant_direction("سلام"), Direction::Rtl);
    }

    #[test]
    fn ltr_majority_wins() {
        assert_eq!(dominant_direction("This is an مثال paragraph."), Direction::Ltr);
        assert_eq!(dominant_direction("hello"), Direction::Ltr);
    }

    #[test]
    fn exact_tie_falls_back_to_ltr() {
        // One strong character each.
        assert_eq!(dominant_direction("aا"), Direction::Ltr);
        // Neutrals never tip the balance.
        assert_eq!(dominant_direction("a!!!!ا????"), Direction::Ltr);
    }

    #[test]
    fn neutral_only_and_empty_default_to_ltr() {
        assert_eq!(dominant_direction(""), Direction::Ltr);
        assert_eq!(dominant_direction("... --- ..."), Direction::Ltr);
    }

    #[test]
    fn counting_is_per_character_not_per_run() {
        // Two short RTL runs outweigh one longer LTR run by character count.
        assert_eq!(dominant_direction("abc است و"), Direction::Rtl);
    }

    #[test]
    fn css_values_are_lowercase() {
        assert_eq!(Direction::Rtl.as_css(), "rtl");
        assert_eq!(Direction::Ltr.as_css(), "ltr");
    }

    #[test]
    fn script_classes_map_to_directions() {
        assert_eq!(ScriptClass::Rtl.direction(), Some(Direction::Rtl));
        assert_eq!(ScriptClass::Ltr.direction(), Some(Direction::Ltr));
        assert_eq!(ScriptClass::Neutral.direction(), None);
    }
}

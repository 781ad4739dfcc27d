/// Script classification of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptClass {
    /// Arabic-script ranges (Arabic, Arabic Supplement, Arabic Extended-A).
    Rtl,
    /// ASCII letters and digits.
    Ltr,
    /// Everything else: punctuation, whitespace, symbols, other scripts.
    Neutral,
}

/// Classify one character. Pure and context-free: the classification of a
/// character never depends on its neighbors.
pub fn classify_char(ch: char) -> ScriptClass {
    match ch {
        '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}' => {
            ScriptClass::Rtl
        }
        'A'..='Z' | 'a'..='z' | '0'..='9' => ScriptClass::Ltr,
        _ => ScriptClass::Neutral,
    }
}

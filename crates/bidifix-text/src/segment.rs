use crate::classify::{ScriptClass, classify_char};

/// A maximal contiguous run of one script classification.
///
/// `text` borrows directly from the segmented input; concatenating the runs
/// of a text in order reproduces that text byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRun<'a> {
    pub class: ScriptClass,
    pub text: &'a str,
}

/// Partition `text` into maximal same-class runs.
///
/// A single left-to-right pass: each classification change starts a new run.
/// There is no merging pass, so two same-class runs separated by a run of a
/// different class stay separate. Empty input yields no runs.
pub fn segment_runs(text: &str) -> Vec<ScriptRun<'_>> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<ScriptClass> = None;

    for (idx, ch) in text.char_indices() {
        let class = classify_char(ch);
        match current {
            Some(open) if open == class => {}
            Some(open) => {
                runs.push(ScriptRun {
                    class: open,
                    text: &text[start..idx],
                });
                start = idx;
                current = Some(class);
            }
            None => current = Some(class),
        }
    }
    if let Some(open) = current {
        runs.push(ScriptRun {
            class: open,
            text: &text[start..],
        });
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(text: &str) -> Vec<ScriptClass> {
        segment_runs(text).iter().map(|r| r.class).collect()
    }

    #[test]
    fn empty_input_yields_no_runs() {
        assert!(segment_runs("").is_empty());
    }

    #[test]
    fn uniform_input_yields_one_run() {
        let runs = segment_runs("hello");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].class, ScriptClass::Ltr);
        assert_eq!(runs[0].text, "hello");

        let runs = segment_runs("سلام");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].class, ScriptClass::Rtl);
    }

    #[test]
    fn mixed_sentence_segments_at_class_boundaries() {
        let runs = segment_runs("این یک test است");
        let texts: Vec<&str> = runs.iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["این", " ", "یک", " ", "test", " ", "است"]);
        assert_eq!(
            classes("این یک test است"),
            vec![
                ScriptClass::Rtl,
                ScriptClass::Neutral,
                ScriptClass::Rtl,
                ScriptClass::Neutral,
                ScriptClass::Ltr,
                ScriptClass::Neutral,
                ScriptClass::Rtl,
            ]
        );
    }

    #[test]
    fn concatenated_runs_reproduce_the_input() {
        for text in [
            "این یک test ساده است 123",
            "This is an مثال paragraph.",
            "a",
            "   ",
            "۱۲۳abc!ا",
            "code_and_نص mixed",
        ] {
            let joined: String = segment_runs(text).iter().map(|r| r.text).collect();
            assert_eq!(joined, text);
        }
    }

    #[test]
    fn adjacent_runs_never_share_a_class() {
        for text in ["abc ابج abc", "a1b2 ؟؟ x", "..!!aaاا  "] {
            let runs = segment_runs(text);
            for pair in runs.windows(2) {
                assert_ne!(pair[0].class, pair[1].class, "in {text:?}");
            }
        }
    }

    #[test]
    fn digits_extend_latin_runs() {
        // ASCII digits classify LTR, so "test 123" is two LTR runs split
        // only by the neutral space.
        let runs = segment_runs("test 123");
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].class, ScriptClass::Ltr);
        assert_eq!(runs[1].class, ScriptClass::Neutral);
        assert_eq!(runs[2].class, ScriptClass::Ltr);
    }

    #[test]
    fn multibyte_boundaries_are_respected() {
        // Persian digits are in the Arabic block (RTL) while ASCII digits
        // are LTR; the boundary falls between multi-byte characters.
        let runs = segment_runs("۱۲3");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "۱۲");
        assert_eq!(runs[0].class, ScriptClass::Rtl);
        assert_eq!(runs[1].text, "3");
        assert_eq!(runs[1].class, ScriptClass::Ltr);
    }
}

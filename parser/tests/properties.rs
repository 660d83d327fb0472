//! Property tests for segmentation, tokenization and numeric normalization.

use cardprofile_core::ReportKind;
use cardprofile_parser::{convert_text, normalize_numeric, segment, segment_text, tokenize};
use proptest::prelude::*;

fn content_line() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_;:. ]{0,24}"
}

proptest! {
    #[test]
    fn segmented_groups_are_never_empty_or_padded(lines in prop::collection::vec(content_line(), 0..40)) {
        for group in segment(&lines) {
            prop_assert!(!group.is_empty());
            for line in group.iter() {
                prop_assert!(!line.is_empty());
                prop_assert_eq!(line.trim(), line.as_str());
            }
        }
    }

    #[test]
    fn segmentation_keeps_every_non_blank_line(lines in prop::collection::vec(content_line(), 0..40)) {
        let kept: Vec<String> = segment(&lines)
            .into_iter()
            .flat_map(|group| group.into_lines())
            .collect();
        let expected: Vec<String> = lines
            .iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn extra_blank_lines_do_not_change_groups(
        lines in prop::collection::vec(content_line(), 0..30),
        padding in 1usize..4,
    ) {
        let padded: Vec<String> = lines
            .iter()
            .flat_map(|line| {
                let blank = line.trim().is_empty();
                std::iter::once(line.clone())
                    .chain(std::iter::repeat_n(String::new(), if blank { padding } else { 0 }))
            })
            .collect();
        prop_assert_eq!(segment(&padded), segment(&lines));
    }

    #[test]
    fn segmenting_rejoined_groups_is_stable(lines in prop::collection::vec(content_line(), 0..40)) {
        let groups = segment(&lines);
        let rejoined = groups
            .iter()
            .map(|group| group.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");
        prop_assert_eq!(segment_text(&rejoined), groups);
    }

    #[test]
    fn tokens_rejoin_to_the_trimmed_fields(fields in prop::collection::vec("[A-Za-z0-9_.]{0,8}", 1..8)) {
        let line = fields.join(";");
        let tokens = tokenize(&line, ";");
        prop_assert_eq!(tokens.len(), fields.len());
        prop_assert_eq!(tokens.join(";"), line);
    }

    #[test]
    fn tokenizing_without_delimiter_yields_one_token(line in "[A-Za-z0-9 ]{0,24}") {
        prop_assert_eq!(tokenize(&line, ";"), vec![line.trim()]);
        prop_assert_eq!(tokenize(&line, ""), vec![line.trim()]);
    }

    #[test]
    fn comma_decimals_normalize_to_dots(whole in 0u32..100_000, fraction in 0u32..100) {
        let comma = format!("{whole},{fraction:02}");
        let dot = format!("{whole}.{fraction:02}");
        prop_assert_eq!(normalize_numeric(&comma), Some(dot.clone()));
        prop_assert_eq!(normalize_numeric(&dot), Some(dot));
    }

    #[test]
    fn alphabetic_tokens_never_normalize(token in "[G-Zg-z_]{1,12}") {
        // No `a`, `e` or `f`: rules out "nan", "inf" and exponents.
        prop_assert_eq!(normalize_numeric(&token), None);
    }

    #[test]
    fn every_grammar_accepts_arbitrary_text(text in "[A-Za-z0-9_;:.\\n -]{0,400}") {
        for kind in ReportKind::ALL {
            let doc = convert_text(kind, &text, ";");
            prop_assert_eq!(doc.kind(), kind);
        }
    }
}

#[test]
fn check_sentinel_and_empty_tokens_are_rejected() {
    assert_eq!(normalize_numeric("CHECK"), None);
    assert_eq!(normalize_numeric(""), None);
    assert_eq!(normalize_numeric("   "), None);
}

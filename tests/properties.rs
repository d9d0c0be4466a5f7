use cuealign::{
    bigram_score, normalize_text, segment, AlignmentConfig, Granularity, RecognizerEvent,
    ReplayRecognizer, SegmentConfig, Session, Signal, Trigger,
};

const DOCUMENTS: &[&str] = &[
    "",
    "Hello world. How are you today?",
    "# Title only",
    "# 서론\n하나님은 사랑이십니다. 우리는 그 사랑 안에 삽니다!\n\n# 본론\n말씀을 들으십시오…\n그리고 행하십시오.",
    "Line one without punctuation\nline two also without\n\n\n# Heading\nThird block. With two sentences.",
    "\r\n\r\n   \r\nTrailing blanks.\r\n\r\n\r\n",
    "He said \"Stop!\" and left. She stayed? Yes.",
];

fn without_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Non-blank, non-heading content of a document with whitespace removed
fn body_content(text: &str) -> String {
    text.replace("\r\n", "\n")
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.trim().starts_with('#'))
        .map(without_whitespace)
        .collect()
}

#[test]
fn test_normalize_is_idempotent() {
    let mut samples: Vec<&str> = DOCUMENTS.to_vec();
    samples.extend(["ÀÉÎÕÜ çà", "tab\tand\u{00A0}nbsp", "🎉 party 🎉", "!!!", "ǄǅǆĲ"]);

    for sample in samples {
        let once = normalize_text(sample);
        assert_eq!(normalize_text(&once), once, "sample {:?}", sample);
        assert!(!once.starts_with(' ') && !once.ends_with(' '));
        assert!(!once.contains("  "));
    }
}

#[test]
fn test_segmentation_covers_body_text() {
    for doc in DOCUMENTS {
        let manuscript = segment(doc, &SegmentConfig::default());
        let joined: String = manuscript
            .units
            .iter()
            .map(|u| without_whitespace(&u.raw_text))
            .collect();
        assert_eq!(joined, body_content(doc), "document {:?}", doc);
    }
}

#[test]
fn test_unit_indices_are_contiguous() {
    for granularity in [Granularity::Sentence, Granularity::Section] {
        let config = SegmentConfig {
            granularity,
            ..Default::default()
        };
        for doc in DOCUMENTS {
            let manuscript = segment(doc, &config);
            for (position, unit) in manuscript.units.iter().enumerate() {
                assert_eq!(unit.index, position);
                assert_eq!(unit.normalized_text, normalized_for(&manuscript, position));
            }
        }
    }
}

fn normalized_for(manuscript: &cuealign::Manuscript, index: usize) -> String {
    let unit = &manuscript.units[index];
    match (manuscript.granularity, manuscript.section_of(index)) {
        (Granularity::Section, Some(section)) if !section.title.is_empty() => {
            normalize_text(&format!("{} {}", section.title, unit.raw_text))
        }
        _ => normalize_text(&unit.raw_text),
    }
}

#[test]
fn test_bigram_score_bounds() {
    let samples: Vec<String> = DOCUMENTS.iter().map(|d| normalize_text(d)).collect();
    for a in &samples {
        for b in &samples {
            let score = bigram_score(a, b);
            assert!((0.0..=1.0).contains(&score));
        }
        if a.chars().count() >= 2 {
            assert_eq!(bigram_score(a, a), 1.0);
        }
    }
}

const SERMON: &str = "\
# Opening
Good morning and welcome to everyone joining us today. Let us open our hearts as we begin.

# Reading
The Lord is my shepherd, I shall not want. He makes me lie down in green pastures.
He leads me beside still waters. He restores my soul.

# Message
Rest is not idleness but trust in the one who leads us. When we stop striving we notice the still waters around us.";

const TRANSCRIPT: &[&str] = &[
    "good morning and welcome to everyone",
    "joining us today",
    "um let us open our hearts as we begin",
    "the lord is my shepherd",
    "i shall not want",
    "he makes me lie down in green pastures",
    "sorry where was i",
    "he leads me beside still waters",
    "he restores my soul",
    "rest is not idleness but trust",
    "in the one who leads us",
    "when we stop striving we notice the still waters around us",
];

#[test]
fn test_confidence_gate_holds_for_every_automatic_move() {
    let config = AlignmentConfig::default();
    let threshold = config.acceptance_threshold;
    let mut session = Session::new(config, ReplayRecognizer::new()).unwrap();
    session.load_manuscript(SERMON);
    session.start_listening().unwrap();

    let mut moves = Vec::new();
    for fragment in TRANSCRIPT {
        if let Some(Signal::ActiveUnit(change)) =
            session.handle_recognizer_event(RecognizerEvent::final_text(*fragment))
        {
            moves.push(change);
        }
    }

    assert!(!moves.is_empty());
    for change in &moves {
        assert_eq!(change.trigger, Trigger::Auto);
        assert!(change.confidence.unwrap() >= threshold);
    }

    // reading order is followed overall
    let last = session.active_unit().unwrap();
    assert_eq!(last, session.manuscript().unit_count() - 1);
}

#[test]
fn test_manual_override_is_not_reasserted_by_stale_text() {
    let mut session = Session::new(AlignmentConfig::default(), ReplayRecognizer::new()).unwrap();
    session.load_manuscript(SERMON);
    session.start_listening().unwrap();

    for fragment in &TRANSCRIPT[..6] {
        session.push_fragment(fragment);
    }
    let auto_position = session.active_unit().unwrap();
    assert!(auto_position >= 2);

    session.set_active(0);

    // a short tail of the same speech would re-match the old position if
    // pre-override text still counted
    assert!(session.push_fragment("in green pastures").is_none());
    assert_eq!(session.active_unit(), Some(0));

    // new speech after the override moves again
    let change = session
        .push_fragment("he leads me beside still waters he restores my soul")
        .unwrap();
    assert_eq!(change.trigger, Trigger::Auto);
    assert!(change.unit_index > 0);
}

#[test]
fn test_sessions_are_isolated() {
    let mut first = Session::new(AlignmentConfig::default(), ReplayRecognizer::new()).unwrap();
    let mut second = Session::new(AlignmentConfig::default(), ReplayRecognizer::new()).unwrap();
    first.load_manuscript(SERMON);
    second.load_manuscript("Completely different text. Nothing shared.");

    first.set_active(4);
    assert_eq!(first.active_unit(), Some(4));
    assert_eq!(second.active_unit(), Some(0));
    assert_ne!(first.session_id(), second.session_id());
}

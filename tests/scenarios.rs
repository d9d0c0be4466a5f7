use cuealign::{
    rank_candidates, segment, AlignmentConfig, IndexConfig, ReplayRecognizer, ScoreWeights,
    SegmentConfig, Session, SimilarityIndex, Trigger,
};

/// The whole greeting is under 30 characters of speech, below the default
/// eligibility length of 50, so it could never align with defaults. The
/// buffer and match minimums are lowered for this manuscript only.
fn short_buffer_config() -> AlignmentConfig {
    AlignmentConfig {
        min_buffer_len: 12,
        index: IndexConfig {
            min_match_len: 4,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_follows_two_sentence_greeting() {
    let mut session = Session::new(short_buffer_config(), ReplayRecognizer::new()).unwrap();
    session.load_manuscript("Hello world. How are you today?");
    assert_eq!(session.manuscript().unit_count(), 2);
    assert_eq!(session.active_index(), 0);

    session.start_listening().unwrap();

    let mut changes = Vec::new();
    for fragment in ["hello", "world how", "are you today"] {
        changes.extend(session.push_fragment(fragment));
        assert_ne!(session.active_index(), -1);
    }

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].unit_index, 1);
    assert_eq!(changes[0].trigger, Trigger::Auto);
    assert_eq!(session.active_index(), 1);
}

#[test]
fn test_empty_manuscript() {
    let manuscript = segment("", &SegmentConfig::default());
    assert_eq!(manuscript.unit_count(), 0);

    let index = SimilarityIndex::build(&manuscript.units, &IndexConfig::default());
    assert!(index.query("anything at all", 5).is_empty());

    let mut session = Session::new(AlignmentConfig::default(), ReplayRecognizer::new()).unwrap();
    session.load_manuscript("");
    assert!(session.set_active(0).is_none());
    assert_eq!(session.active_index(), -1);

    session.start_listening().unwrap();
    assert!(session
        .push_fragment("a long stretch of speech that would normally be enough to trigger a match")
        .is_none());
    assert_eq!(session.active_index(), -1);
}

#[test]
fn test_run_on_sentence_is_chunked() {
    let text: String = (0..500).map(|i| if i % 10 == 4 { ' ' } else { 'a' }).collect();
    assert_eq!(text.chars().count(), 500);

    let manuscript = segment(&text, &SegmentConfig::default());

    assert_eq!(manuscript.unit_count(), 7);
    assert!(manuscript.units.iter().all(|u| u.raw_text.chars().count() <= 80));
}

#[test]
fn test_duplicate_units_prefer_nearest() {
    let text = "Grace and peace to you. Filler one here. Filler two here. Grace and peace to you.";
    let manuscript = segment(text, &SegmentConfig::default());
    let index = SimilarityIndex::build(&manuscript.units, &IndexConfig::default());

    let candidates = index.query("grace and peace to you", 5);
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].approx_score, candidates[1].approx_score);

    let weights = ScoreWeights::default();
    let near_end = rank_candidates("grace and peace to you", &candidates, &manuscript, Some(2), &weights);
    assert_eq!(near_end[0].unit_index, 3);
    assert_eq!(near_end[0].confidence, near_end[1].confidence);

    let near_start = rank_candidates("grace and peace to you", &candidates, &manuscript, Some(1), &weights);
    assert_eq!(near_start[0].unit_index, 0);
}

#[test]
fn test_duplicate_units_live_tie_break() {
    let config = AlignmentConfig {
        min_buffer_len: 10,
        ..Default::default()
    };
    let mut session = Session::new(config, ReplayRecognizer::new()).unwrap();
    session.load_manuscript(
        "Grace and peace to you. Filler one here. Filler two here. Grace and peace to you.",
    );
    session.start_listening().unwrap();
    session.set_active(2);

    let change = session.push_fragment("grace and peace to you").unwrap();
    assert_eq!(change.unit_index, 3);
    assert_eq!(change.trigger, Trigger::Auto);
}

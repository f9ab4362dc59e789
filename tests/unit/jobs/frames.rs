use super::*;

fn authored() -> FrameSpan {
    FrameSpan::new(10, 40).unwrap()
}

fn parse(v: serde_json::Value) -> Vec<FrameSelector> {
    serde_json::from_value(v).unwrap()
}

#[test]
fn empty_request_renders_only_the_first_frame() {
    let plan = FramePlan::resolve(&[], FrameSpan::new(1, 25).unwrap());
    assert!(!plan.has_animation_data());
    assert_eq!(plan.frames(), &[1]);
    assert_eq!(plan.suffix(1), "");
    assert_eq!(plan.span(), FrameSpan::new(1, 1).unwrap());
}

#[test]
fn keywords_anchor_on_authored_keys() {
    let plan = FramePlan::resolve(&parse(serde_json::json!(["start", "end"])), authored());
    assert!(plan.has_animation_data());
    assert_eq!(plan.frames(), &[10, 40]);
    assert_eq!(plan.suffix(10), "_start");
    assert_eq!(plan.suffix(40), "_end");
}

#[test]
fn numbers_are_sorted_deduplicated_and_padded() {
    let request = parse(serde_json::json!([25, "end", 5, 25]));
    let plan = FramePlan::resolve(&request, authored());
    assert_eq!(plan.frames(), &[5, 25, 40]);
    assert_eq!(plan.span(), FrameSpan::new(5, 40).unwrap());
    assert_eq!(plan.suffix(5), "_0005");
    assert_eq!(plan.suffix(25), "_0025");
    assert_eq!(plan.suffix(40), "_end");
}

#[test]
fn end_wins_when_start_and_end_coincide() {
    let plan = FramePlan::resolve(&parse(serde_json::json!(["start", "end"])), FrameSpan::new(7, 7).unwrap());
    assert_eq!(plan.frames(), &[7]);
    assert_eq!(plan.suffix(7), "_end");
}

#[test]
fn unknown_keyword_does_not_parse() {
    assert!(serde_json::from_value::<Vec<FrameSelector>>(serde_json::json!(["middle"])).is_err());
    assert_eq!(FrameSelector::Frame(3).to_string(), "3");
}

use todofuken_game::{GameMode, GameSession, PrefectureId, Region};
use todofuken_web::view::{SessionView, parse_mode};

#[test]
fn route_labels_map_to_modes() {
    assert_eq!(parse_mode("full"), GameMode::Full);
    assert_eq!(parse_mode("expert"), GameMode::Expert);
    assert_eq!(parse_mode("regions-5"), GameMode::Regions(5));
    assert_eq!(parse_mode("0"), GameMode::Full);
    assert_eq!(parse_mode("regions-x"), GameMode::Full);
}

#[test]
fn completed_view_reports_full_progress() {
    let targets = Region::Hokkaido.members().collect();
    let mut session = GameSession::new(targets, PrefectureId::FIRST);
    session.start_time = Some(0);
    session.end_time = Some(1_000);
    session.total_time = 1_000;
    session.is_game_complete = true;
    session.score = 10;
    session.answered_prefectures.insert(PrefectureId::FIRST);

    let view = serde_json::to_value(SessionView::new(&session, GameMode::Full)).unwrap();
    assert_eq!(view["phase"], "complete");
    assert_eq!(view["progress"]["percentage"], 100);
    assert_eq!(view["totalTime"], 1_000);
    assert_eq!(view["isGameComplete"], true);
}

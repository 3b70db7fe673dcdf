use graphlesson::config::setup_logging;
use graphlesson::lesson::{
    Difficulty, GameType, LessonRequest, analysis_instruction, lesson_instruction,
};

#[test]
fn test_every_lesson_instruction_names_its_choices() {
    let _ = setup_logging(true);

    let analysis = "- כותרת: מסיסות מלח כתלות בטמפרטורה\n- ציר Y: גרם ל-100 מ\"ל מים";
    for game in GameType::ALL {
        for level in Difficulty::ALL {
            let instruction = lesson_instruction(LessonRequest { game, level }, analysis);
            assert!(
                instruction.contains(&format!("\"{}\"", game.label())),
                "instruction for {game:?}/{level:?} lacks the game label"
            );
            assert!(instruction.contains(&format!("\"{}\"", level.label())));
            assert!(instruction.contains(analysis));
            assert!(instruction.contains("Slides 3-7"));
            assert!(instruction.contains("H2O"));
        }
    }
}

#[test]
fn test_lesson_instruction_lists_every_game_rule() {
    let instruction = lesson_instruction(
        LessonRequest {
            game: GameType::DrawMeAGraph,
            level: Difficulty::Basic,
        },
        "",
    );
    for rule in [
        "תיאור מילולי שהתלמיד צריך לצייר",
        "סיפור מסלול על הגרף",
        "טענות נכונות/שגויות של דמויות",
        "שאלות חקר מדעי",
    ] {
        assert!(instruction.contains(rule), "missing rule {rule}");
    }
    assert!(instruction.contains("אלא אם זה משחק \"מה קורה פה\""));
}

#[test]
fn test_analysis_instruction_is_fixed() {
    assert_eq!(analysis_instruction(), analysis_instruction());
    assert!(analysis_instruction().starts_with("נתח את הגרף הזה עבור מורה למדעים."));
}

//! Lesson choices (game type, difficulty) and the instructions sent to the model.

use std::fmt;
use std::str::FromStr;

/// A choice form value that doesn't name a known game or level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownChoice {
    kind: &'static str,
    value: String,
}

/// The four pedagogical activity templates a teacher can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameType {
    /// The pupil draws a graph from a verbal description.
    DrawMeAGraph,
    /// A story of a route walked along the graph.
    WentForAWalk,
    /// True/false claims made by characters.
    WhoSaidThat,
    /// Scientific inquiry questions: variables, controls, hypotheses.
    WhatsGoingOn,
}

impl GameType {
    /// Every game, in the order the form lists them.
    pub const ALL: [GameType; 4] = [
        GameType::DrawMeAGraph,
        GameType::WentForAWalk,
        GameType::WhoSaidThat,
        GameType::WhatsGoingOn,
    ];

    /// Form value for the game.
    pub fn slug(self) -> &'static str {
        match self {
            Self::DrawMeAGraph => "draw",
            Self::WentForAWalk => "walk",
            Self::WhoSaidThat => "who-said",
            Self::WhatsGoingOn => "whats-going-on",
        }
    }

    /// The label shown to the teacher and quoted to the model.
    pub fn label(self) -> &'static str {
        match self {
            Self::DrawMeAGraph => "צייר לי גרף",
            Self::WentForAWalk => "יצאתי לטייל — לאן הגעתי?",
            Self::WhoSaidThat => "מי אמר את זה?",
            Self::WhatsGoingOn => "מה קורה פה?",
        }
    }

    /// Icon used in the sidebar game list.
    pub fn icon(self) -> &'static str {
        match self {
            Self::DrawMeAGraph => "🎨",
            Self::WentForAWalk => "🚶",
            Self::WhoSaidThat => "🗣️",
            Self::WhatsGoingOn => "🔬",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameType {
    type Err = UnknownChoice;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|game| game.slug() == value)
            .ok_or_else(|| UnknownChoice {
                kind: "game type",
                value: value.to_string(),
            })
    }
}

/// Ordinal difficulty of the generated questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Difficulty {
    /// Entry level.
    Basic,
    /// Middle level.
    Intermediate,
    /// Most demanding level.
    High,
}

impl Difficulty {
    /// Every level, easiest first.
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Basic,
        Difficulty::Intermediate,
        Difficulty::High,
    ];

    /// Form value for the level.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::High => "high",
        }
    }

    /// The label shown to the teacher and quoted to the model.
    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "בסיסית",
            Self::Intermediate => "בינונית",
            Self::High => "גבוהה",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = UnknownChoice;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.slug() == value)
            .ok_or_else(|| UnknownChoice {
                kind: "difficulty",
                value: value.to_string(),
            })
    }
}

/// What the teacher asked for when pressing generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonRequest {
    /// Selected activity template.
    pub game: GameType,
    /// Selected difficulty.
    pub level: Difficulty,
}

const ANALYSIS_INSTRUCTION: &str = "\
נתח את הגרף הזה עבור מורה למדעים.
התייחס ל: כותרת, צירים (X,Y) ויחידות, מגמות עיקריות (עלייה/ירידה), נקודות קיצון וחיתוכים בולטים.
כתוב את הניתוח בעברית, בשפה ברורה, כרשימת תבליטים.
";

/// Fixed instruction sent with the image for the analysis stage.
pub fn analysis_instruction() -> &'static str {
    ANALYSIS_INSTRUCTION
}

/// Builds the lesson instruction around the stored analysis and the teacher's choices.
///
/// The layout asks for nine slides and tells the model to skip the discussion
/// slide for [`GameType::WhatsGoingOn`].
pub fn lesson_instruction(request: LessonRequest, analysis: &str) -> String {
    format!(
        "\
אתה עוזר פדגוגי מומחה.
המשתמש בחר את המשחק: \"{game}\" ברמת קושי: \"{level}\".

הנה ניתוח הגרף שעליו מתבססים:
{analysis}

עליך לייצר מצגת מלאה (טקסט בלבד) לפי המבנה הבא:
Slide 1: כותרת המשחק ונושא.
Slide 2: הסבר על הגרף (מבוסס על הניתוח).
Slides 3-7: 5 שאלות/חידות/טענות המותאמות למשחק שנבחר ולרמה שנבחרה.
Slide 8: פתרונות מלאים ונימוקים.
Slide 9: שאלות לדיון מדעי (אלא אם זה משחק \"{inquiry}\" - אז אין צורך).

כללי משחקים:
- \"{draw}\": תיאור מילולי שהתלמיד צריך לצייר.
- \"{walk}\": סיפור מסלול על הגרף.
- \"{who}\": טענות נכונות/שגויות של דמויות.
- \"{inquiry}\": שאלות חקר מדעי (משתנים, בקרה, השערות).

השתמש בפורמט כימי פשוט (H2O). כתוב בעברית, בפורמט Markdown יפה וקריא.
",
        game = request.game.label(),
        level = request.level.label(),
        draw = GameType::DrawMeAGraph.label(),
        walk = "יצאתי לטייל",
        who = GameType::WhoSaidThat.label(),
        inquiry = "מה קורה פה",
    )
}

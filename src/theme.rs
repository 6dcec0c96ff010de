use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub question_fill: String,
    pub question_border: String,
    pub question_text: String,
    pub choice_fill: String,
    pub choice_border: String,
    pub choice_text: String,
    pub branch_fill: String,
    pub branch_border: String,
    pub branch_text: String,
    pub line_color: String,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"Segoe UI\", \"Segoe UI Web\", arial, sans-serif".to_string(),
            font_size: 14.0,
            question_fill: "#FFFFFF".to_string(),
            question_border: "#0078D4".to_string(),
            question_text: "#323130".to_string(),
            choice_fill: "#EFF6FC".to_string(),
            choice_border: "#C7E0F4".to_string(),
            choice_text: "#004578".to_string(),
            branch_fill: "#FAF9F8".to_string(),
            branch_border: "#C8C6C4".to_string(),
            branch_text: "#323130".to_string(),
            line_color: "#8A8886".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            question_fill: "#F8FAFF".to_string(),
            question_border: "#7A8AA6".to_string(),
            question_text: "#1C2430".to_string(),
            choice_fill: "#EEF2F8".to_string(),
            choice_border: "#C7D2E5".to_string(),
            choice_text: "#1C2430".to_string(),
            branch_fill: "#FFFFFF".to_string(),
            branch_border: "#D7E0F0".to_string(),
            branch_text: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

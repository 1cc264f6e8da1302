use serde::{Deserialize, Serialize};

/// One of the two career programs a sender can pick as their topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Program {
    AgenticAi,
    DataAnalytics,
}

impl Program {
    pub const ALL: [Program; 2] = [Program::AgenticAi, Program::DataAnalytics];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgenticAi => "agentic_ai",
            Self::DataAnalytics => "data_analytics",
        }
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use edubot_core::domain::program::Program;
use edubot_core::faq::FaqMatcher;
use edubot_core::knowledge::FaqAnswer;
use edubot_core::text::{contains_term, contains_word};

use crate::replies::MenuOption;

pub const GREETING_TERMS: [&str; 10] = [
    "hi",
    "hello",
    "hey",
    "hay",
    "hii",
    "hola",
    "namaste",
    "good morning",
    "good afternoon",
    "good evening",
];

const BOT_WORDS: [&str; 3] = ["bot", "ai", "robot"];

const BOT_QUESTIONS: [&str; 8] = [
    "are you a bot",
    "are you bot",
    "you bot",
    "is this bot",
    "is this a bot",
    "are you a robot",
    "are you an ai",
    "are you ai",
];

const COURSE_STEMS: [&str; 4] = ["course", "program", "provide", "offer"];

/// Ordered intent rules; [`IntentRule::CASCADE`] is evaluated first-match-wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntentRule {
    Greeting,
    BotQuestion,
    CourseInquiry,
    TopicSelection,
    MenuReply,
    FaqKeyword,
    AiFallback,
}

/// Outcome of the cascade for one normalized message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    BotQuestion,
    CourseInquiry,
    SelectTopic(Program),
    MenuReply(MenuOption),
    Faq(FaqAnswer),
    AiFallback,
}

impl IntentRule {
    pub const CASCADE: [IntentRule; 7] = [
        IntentRule::Greeting,
        IntentRule::BotQuestion,
        IntentRule::CourseInquiry,
        IntentRule::TopicSelection,
        IntentRule::MenuReply,
        IntentRule::FaqKeyword,
        IntentRule::AiFallback,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::BotQuestion => "bot_question",
            Self::CourseInquiry => "course_inquiry",
            Self::TopicSelection => "topic_selection",
            Self::MenuReply => "menu_reply",
            Self::FaqKeyword => "faq_keyword",
            Self::AiFallback => "ai_fallback",
        }
    }

    pub fn evaluate(&self, normalized_text: &str, faq: &FaqMatcher) -> Option<Intent> {
        match self {
            Self::Greeting => is_greeting(normalized_text).then_some(Intent::Greeting),
            Self::BotQuestion => is_bot_question(normalized_text).then_some(Intent::BotQuestion),
            Self::CourseInquiry => COURSE_STEMS
                .iter()
                .any(|stem| normalized_text.contains(stem))
                .then_some(Intent::CourseInquiry),
            Self::TopicSelection => select_topic(normalized_text).map(Intent::SelectTopic),
            Self::MenuReply => MenuOption::from_reply(normalized_text).map(Intent::MenuReply),
            Self::FaqKeyword => faq.find(normalized_text).cloned().map(Intent::Faq),
            Self::AiFallback => Some(Intent::AiFallback),
        }
    }
}

/// Runs the cascade and returns the winning rule with its intent.
pub fn classify(normalized_text: &str, faq: &FaqMatcher) -> (IntentRule, Intent) {
    IntentRule::CASCADE
        .iter()
        .find_map(|rule| rule.evaluate(normalized_text, faq).map(|intent| (*rule, intent)))
        .unwrap_or((IntentRule::AiFallback, Intent::AiFallback))
}

pub fn is_greeting(normalized_text: &str) -> bool {
    GREETING_TERMS.iter().any(|term| contains_term(normalized_text, term))
}

fn is_bot_question(normalized_text: &str) -> bool {
    BOT_WORDS.iter().any(|word| contains_word(normalized_text, word))
        && BOT_QUESTIONS.iter().any(|phrase| contains_term(normalized_text, phrase))
}

fn select_topic(normalized_text: &str) -> Option<Program> {
    if normalized_text == "a"
        || contains_word(normalized_text, "agentic")
        || contains_word(normalized_text, "ai")
    {
        return Some(Program::AgenticAi);
    }
    if normalized_text == "d"
        || contains_word(normalized_text, "data")
        || contains_word(normalized_text, "analytics")
    {
        return Some(Program::DataAnalytics);
    }
    None
}

//! Canned WhatsApp replies produced by the deterministic intent rules.
//!
//! Every builder renders from the [`KnowledgeBase`] so a replacement catalogue changes the
//! wording without code changes. Follow-up and fallback variants are chosen by the caller's
//! [`PhrasePicker`](edubot_core::phrases::PhrasePicker).

use edubot_core::clock::DayPeriod;
use edubot_core::domain::program::Program;
use edubot_core::knowledge::{bullet_list, numbered_list, KnowledgeBase};

pub const FOLLOW_UPS: [&str; 5] = [
    "What else would you like to know?",
    "Does this help?",
    "Shall we explore more?",
    "Any other questions?",
    "Ready to learn more?",
];

const MENU_KEYCAPS: [&str; 6] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣"];

/// Entries of the numbered menu shown after a program is picked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuOption {
    Curriculum,
    Eligibility,
    Placement,
    Fees,
    Schedule,
    Contact,
}

impl MenuOption {
    pub const ALL: [MenuOption; 6] = [
        MenuOption::Curriculum,
        MenuOption::Eligibility,
        MenuOption::Placement,
        MenuOption::Fees,
        MenuOption::Schedule,
        MenuOption::Contact,
    ];

    /// Accepts exactly one digit `1`..=`6`.
    pub fn from_reply(normalized_text: &str) -> Option<Self> {
        match normalized_text {
            "1" => Some(Self::Curriculum),
            "2" => Some(Self::Eligibility),
            "3" => Some(Self::Placement),
            "4" => Some(Self::Fees),
            "5" => Some(Self::Schedule),
            "6" => Some(Self::Contact),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Curriculum => "Curriculum details",
            Self::Eligibility => "Eligibility & requirements",
            Self::Placement => "Placement support",
            Self::Fees => "Fees & payment",
            Self::Schedule => "Class schedule",
            Self::Contact => "Contact admissions",
        }
    }
}

fn program_lines(knowledge: &KnowledgeBase) -> String {
    Program::ALL
        .iter()
        .map(|program| {
            let descriptor = knowledge.program(*program);
            format!("{} *{} Program* - {}", descriptor.emoji, descriptor.name, descriptor.tagline)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const TOPIC_PROMPT: &str = "*Which program interests you? Reply with \"AI\" or \"Data\"*";

pub fn greeting(knowledge: &KnowledgeBase, name: &str, period: DayPeriod) -> String {
    format!(
        "{} {name}! 👋\n\nI'm here to help you explore career opportunities! 🚀\n\nAt {}, we offer:\n\n{}\n\n{TOPIC_PROMPT}",
        period.salutation(),
        knowledge.company_name,
        program_lines(knowledge),
    )
}

/// Persona welcome used by the generator when a greeting reaches it directly.
pub fn assistant_welcome(knowledge: &KnowledgeBase, name: &str) -> String {
    format!(
        "👋 Hi {name}! I'm {} from {}. I'm here to help you explore career opportunities! 🚀\n\nAt {}, we offer:\n\n{}\n\n{TOPIC_PROMPT}",
        knowledge.assistant_name,
        knowledge.company_name,
        knowledge.company_name,
        program_lines(knowledge),
    )
}

pub fn course_overview(knowledge: &KnowledgeBase) -> String {
    let mut sections = vec!["*Our Career-Transforming Programs:*\n\n📱 *Perfect for your career growth!*".to_string()];
    for program in Program::ALL {
        let descriptor = knowledge.program(program);
        sections.push(format!(
            "{} *{} PROGRAM*\n   {}",
            descriptor.emoji,
            descriptor.name.to_uppercase(),
            descriptor.definition
        ));
    }
    sections.push(
        "🎯 *Both programs include:*\n• 100% Placement Support 🚀\n• Live + Recorded Classes 📚\n• Pay After Placement 💰\n• Industry Projects 🏆"
            .to_string(),
    );
    sections.push("*Which one excites you? Reply \"AI\" or \"Data\"*".to_string());
    sections.join("\n\n")
}

pub fn bot_identity(knowledge: &KnowledgeBase, name: &str) -> String {
    format!(
        "Interesting question, {name}! 🤔\n\nI'm an AI-powered career advisor from {}. I'm here to provide instant, helpful information about our programs!\n\nWould you prefer to:\n1️⃣ Continue chatting with me\n2️⃣ Speak with a human advisor\n\n*Reply with 1 or 2*",
        knowledge.company_name,
    )
}

pub fn menu() -> String {
    MenuOption::ALL
        .iter()
        .zip(MENU_KEYCAPS)
        .map(|(option, keycap)| format!("{keycap} {}", option.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn topic_selected(knowledge: &KnowledgeBase, program: Program) -> String {
    let descriptor = knowledge.program(program);
    let (cheer, learn_icon) = match program {
        Program::AgenticAi => ("Excellent choice!", "🚀"),
        Program::DataAnalytics => ("Amazing!", "📈"),
    };

    format!(
        "{} *{cheer} {} Program*\n\n{}\n\n*{learn_icon} What You'll Learn:*\n{}\n\n*💼 Career Roles:*\n{}\n\n*What would you like to know next?*\n\n{}\n\n*Reply with number (1-6) or ask your question*",
        descriptor.emoji,
        descriptor.name,
        descriptor.definition,
        bullet_list(&descriptor.tools),
        bullet_list(&descriptor.roles),
        menu(),
    )
}

pub fn choose_program_first(name: &str) -> String {
    format!("Hi {name}! First, choose a program:\n\n🤖 AI or 📊 Data?\n\n*Then use numbers 1-6*")
}

pub fn menu_answer(
    knowledge: &KnowledgeBase,
    program: Program,
    option: MenuOption,
    name: &str,
    follow_up: &str,
) -> String {
    let descriptor = knowledge.program(program);
    let facts = &knowledge.facts;
    let contact = &knowledge.contact;

    let body = match option {
        MenuOption::Curriculum => format!(
            "{} *{} Curriculum*\n\n*Tools You'll Learn:*\n{}\n\n*Projects:* {}",
            descriptor.emoji,
            descriptor.name,
            numbered_list(&descriptor.tools),
            facts.projects
        ),
        MenuOption::Eligibility => format!(
            "✅ *Eligibility for {}*\n\n*Who Can Join:*\n{}\n\n*Coding:* {}",
            descriptor.name,
            bullet_list(&facts.eligibility),
            descriptor.coding
        ),
        MenuOption::Placement => format!(
            "🚀 *Placement Support*\n\n{}\n\n*Career Roles:*\n{}\n\n*Salary:* {}",
            facts.placement_support,
            bullet_list(&descriptor.roles),
            facts.salary_expectation
        ),
        MenuOption::Fees => format!(
            "💰 *Fees & Payment*\n\n{}\n\n*Registration:* {}\n*Refund:* {}",
            facts.pay_after_placement, facts.registration_fee, facts.refund_policy
        ),
        MenuOption::Schedule => format!(
            "📚 *Class Schedule*\n\n{}\n\n*Missed Class:* {}\n*Support:* {}",
            facts.class_format, facts.missed_session, facts.support
        ),
        MenuOption::Contact => format!(
            "📞 *Contact Admissions*\n\nFor personalized guidance:\n\n📧 {}\n📝 {}\n\n*Response:* Within 24 hours",
            contact.email, contact.callback_form
        ),
    };

    format!("*Thanks {name}!* 😊\n\n{body}\n\n{follow_up}")
}

pub fn faq_answer(answer: &str, follow_up: &str) -> String {
    format!("{answer}\n\n{follow_up}")
}

/// Deterministic replies served whenever a completion cannot be used.
pub fn fallbacks(knowledge: &KnowledgeBase, name: &str) -> [String; 3] {
    let email = &knowledge.contact.email;
    let form = &knowledge.contact.callback_form;
    [
        format!("Hi {name}! 😊 For detailed guidance:\n\n📧 {email}\n📝 {form}\n\nOur team will help you!"),
        format!("Hey {name}! Let me connect you with our experts:\n\n📧 {email}\n📝 {form}\n\nThey'll answer all your questions! 😊"),
        format!("{name}, for personalized help:\n\n📧 Email: {email}\n📝 Form: {form}\n\nWe're here for you! 🚀"),
    ]
}

#[cfg(test)]
mod tests {
    use edubot_core::clock::DayPeriod;
    use edubot_core::domain::program::Program;
    use edubot_core::knowledge::KnowledgeBase;

    use super::{
        bot_identity, choose_program_first, course_overview, fallbacks, greeting, menu,
        menu_answer, topic_selected, MenuOption, MENU_KEYCAPS,
    };

    #[test]
    fn greeting_uses_day_period_and_lists_both_programs() {
        let knowledge = KnowledgeBase::builtin();
        let reply = greeting(&knowledge, "Asha", DayPeriod::Evening);
        assert!(reply.starts_with("Good evening Asha! 👋"));
        assert!(reply.contains("🤖 *Agentic AI Program* - Build autonomous AI systems"));
        assert!(reply.contains("📊 *Data Analytics Program* - Master data-driven decisions"));
        assert!(reply.contains("EdTech Informative"));
    }

    #[test]
    fn menu_has_six_keycap_entries() {
        let rendered = menu();
        assert_eq!(rendered.lines().count(), 6);
        for (line, keycap) in rendered.lines().zip(MENU_KEYCAPS) {
            assert!(line.starts_with(keycap));
        }
    }

    #[test]
    fn topic_reply_is_scoped_to_program() {
        let knowledge = KnowledgeBase::builtin();
        let ai = topic_selected(&knowledge, Program::AgenticAi);
        assert!(ai.starts_with("🤖 *Excellent choice! Agentic AI Program*"));
        assert!(ai.contains("• Prompt Engineering"));
        assert!(ai.contains("• Junior AI Engineer"));

        let data = topic_selected(&knowledge, Program::DataAnalytics);
        assert!(data.contains("*📈 What You'll Learn:*"));
        assert!(data.contains("• Power BI / Tableau"));
    }

    #[test]
    fn menu_answers_thank_by_name_and_end_with_follow_up() {
        let knowledge = KnowledgeBase::builtin();
        for option in MenuOption::ALL {
            let reply =
                menu_answer(&knowledge, Program::DataAnalytics, option, "Ravi", "Any other questions?");
            assert!(reply.starts_with("*Thanks Ravi!* 😊\n\n"));
            assert!(reply.ends_with("\n\nAny other questions?"));
        }

        let curriculum = menu_answer(
            &knowledge,
            Program::AgenticAi,
            MenuOption::Curriculum,
            "Ravi",
            "Does this help?",
        );
        assert!(curriculum.contains("1. Python & AI APIs"));
    }

    #[test]
    fn only_single_digits_one_to_six_are_menu_replies() {
        assert_eq!(MenuOption::from_reply("3"), Some(MenuOption::Placement));
        assert_eq!(MenuOption::from_reply("0"), None);
        assert_eq!(MenuOption::from_reply("7"), None);
        assert_eq!(MenuOption::from_reply("12"), None);
    }

    #[test]
    fn other_canned_replies_carry_key_details() {
        let knowledge = KnowledgeBase::builtin();
        assert!(course_overview(&knowledge).contains("AGENTIC AI PROGRAM"));
        assert!(bot_identity(&knowledge, "Asha").contains("2️⃣ Speak with a human advisor"));
        assert!(choose_program_first("Asha").contains("First, choose a program"));
    }

    #[test]
    fn every_fallback_carries_both_contact_channels() {
        let knowledge = KnowledgeBase::builtin();
        for fallback in fallbacks(&knowledge, "Asha") {
            assert!(fallback.contains("support@edtechinformative.uk"));
            assert!(fallback.contains(&knowledge.contact.callback_form));
            assert!(fallback.contains("Asha"));
        }
    }
}

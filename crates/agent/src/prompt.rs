use edubot_core::domain::program::Program;
use edubot_core::knowledge::KnowledgeBase;

use crate::llm::PromptMessage;

/// Character budget the model is asked to respect. Not enforced on the reply.
pub const REPLY_CHAR_BUDGET: usize = 500;

/// Flattens the catalogue into the plain-text block embedded in the system prompt.
pub fn knowledge_digest(knowledge: &KnowledgeBase) -> String {
    let facts = &knowledge.facts;
    let mut digest = format!("ABOUT OUR COMPANY: {}\n\nOUR PROGRAMS:", knowledge.company_name);

    for (index, program) in Program::ALL.iter().enumerate() {
        let descriptor = knowledge.program(*program);
        digest.push_str(&format!(
            "\n{}. {} {}\n   - What: {}\n   - Tools: {}\n   - Career Roles: {}\n   - Coding: {}",
            index + 1,
            descriptor.emoji,
            descriptor.name.to_uppercase(),
            descriptor.definition,
            descriptor.tools.join(", "),
            descriptor.roles.join(", "),
            descriptor.coding,
        ));
    }

    let key_facts = [
        ("Eligibility", facts.eligibility.join(", ")),
        ("Difference", facts.difference.clone()),
        ("Placement", facts.placement_support.clone()),
        ("Placement Meaning", facts.placement_meaning.clone()),
        ("Pay After Placement", facts.pay_after_placement.clone()),
        ("Registration Fee", facts.registration_fee.clone()),
        ("Refund Policy", facts.refund_policy.clone()),
        ("Class Format", facts.class_format.clone()),
        ("Missed Session", facts.missed_session.clone()),
        ("Doubt Support", facts.support.clone()),
        ("Projects", facts.projects.clone()),
        ("Salary", facts.salary_expectation.clone()),
    ];
    digest.push_str("\n\nKEY INFORMATION:");
    for (label, value) in key_facts {
        digest.push_str(&format!("\n• {label}: {value}"));
    }

    digest.push_str(&format!(
        "\n\nCONTACT INFORMATION:\n• Email: {}\n• Callback Form: {}",
        knowledge.contact.email, knowledge.contact.callback_form
    ));
    digest
}

pub fn system_prompt(
    knowledge: &KnowledgeBase,
    recipient_name: &str,
    user_message: &str,
    current_topic: Option<Program>,
) -> String {
    let context = current_topic
        .map(|program| format!("We're discussing {}.", knowledge.program(program).name))
        .unwrap_or_default();

    format!(
        r#"You are "{assistant}", a friendly and helpful career advisor at {company}.

PERSONALITY:
- Warm, professional, and genuinely helpful
- Use the person's name ({recipient_name}) naturally
- Keep responses concise and well-formatted for WhatsApp
- Use emojis sparingly (😊, 🚀, 📊, 🤖) for visual appeal
- If someone asks "are you a bot?", say: "I'm an AI assistant here to help you with career guidance! How can I assist you today?"

RESPONSE GUIDELINES:
1. FORMAT FOR WHATSAPP:
   - Use clear sections with emoji headers
   - Keep paragraphs short (2-3 lines max)
   - Use bullet points for lists
   - Leave space between sections
   - Maximum {budget} characters per message

2. ABOUT OUR KNOWLEDGE:
{digest}

3. IMPORTANT RULES:
   - If asked about courses/programs, mention both options clearly
   - If asked about contact, provide both email and form immediately
   - If unsure about something, suggest contacting our team
   - Keep responses mobile-friendly (short lines, good spacing)
   - End with a helpful question or suggestion
   - NEVER say "I don't know" - instead redirect to contact info

CONVERSATION CONTEXT: {context}

CURRENT USER: {recipient_name}
USER'S QUESTION: "{user_message}""#,
        assistant = knowledge.assistant_name,
        company = knowledge.company_name,
        budget = REPLY_CHAR_BUDGET,
        digest = knowledge_digest(knowledge),
    )
}

/// One system message plus one `"{name}: {message}"` user message.
pub fn build_messages(
    knowledge: &KnowledgeBase,
    recipient_name: &str,
    user_message: &str,
    current_topic: Option<Program>,
) -> Vec<PromptMessage> {
    vec![
        PromptMessage::system(system_prompt(knowledge, recipient_name, user_message, current_topic)),
        PromptMessage::user(format!("{recipient_name}: {user_message}")),
    ]
}

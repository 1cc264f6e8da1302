//! Static catalogue of programs, facts and FAQ entries.
//!
//! The knowledge base is loaded once at startup, either from the built-in catalogue or from a
//! TOML file with the same schema, and is shared read-only afterwards. FAQ answers are `tera`
//! templates rendered against the rest of the catalogue (see [`KnowledgeBase::render_entries`]).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use thiserror::Error;

use crate::domain::program::Program;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("could not read knowledge base `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse knowledge base `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("could not parse knowledge base: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not render answer template for keyword `{keyword}`: {source}")]
    Template { keyword: String, source: tera::Error },
    #[error("knowledge base validation failed: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub company_name: String,
    pub assistant_name: String,
    pub contact: ContactInfo,
    pub facts: FactSheet,
    pub programs: ProgramCatalog,
    /// Ordered FAQ table; earlier entries win when several keywords match.
    pub entries: Vec<KnowledgeEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub callback_form: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSheet {
    pub difference: String,
    pub eligibility: Vec<String>,
    pub projects: String,
    pub placement_support: String,
    pub placement_meaning: String,
    pub pay_after_placement: String,
    pub registration_fee: String,
    pub refund_policy: String,
    pub class_format: String,
    pub missed_session: String,
    pub support: String,
    pub salary_expectation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramCatalog {
    pub agentic_ai: ProgramDescriptor,
    pub data_analytics: ProgramDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDescriptor {
    pub name: String,
    pub emoji: String,
    pub tagline: String,
    pub definition: String,
    pub coding: String,
    pub tools: Vec<String>,
    pub roles: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub keyword: String,
    pub template: String,
}

/// A knowledge entry whose template has been rendered into its final answer text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaqAnswer {
    pub keyword: String,
    pub answer: String,
}

impl KnowledgeBase {
    /// Loads from `path` when given, otherwise returns the built-in catalogue.
    pub fn load(path: Option<&Path>) -> Result<Self, KnowledgeError> {
        let knowledge = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| KnowledgeError::ReadFile {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str::<Self>(&raw).map_err(|source| KnowledgeError::ParseFile {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Self::builtin(),
        };

        knowledge.validate()?;
        Ok(knowledge)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, KnowledgeError> {
        let knowledge = toml::from_str::<Self>(raw)?;
        knowledge.validate()?;
        Ok(knowledge)
    }

    pub fn program(&self, program: Program) -> &ProgramDescriptor {
        match program {
            Program::AgenticAi => &self.programs.agentic_ai,
            Program::DataAnalytics => &self.programs.data_analytics,
        }
    }

    pub fn validate(&self) -> Result<(), KnowledgeError> {
        if self.company_name.trim().is_empty() {
            return Err(KnowledgeError::Validation("company_name must not be empty".to_string()));
        }
        if self.assistant_name.trim().is_empty() {
            return Err(KnowledgeError::Validation(
                "assistant_name must not be empty".to_string(),
            ));
        }
        if !self.contact.email.contains('@') {
            return Err(KnowledgeError::Validation(
                "contact.email must be an email address".to_string(),
            ));
        }
        let form = self.contact.callback_form.trim();
        if !form.starts_with("http://") && !form.starts_with("https://") {
            return Err(KnowledgeError::Validation(
                "contact.callback_form must start with http:// or https://".to_string(),
            ));
        }
        if self.facts.eligibility.is_empty() {
            return Err(KnowledgeError::Validation(
                "facts.eligibility must list at least one group".to_string(),
            ));
        }

        for program in Program::ALL {
            let descriptor = self.program(program);
            if descriptor.name.trim().is_empty() {
                return Err(KnowledgeError::Validation(format!(
                    "programs.{program}.name must not be empty"
                )));
            }
            if descriptor.tools.is_empty() || descriptor.roles.is_empty() {
                return Err(KnowledgeError::Validation(format!(
                    "programs.{program} must list tools and roles"
                )));
            }
        }

        if let Some(index) = self.entries.iter().position(|entry| entry.keyword.trim().is_empty())
        {
            return Err(KnowledgeError::Validation(format!(
                "entries[{index}].keyword must not be empty"
            )));
        }

        Ok(())
    }

    /// Renders every entry template, preserving table order.
    ///
    /// Templates can reference `company_name`, `contact.*`, `facts.*`, `programs.*` and the
    /// pre-joined `eligibility_bullets` list.
    pub fn render_entries(&self) -> Result<Vec<FaqAnswer>, KnowledgeError> {
        let context = self.template_context();
        self.entries
            .iter()
            .map(|entry| {
                let answer = Tera::one_off(&entry.template, &context, false).map_err(|source| {
                    KnowledgeError::Template { keyword: entry.keyword.clone(), source }
                })?;
                Ok(FaqAnswer { keyword: entry.keyword.trim().to_lowercase(), answer })
            })
            .collect()
    }

    fn template_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("company_name", &self.company_name);
        context.insert("assistant_name", &self.assistant_name);
        context.insert("contact", &self.contact);
        context.insert("facts", &self.facts);
        context.insert("programs", &self.programs);
        context.insert("eligibility_bullets", &bullet_list(&self.facts.eligibility));
        context
    }

    pub fn builtin() -> Self {
        Self {
            company_name: "EdTech Informative".to_string(),
            assistant_name: "Edu".to_string(),
            contact: ContactInfo {
                email: "support@edtechinformative.uk".to_string(),
                callback_form: "https://docs.google.com/forms/d/e/1FAIpQLScy3uYPpWn0hYqltpYuBcefKe2jvmXFq7PUdgM0T5m3MWhHcQ/viewform?usp=dialog".to_string(),
            },
            facts: FactSheet {
                difference: "Data Analytics: Focuses on analysing historical and current data to generate insights. Agentic AI: Focuses on creating intelligent systems that act, decide, and automate tasks.".to_string(),
                eligibility: strings(&[
                    "Freshers",
                    "Working professionals",
                    "Career switchers",
                    "Non-technical and technical backgrounds",
                ]),
                projects: "✅ Yes. Both courses include industry-based projects and UK-aligned case studies to build a strong portfolio.".to_string(),
                placement_support: "🚀 Yes. We provide a 100% Placement Guarantee. We ensure every eligible learner receives end-to-end placement support until they are placed.".to_string(),
                placement_meaning: "It means: We stay with you until you secure a job. You are not left alone after course completion. Dedicated placement team works continuously on your profile.".to_string(),
                pay_after_placement: "✅ Yes. Eligible candidates can opt for Pay After Placement, allowing them to pay fees after securing employment.".to_string(),
                registration_fee: "Yes, a one-time registration fee is required to confirm enrollment and block your seat.".to_string(),
                refund_policy: "Refunds are processed as per the organisation's internal refund policy and may take 30-45 working days.".to_string(),
                class_format: "Classes are live instructor-led, and recordings are provided for revision.".to_string(),
                missed_session: "You can watch the recorded class and clarify doubts in upcoming sessions.".to_string(),
                support: "✅ Yes, you will receive dedicated mentor & doubt support throughout the course.".to_string(),
                salary_expectation: "UK (Entry-Level Data Analyst): £45,000 - £60,000 per year (Salary depends on skills, interview performance, and role.)".to_string(),
            },
            programs: ProgramCatalog {
                agentic_ai: ProgramDescriptor {
                    name: "Agentic AI".to_string(),
                    emoji: "🤖".to_string(),
                    tagline: "Build autonomous AI systems".to_string(),
                    definition: "Agentic AI focuses on building autonomous AI agents that can independently make decisions, automate workflows, and interact with systems using AI models.".to_string(),
                    coding: "Agentic AI: Introductory to intermediate coding (fully covered during training)".to_string(),
                    tools: strings(&[
                        "Python & AI APIs",
                        "Prompt Engineering",
                        "Autonomous AI Agents",
                        "Workflow Automation",
                        "Real-world AI implementations",
                    ]),
                    roles: strings(&[
                        "AI Analyst",
                        "AI Automation Specialist",
                        "Junior AI Engineer",
                        "AI Solutions Associate",
                    ]),
                },
                data_analytics: ProgramDescriptor {
                    name: "Data Analytics".to_string(),
                    emoji: "📊".to_string(),
                    tagline: "Master data-driven decisions".to_string(),
                    definition: "Data Analytics is the process of collecting, cleaning, and analysing data to help organisations make data-driven business decisions using tools like Excel, SQL, Power BI, and Python.".to_string(),
                    coding: "Data Analytics: Basic Python & SQL (taught from scratch)".to_string(),
                    tools: strings(&[
                        "Excel / Google Sheets",
                        "SQL",
                        "Power BI / Tableau",
                        "Python",
                        "Statistics & Business Analysis",
                    ]),
                    roles: strings(&[
                        "Data Analyst",
                        "Business Analyst",
                        "Reporting Analyst",
                        "Junior Data Consultant",
                    ]),
                },
            },
            entries: builtin_entries(),
        }
    }
}

fn builtin_entries() -> Vec<KnowledgeEntry> {
    [
        (
            "contact",
            "📞 *Contact Our Team*\n\nFor immediate assistance:\n\n📧 Email: {{ contact.email }}\n📝 Callback Form: {{ contact.callback_form }}\n\n*Response:* 2-4 hours on business days",
        ),
        ("email", "📧 *Email Us*\n\n{{ contact.email }}\n\nWe check emails regularly!"),
        (
            "talk to human",
            "👨‍💼 *Speak with Advisor*\n\nPerfect! Our team would love to chat:\n\n📝 Form: {{ contact.callback_form }}\n📧 Email: {{ contact.email }}\n\n*They'll contact you within 24 hours*",
        ),
        (
            "fee",
            "💰 *Fees & Payment*\n\n{{ facts.pay_after_placement }}\n\n*Registration:* {{ facts.registration_fee }}",
        ),
        (
            "placement",
            "🚀 *Placement Support*\n\n{{ facts.placement_support }}\n\n{{ facts.placement_meaning }}",
        ),
        ("eligibility", "✅ *Eligibility*\n\n*Who can join:*\n{{ eligibility_bullets }}"),
        ("salary", "💷 *Salary Expectations*\n\n{{ facts.salary_expectation }}"),
    ]
    .into_iter()
    .map(|(keyword, template)| KnowledgeEntry {
        keyword: keyword.to_string(),
        template: template.to_string(),
    })
    .collect()
}

pub fn bullet_list(items: &[String]) -> String {
    items.iter().map(|item| format!("• {item}")).collect::<Vec<_>>().join("\n")
}

pub fn numbered_list(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| format!("{}. {item}", index + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{bullet_list, numbered_list, KnowledgeBase, KnowledgeError};
    use crate::domain::program::Program;

    #[test]
    fn builtin_catalogue_is_valid() {
        let knowledge = KnowledgeBase::builtin();
        knowledge.validate().expect("builtin knowledge base should validate");
        assert_eq!(knowledge.program(Program::AgenticAi).name, "Agentic AI");
        assert_eq!(knowledge.program(Program::DataAnalytics).emoji, "📊");
    }

    #[test]
    fn rendered_entries_keep_table_order_and_fill_facts() {
        let knowledge = KnowledgeBase::builtin();
        let answers = knowledge.render_entries().expect("templates should render");

        let keywords: Vec<&str> = answers.iter().map(|answer| answer.keyword.as_str()).collect();
        assert_eq!(
            keywords,
            vec!["contact", "email", "talk to human", "fee", "placement", "eligibility", "salary"]
        );
        assert!(answers[0].answer.contains("support@edtechinformative.uk"));
        assert!(answers[0].answer.contains("viewform?usp=dialog"));
        assert!(answers[5].answer.contains("• Freshers\n• Working professionals"));
        assert!(!answers.iter().any(|answer| answer.answer.contains("{{")));
    }

    #[test]
    fn toml_round_trip_loads_from_file() {
        let knowledge = KnowledgeBase::builtin();
        let raw = toml::to_string(&knowledge).expect("serialize knowledge base");

        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("knowledge.toml");
        fs::write(&path, raw).expect("write knowledge file");

        let loaded = KnowledgeBase::load(Some(&path)).expect("load knowledge base from file");
        assert_eq!(loaded, knowledge);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("absent.toml");
        let error = KnowledgeBase::load(Some(&path)).expect_err("missing file should fail");
        assert!(matches!(error, KnowledgeError::ReadFile { .. }));
        assert!(error.to_string().contains("absent.toml"));
    }

    #[test]
    fn validation_rejects_non_url_callback_form() {
        let mut knowledge = KnowledgeBase::builtin();
        knowledge.contact.callback_form = "call us".to_string();
        let error = knowledge.validate().expect_err("callback form must be a URL");
        assert!(error.to_string().contains("contact.callback_form"));
    }

    #[test]
    fn broken_template_names_its_keyword() {
        let mut knowledge = KnowledgeBase::builtin();
        knowledge.entries[3].template = "{{ facts.unknown_field ".to_string();
        let error = knowledge.render_entries().expect_err("template should fail to render");
        assert!(matches!(error, KnowledgeError::Template { ref keyword, .. } if keyword == "fee"));
    }

    #[test]
    fn list_helpers_format_bullets_and_numbers() {
        let items = vec!["SQL".to_string(), "Python".to_string()];
        assert_eq!(bullet_list(&items), "• SQL\n• Python");
        assert_eq!(numbered_list(&items), "1. SQL\n2. Python");
    }
}

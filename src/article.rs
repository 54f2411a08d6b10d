//! Turning a topic into prompts, and generated paragraphs into an article.

use crate::types::Prompt;
use crate::Error;

pub const TOPIC_PLACEHOLDER: &str = "{topic}";
pub const DEFAULT_TEMPLATE: &str = "Write an informative paragraph about: {topic}";
pub const MAX_PARAGRAPHS: usize = 20;

/// What to write: one completion request per paragraph.
#[derive(Debug, Clone)]
pub struct ArticlePlan {
    topic: String,
    paragraphs: usize,
    template: String,
    heading: bool,
}

impl ArticlePlan {
    /// A single-paragraph plan without a heading.
    pub fn new(topic: impl Into<String>) -> Result<Self, Error> {
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(Error::prompt("topic must not be empty"));
        }

        Ok(Self {
            topic,
            paragraphs: 1,
            template: DEFAULT_TEMPLATE.to_string(),
            heading: false,
        })
    }

    pub fn with_paragraphs(mut self, paragraphs: usize) -> Result<Self, Error> {
        if !(1..=MAX_PARAGRAPHS).contains(&paragraphs) {
            return Err(Error::config(format!(
                "paragraph count must be between 1 and {MAX_PARAGRAPHS}, got {paragraphs}"
            )));
        }
        self.paragraphs = paragraphs;
        Ok(self)
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Result<Self, Error> {
        let template = template.into();
        if !template.contains(TOPIC_PLACEHOLDER) {
            return Err(Error::config(format!(
                "prompt template must contain {TOPIC_PLACEHOLDER}"
            )));
        }
        self.template = template;
        Ok(self)
    }

    pub fn with_heading(mut self, heading: bool) -> Self {
        self.heading = heading;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn paragraphs(&self) -> usize {
        self.paragraphs
    }

    /// The prompt sent for every paragraph.
    pub fn prompt(&self) -> Prompt {
        Prompt::user(self.template.replace(TOPIC_PLACEHOLDER, &self.topic))
    }

    /// An empty article carrying the heading this plan asks for.
    pub fn start_article(&self) -> Article {
        Article {
            title: self.heading.then(|| title_case(&self.topic)),
            paragraphs: Vec::with_capacity(self.paragraphs),
        }
    }
}

/// A generated article.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub title: Option<String>,
    pub paragraphs: Vec<String>,
}

impl Article {
    pub fn push_paragraph(&mut self, text: &str) {
        self.paragraphs.push(text.trim().to_string());
    }

    /// Markdown text: optional `# Title`, then paragraphs separated by blank lines.
    pub fn render(&self) -> String {
        let mut blocks = Vec::with_capacity(self.paragraphs.len() + 1);
        if let Some(title) = &self.title {
            blocks.push(format!("# {title}"));
        }
        blocks.extend(self.paragraphs.iter().cloned());
        blocks.join("\n\n")
    }
}

/// Capitalise the first letter of each word and lowercase the rest.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

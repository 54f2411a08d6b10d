//! CLI definitions and the end-to-end command.

use crate::article::{ArticlePlan, DEFAULT_TEMPLATE};
use crate::config::{self, Overrides, Settings};
use crate::generator::{BlogGenerator, RunReport};
use crate::output::{self, DEFAULT_OUTPUT};
use crate::Error;
use clap::{ArgAction, Parser};
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

const AFTER_HELP: &str = "\
EXAMPLES:
  blogwright \"sourdough bread\"                 One paragraph to generated_article.md
  blogwright \"sourdough bread\" -n 4 --heading  Four paragraphs under a title
  echo \"green tea\" | blogwright -o tea.md -q   Topic from stdin, no echo
  blogwright --env-file ~/.config/openai.env   Read OPENAI_API_KEY from another file

ENVIRONMENT:
  OPENAI_API_KEY   API key (required; usually set in .env)
  OPENAI_MODEL     Model name (default: gpt-4o-mini)
  OPENAI_BASE_URL  API base URL (default: https://api.openai.com/v1)
  RUST_LOG         Log filter, overrides -v/-q (may also be set in .env)
";

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Generate a blog article about a topic with the OpenAI API",
    after_help = AFTER_HELP
)]
pub struct Args {
    /// Topic of the article (read from standard input when omitted)
    pub topic: Option<String>,

    /// Number of paragraphs; each one is a separate API request
    #[arg(short = 'n', long, default_value_t = 1)]
    pub paragraphs: usize,

    /// Output file (".md" is appended when there is no extension)
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Env file holding OPENAI_API_KEY (default: nearest .env)
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// API base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Sampling temperature (0-2)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens per paragraph
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Nucleus sampling probability (0-1)
    #[arg(long)]
    pub top_p: Option<f32>,

    /// Frequency penalty (-2 to 2)
    #[arg(long, allow_negative_numbers = true)]
    pub frequency_penalty: Option<f32>,

    /// Presence penalty (-2 to 2)
    #[arg(long, allow_negative_numbers = true)]
    pub presence_penalty: Option<f32>,

    /// Prompt template; {topic} is replaced with the topic
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Start the article with a "# Title" heading
    #[arg(long)]
    pub heading: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Increase log verbosity (use twice for trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors; do not echo the article
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Log filter directives based on -v/-q flags.
    pub fn log_directives(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn,blogwright=info",
                1 => "warn,blogwright=debug",
                _ => "info,blogwright=trace",
            }
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            frequency_penalty: self.frequency_penalty,
            presence_penalty: self.presence_penalty,
            timeout: self.timeout.map(Duration::from_secs),
        }
    }

    pub fn plan(&self, topic: &str) -> Result<ArticlePlan, Error> {
        Ok(ArticlePlan::new(topic)?
            .with_paragraphs(self.paragraphs)?
            .with_template(self.template.as_str())?
            .with_heading(self.heading))
    }
}

/// Read the topic from `input`, prompting on stderr when a person is typing.
pub fn read_topic<R: BufRead>(mut input: R, interactive: bool) -> Result<String, Error> {
    if interactive {
        eprint!("Topic: ");
        std::io::stderr().flush().ok();
    }

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| Error::prompt(format!("cannot read topic from standard input: {e}")))?;

    let topic = line.trim();
    if topic.is_empty() {
        return Err(Error::prompt(
            "no topic given; pass it as an argument or on standard input",
        ));
    }
    Ok(topic.to_string())
}

/// Load the env file, then generate the article and write it.
pub async fn run(args: &Args) -> Result<RunReport, Error> {
    config::load_env_file(args.env_file.as_deref())?;
    execute(args).await
}

/// Generate the article and write it, assuming the env file is already loaded.
pub async fn execute(args: &Args) -> Result<RunReport, Error> {
    // the key is checked before anything else happens
    let settings = Settings::from_env()?.apply(args.overrides())?;

    let topic = match &args.topic {
        Some(topic) => topic.clone(),
        None => {
            let stdin = std::io::stdin();
            let interactive = stdin.is_terminal();
            read_topic(stdin.lock(), interactive)?
        }
    };
    let plan = args.plan(&topic)?;
    let output = output::resolve_output_path(&args.output)?;

    let generator = BlogGenerator::from_settings(&settings)?;
    generator.run(&plan, &output).await
}

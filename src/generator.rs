//! The article pipeline: prompt, complete, write.

use crate::article::{Article, ArticlePlan};
use crate::config::Settings;
use crate::output;
use crate::provider::CompletionProvider;
use crate::providers::OpenAIProvider;
use crate::response::GenerationResult;
use crate::types::{GenerationRequest, Prompt, SamplingParams, Usage};
use crate::Error;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub path: PathBuf,
    pub paragraphs: usize,
    pub bytes: usize,
    pub usage: Usage,
    pub article: String,
}

/// Generates articles with a completion provider.
pub struct BlogGenerator<P> {
    provider: P,
    model: String,
    sampling: SamplingParams,
}

impl BlogGenerator<OpenAIProvider> {
    /// Wire the OpenAI provider from validated settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        settings.validate()?;
        let provider = OpenAIProvider::with_options(
            settings.api_key().to_string(),
            settings.base_url.clone(),
            settings.timeout,
        )?;
        Ok(Self::with_provider(provider, settings.model.clone(), settings.sampling))
    }
}

impl<P: CompletionProvider> BlogGenerator<P> {
    pub fn with_provider(provider: P, model: impl Into<String>, sampling: SamplingParams) -> Self {
        Self {
            provider,
            model: model.into(),
            sampling,
        }
    }

    /// One completion request for one prompt.
    pub async fn generate_text(&self, prompt: impl Into<Prompt>) -> Result<GenerationResult, Error> {
        let request = GenerationRequest::new(self.model.as_str(), prompt)?.with_sampling(self.sampling);
        let result = self.provider.generate(&request).await?.buffer().await?;

        if result.is_truncated() {
            warn!(
                max_tokens = self.sampling.max_tokens,
                "completion stopped at the token limit; the text may end mid-sentence"
            );
        }
        Ok(result)
    }

    /// Generate every paragraph of the plan, one request after another.
    pub async fn generate_article(&self, plan: &ArticlePlan) -> Result<(Article, Usage), Error> {
        let total = plan.paragraphs();
        let mut article = plan.start_article();
        let mut usage = Usage::default();

        info!(topic = plan.topic(), paragraphs = total, model = %self.model, "generating article");
        for index in 1..=total {
            info!("generating paragraph {index}/{total}");
            let result = self.generate_text(plan.prompt()).await?;
            usage += result.usage;
            article.push_paragraph(&result.text);
        }

        Ok((article, usage))
    }

    /// Generate the whole article, then write it to `output`. Nothing is
    /// written unless every request succeeded.
    pub async fn run(&self, plan: &ArticlePlan, output: &Path) -> Result<RunReport, Error> {
        let (article, usage) = self.generate_article(plan).await?;
        let text = article.render();

        output::write_article(output, &text)?;
        info!(
            path = %output.display(),
            total_tokens = usage.total_tokens,
            "article saved"
        );

        Ok(RunReport {
            path: output.to_path_buf(),
            paragraphs: article.paragraphs.len(),
            bytes: text.len(),
            usage,
            article: text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Response, StreamEvent};
    use crate::types::FinishReason;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays canned replies in order and records the prompts it saw.
    struct ScriptedProvider {
        replies: Mutex<Vec<Result<&'static str, Error>>>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(mut replies: Vec<Result<&'static str, Error>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn generate(&self, request: &GenerationRequest) -> Result<Response, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts
                .lock()
                .unwrap()
                .push(request.messages[0].content.clone());
            let reply = self.replies.lock().unwrap().pop().expect("unexpected request")?;
            let events = vec![
                Ok(StreamEvent::delta(reply)),
                Ok(StreamEvent::Finished {
                    finish_reason: FinishReason::Stop,
                }),
                Ok(StreamEvent::Usage {
                    usage: Usage {
                        prompt_tokens: 10,
                        completion_tokens: 20,
                        total_tokens: 30,
                    },
                }),
                Ok(StreamEvent::Done),
            ];
            Ok(Response::from_stream(futures_util::stream::iter(events)))
        }
    }

    fn generator(replies: Vec<Result<&'static str, Error>>) -> BlogGenerator<ScriptedProvider> {
        BlogGenerator::with_provider(
            ScriptedProvider::new(replies),
            "gpt-4o-mini",
            SamplingParams::default(),
        )
    }

    #[tokio::test]
    async fn test_single_paragraph_run() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tea.md");
        let generator = generator(vec![Ok("Tea is a drink.")]);
        let plan = ArticlePlan::new("tea").unwrap();

        let report = generator.run(&plan, &output).await.unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Tea is a drink.");
        assert_eq!(report.paragraphs, 1);
        assert_eq!(report.usage.total_tokens, 30);
        assert_eq!(
            generator.provider.prompts.lock().unwrap()[0],
            "Write an informative paragraph about: tea"
        );
    }

    #[tokio::test]
    async fn test_paragraphs_are_sequential_requests() {
        let generator = generator(vec![Ok("One."), Ok("Two."), Ok("Three.")]);
        let plan = ArticlePlan::new("tea")
            .unwrap()
            .with_paragraphs(3)
            .unwrap()
            .with_heading(true);

        let (article, usage) = generator.generate_article(&plan).await.unwrap();
        assert_eq!(generator.provider.calls.load(Ordering::SeqCst), 3);
        assert_eq!(article.render(), "# Tea\n\nOne.\n\nTwo.\n\nThree.");
        assert_eq!(usage.total_tokens, 90);
    }

    #[tokio::test]
    async fn test_failure_stops_run_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tea.md");
        let generator = generator(vec![Ok("One."), Err(Error::rate_limit("slow down"))]);
        let plan = ArticlePlan::new("tea").unwrap().with_paragraphs(3).unwrap();

        let err = generator.run(&plan, &output).await.unwrap_err();
        assert!(matches!(err, Error::RateLimit(_)));
        assert_eq!(generator.provider.calls.load(Ordering::SeqCst), 2);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_empty_prompt_never_reaches_provider() {
        let generator = generator(vec![]);
        let err = generator.generate_text("   ").await.unwrap_err();
        assert!(matches!(err, Error::Prompt(_)));
        assert_eq!(generator.provider.calls.load(Ordering::SeqCst), 0);
    }
}

use crate::error::AppResult;

pub mod gemini;

pub use gemini::GeminiSummarizer;

/// External text-generation backend used to summarize articles
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    /// Returns the raw generated text for `prompt`
    async fn summarize(&self, prompt: &str) -> AppResult<String>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Journalism prompt asking for a clear, objective summary in Portuguese
pub fn build_prompt(title: &str, body: &str) -> String {
    format!(
        "Você é um assistente de jornalismo. Resuma a notícia abaixo de forma clara, \
         objetiva e em português:\n<noticia>\nTítulo: {}\nConteúdo: {}\n</noticia>",
        title, body
    )
}

pub mod anthropic_llm;
pub mod openai_llm;
pub mod store;

pub use anthropic_llm::AnthropicTextAdapter;
pub use openai_llm::OpenAiTextAdapter;
pub use store::PgReportStore;

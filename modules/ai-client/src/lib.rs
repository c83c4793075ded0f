pub mod openai;
pub mod perplexity;
pub mod traits;
pub(crate) mod types;

pub use openai::OpenAiClient;
pub use perplexity::PerplexityClient;
pub use traits::{ArticleSearch, Summarize};

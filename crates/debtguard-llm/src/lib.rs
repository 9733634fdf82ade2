pub mod gemini;
pub mod invoker;
pub mod types;

pub mod mock;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use invoker::{Invoker, RetryPolicy, NO_RESPONSE_SENTINEL};
pub use mock::{MockProvider, MockResponse};

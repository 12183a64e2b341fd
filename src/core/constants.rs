pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const SAMPLING_TEMPERATURE: f32 = 0.7;

pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";

pub const GREETING: &str = "Hi! How can I help you today?";
pub const EMPTY_REPLY_FALLBACK: &str = "Hmm, I couldn't understand that. Try again?";
pub const MISSING_API_KEY_MESSAGE: &str =
    "OpenAI API key is not set. Please configure it in environment variables.";
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Failed to reach OpenAI. Please check your connection and API key.";
pub const GENERIC_API_ERROR_MESSAGE: &str = "Error connecting to OpenAI API";

pub mod error;
pub mod prompts;
pub mod task;
pub mod traits;
pub mod types;

pub use error::{InferenceError, OcrError};
pub use prompts::{follow_up_prompt, OCR_PROMPT};
pub use task::{run_bounded, InflightSlot};
pub use traits::{ImageAttachment, LlmProvider, LlmRequest, LlmResponse};
pub use types::{ChatRole, ChatTurn, HistoryEntry, OcrRecord, UploadedImage, ACCEPTED_EXTENSIONS};

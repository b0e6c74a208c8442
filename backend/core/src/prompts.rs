//! Prompt text sent to the vision model.

/// Instruction attached to every OCR request.
pub const OCR_PROMPT: &str = "Act as an OCR assistant. Analyze the provided image and:
1. Recognize all visible text in the image as accurately as possible.
2. Maintain the original structure and formatting of the text and return the response in markdown format.
3. If any words or phrases are unclear, indicate this with [unclear] in your transcription.
Provide only the transcription without any additional comments.";

/// Build the follow-up prompt: the full transcription followed by the question.
pub fn follow_up_prompt(ocr_text: &str, question: &str) -> String {
    format!("Based on this extracted text:\n{ocr_text}\n\nQuestion: {question}")
}

/// Instruction texts for the three study requests.
pub struct PromptBuilder;

/// Fixed text that precedes the embedded source material in a quiz prompt.
pub fn quiz_prompt_prefix(question_count: usize) -> String {
    format!(
        "Based on the following text, generate a {question_count}-question multiple choice quiz. Return JSON.\n\nText: "
    )
}

impl PromptBuilder {
    pub fn document_structure(min_segments: usize, max_segments: usize) -> String {
        format!(
            "Analyze this document. 1: Provide academic citations (APA7, MLA9, Chicago). 2: Determine the total number of pages in the document. 3: Divide the entire document into {min_segments}-{max_segments} logical parts/segments for reading. For each part, provide the starting page number and ending page number. Return as JSON."
        )
    }

    pub fn segment_extraction(part_title: &str, part_description: &str) -> String {
        format!(
            "Extract and return the FULL RAW TEXT for the following section: \"{part_title} ({part_description})\". Do not summarize. Return only the verbatim text found in those pages/chapters."
        )
    }

    /// `source_text` must already be cut to the caller's character budget.
    pub fn quiz(source_text: &str, question_count: usize) -> String {
        let mut prompt = quiz_prompt_prefix(question_count);
        prompt.push_str(source_text);
        prompt
    }
}

// src/prompt.rs

//! Instruction templates for the generation service.
//!
//! Pure string building: inputs are embedded verbatim, including whatever
//! the user typed as a topic or reference text. Nothing here talks to the
//! network or touches session state.

/// Builds the examiner instruction for a new interview question.
///
/// When reference text is supplied it is embedded as authoritative context
/// and the model is told to prefer it over its own background knowledge.
pub fn build_question_prompt(topic: &str, grounding: Option<&str>) -> String {
    let mut prompt = format!(
        "You are an examiner on a school principal certification panel. \
         Write one situational oral-exam question on the topic of \"{}\".\n\
         Requirements:\n\
         - Open with a short, concrete scenario (2-3 sentences), then ask one direct question.\n\
         - Keep the whole question under 150 words.\n\
         - Do not include any preamble, greeting, or commentary. Output the question only.",
        topic
    );

    if let Some(reference) = grounding.filter(|g| !g.trim().is_empty()) {
        prompt.push_str(&format!(
            "\n\nBase the scenario on the following reference material. Treat it as \
             authoritative and prefer it over your own background knowledge:\n{}",
            reference
        ));
    }

    prompt
}

/// Builds the evaluation instruction for a submitted answer.
///
/// The score marker line is mandatory so the history recorder can extract
/// a numeric score from the free-text reply.
pub fn build_feedback_prompt(question: &str, answer: &str) -> String {
    format!(
        "You are an examiner on a school principal certification panel. \
         Evaluate the candidate's spoken answer to the exam question below.\n\n\
         Question:\n{}\n\n\
         Candidate's answer:\n{}\n\n\
         Give feedback in this structure:\n\
         1. Strengths (2-3 bullet points)\n\
         2. Weaknesses (2-3 bullet points)\n\
         3. One concrete suggestion for improvement\n\
         End with exactly one line of the form \"Score: N/25\" where N is an \
         integer from 0 to 25. Do not include any preamble.",
        question, answer
    )
}

/// Builds the instruction for a short answer-outline hint.
pub fn build_structure_prompt(question: &str) -> String {
    format!(
        "Suggest a 3-4 point outline a candidate could follow when answering \
         this school principal oral-exam question. Keep it under 80 words, \
         one line per point, no preamble.\n\nQuestion:\n{}",
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_prompt_embeds_topic_verbatim() {
        let prompt = build_question_prompt("Leadership vision", None);
        assert!(prompt.contains("Leadership vision"));
        assert!(!prompt.contains("reference material"));
    }

    #[test]
    fn question_prompt_embeds_grounding_verbatim() {
        let grounding = "The district rolled out a 1:1 tablet program in 2024.";
        let prompt = build_question_prompt("Digital learning", Some(grounding));
        assert!(prompt.contains("Digital learning"));
        assert!(prompt.contains(grounding));
        assert!(prompt.contains("authoritative"));
    }

    #[test]
    fn blank_grounding_is_treated_as_absent() {
        let prompt = build_question_prompt("Crisis management", Some("   "));
        assert!(!prompt.contains("reference material"));
    }

    #[test]
    fn feedback_prompt_embeds_question_and_answer() {
        let prompt = build_feedback_prompt("What would you do?", "I would convene the staff.");
        assert!(prompt.contains("What would you do?"));
        assert!(prompt.contains("I would convene the staff."));
        assert!(prompt.contains("Score: N/25"));
    }

    #[test]
    fn structure_prompt_embeds_question() {
        let prompt = build_structure_prompt("How do you build community trust?");
        assert!(prompt.contains("How do you build community trust?"));
    }
}

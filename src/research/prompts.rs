//! Prompt templates for the planning, summarizing and writing stages.

use crate::types::ResearchResult;
use std::fmt::Write;

/// Shared preamble: the role and the user's question
fn research_preamble(question: &str) -> String {
    format!(
        r#"You are a research planner.

You are working on a project that aims to answer user's questions
using sources found online.

Your answer MUST be technical, using up to date information.
Cite facts, data and specific information.

Here's the user input
<USER_INPUT>
{question}
</USER_INPUT>
"#
    )
}

/// Ask for `min`-`max` search queries as `{"queries": [...]}`.
pub fn build_queries(question: &str, min: usize, max: usize) -> String {
    format!(
        r#"{preamble}
Your first objective is to build a list of queries
that will be used to find answers to the user's question.

Answer with anything between {min}-{max} queries.

IMPORTANT: You MUST respond with ONLY a valid JSON object in this exact format:
{{
    "queries": ["query1", "query2", "query3"]
}}

Do NOT include any other text, explanation, or formatting. Just the JSON object.
"#,
        preamble = research_preamble(question),
    )
}

/// Summarize one fetched page with respect to the question.
pub fn summarize_source(question: &str, query: &str, content: &str) -> String {
    format!(
        r#"{preamble}
Your objective here is to analyze the web search results and make a synthesis of it,
emphasizing only what is relevant to the user's question.

After your work, another agent will use the synthesis to build a final response to the user, so
make sure the synthesis contains only useful information.
Be concise and clear.

The results were found with the search query: {query}

Here's the web search results:
<SEARCH_RESULTS>
{content}
</SEARCH_RESULTS>
"#,
        preamble = research_preamble(question),
    )
}

/// Write the final cited answer from the formatted source block.
pub fn build_final_response(question: &str, sources: &str) -> String {
    format!(
        r#"{preamble}
Your objective here is to develop a final response to the user using
the reports made during the web search, with their synthesis.

The response should contain something between 500 - 800 words.

Here's the web search results:
<SEARCH_RESULTS>
{sources}
</SEARCH_RESULTS>

You must add reference citations (with the number of the citation, example: [1]) for the
articles you used in each paragraph of your answer.
"#,
        preamble = research_preamble(question),
    )
}

/// Number every result from 1 in slice order for the writer prompt.
pub fn format_sources(results: &[ResearchResult]) -> String {
    let mut formatted = String::new();
    for (i, result) in results.iter().enumerate() {
        // Writing to a String cannot fail
        let _ = write!(
            formatted,
            "[{}]\n\nTitle: {}\nURL: {}\nContent: {}\n================\n\n",
            i + 1,
            result.display_title(),
            result.display_url(),
            result.summary.as_deref().unwrap_or_default(),
        );
    }
    formatted
}

/// One `[i] - [title](url)` line per result, numbered like [`format_sources`].
pub fn format_references(results: &[ResearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "[{}] - [{}]({})",
                i + 1,
                result.display_title(),
                result.display_url()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Prompt building for batched pairwise comparisons
//!
//! Level 3 - The prompt lists every pair of the batch, names the role, and
//! pins the answer format to a JSON array of 1/2 verdicts so the verdict
//! parser can find it.

use std::fmt::Write;

use bracket_core::Pair;

/// Build the comparison prompt for one batch
pub fn build_prompt(role: &str, pairs: &[Pair]) -> String {
    let mut prompt = format!(
        "Compare these pairs of candidates for a {role} role. For each pair decide \
         which candidate is the stronger fit.\n\n"
    );

    for (i, pair) in pairs.iter().enumerate() {
        // Writing to a String cannot fail
        let _ = write!(
            prompt,
            "Pair {}:\nCandidate 1: {} - {}\nCandidate 2: {} - {}\n\n",
            i + 1,
            pair.first.name,
            pair.first.description,
            pair.second.name,
            pair.second.description,
        );
    }

    let _ = write!(
        prompt,
        "Answer with only a JSON array of {count} integers, one per pair in order: \
         1 if candidate 1 wins, 2 if candidate 2 wins.\n\
         Example format for {count} pairs: {example}",
        count = pairs.len(),
        example = example_answer(pairs.len()),
    );

    prompt
}

/// Alternating `[1,2,1,...]` of the given length
fn example_answer(count: usize) -> String {
    let entries: Vec<&str> = (0..count)
        .map(|i| if i % 2 == 0 { "1" } else { "2" })
        .collect();
    format!("[{}]", entries.join(","))
}

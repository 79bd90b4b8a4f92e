//! 讲解提示词

use crate::visualizer::Step;

/// 讲解失败时显示的固定文案
pub const FALLBACK_NARRATION: &str =
    "AI narration temporarily unavailable. This step shows the execution of the highlighted code line.";

/// 为当前步骤构造导师式提示词；position 为 0-based 游标
pub fn build_step_prompt(step: &Step, position: usize, total: usize) -> String {
    let variables =
        serde_json::to_string(&step.variables).unwrap_or_else(|_| "{}".to_string());
    format!(
        "As an AI programming tutor, explain this code execution step in simple, educational terms:

Code line: {line}
Step: {current} of {total}
Visualization type: {category}
Variables: {variables}

Focus on:
1. What's happening in this specific step
2. Why this step is important
3. Common mistakes beginners make here
4. Memory/execution details if relevant

Keep it conversational and beginner-friendly (2-3 sentences max).",
        line = step.highlighted_text,
        current = position + 1,
        category = step.category,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::{classify, synthesize};

    #[test]
    fn test_prompt_embeds_step_details() {
        let src = "x = 5\ny = 'hello'";
        let steps = synthesize(src, classify(src));
        let prompt = build_step_prompt(&steps[1], 1, steps.len());
        assert!(prompt.contains("Code line: y = 'hello'"));
        assert!(prompt.contains("Step: 2 of 2"));
        assert!(prompt.contains("Visualization type: variables"));
        assert!(prompt.contains(r#"Variables: {"y":"hello"}"#));
    }

    #[test]
    fn test_prompt_with_empty_variables() {
        let steps = synthesize("import os", classify("import os"));
        let prompt = build_step_prompt(&steps[0], 0, 1);
        assert!(prompt.contains("Variables: {}"));
        assert!(prompt.contains("Visualization type: modules"));
    }
}

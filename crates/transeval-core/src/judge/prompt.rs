use crate::model::Record;

pub(crate) const SYSTEM_PROMPT: &str = "You are a bilingual Thai-English translation evaluator. \
Your job is to evaluate the quality of a machine-generated English translation \
based on the original Thai sentence and a correct human reference translation.";

pub(crate) fn build_prompt(record: &Record, prediction: &str) -> String {
    let elapsed = record
        .elapsed_seconds
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".into());
    format!(
        "Evaluate the following translation:\n\n\
         Thai (source):\n{}\n\n\
         Ground Truth (reference translation):\n{}\n\n\
         Predicted Translation (model output):\n{}\n\n\
         Time taken: {} seconds\n\n\
         Instructions:\n\
         1. Compare the model prediction with the ground truth.\n\
         2. Assign a score between 0 (completely wrong) and 1 (perfect match), allowing intermediate values like 0.6, 0.85, etc.\n\
         3. Consider meaning preservation, fluency, and correctness of terminology.\n\
         4. Return your evaluation in this JSON format:\n\n\
         ```json\n\
         {{\n  \"score\": <float between 0 and 1>,\n  \"explanation\": \"<brief explanation>\"\n}}\n\
         ```",
        record.source_text(),
        record.reference_text(),
        prediction,
        elapsed
    )
}

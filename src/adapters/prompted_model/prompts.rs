// Prompt templates for the three selection operations

/// Map prompt: nominate labels from one chunk, or `-1`
pub fn map_prompt(category: &str, chunk: &str) -> String {
    format!(
        r#"You are a helpful assistant that aids in extracting potential hot clip segments from video scripts based on the characteristics of {category} content.
When analyzing the transcript, please consider the following format:

[0] First segment of the video (0-60 seconds)
[1] Second segment of the video (60-120 seconds)
[2] Third segment of the video (120-180 seconds)
...and so on.

Based on the transcript of the video, please provide TWO segment numbers that you think are potential hot clip segments.
You should only extract the '[number]' segments included in the INPUT text.
If you cannot find any potential hot clip segments, please return '-1'.
Answer with comma-separated numbers only.

Example:

INPUT
[0] text
[1] text(if you select this segment)
[2] text
[3] text(if you select this segment)

OUTPUT
1,3
----
INPUT
{chunk}

OUTPUT
"#
    )
}

/// Reduce prompt: pick the `target_count` best labels from candidate text
pub fn reduce_prompt(category: &str, candidates_text: &str, target_count: usize) -> String {
    format!(
        r#"You are a helpful assistant that aids in extracting potential hot clip segments from video scripts based on the characteristics of {category} content.
INPUT text is a concatenation of the selected segments from the previous MAP step.
Please extract the {target_count} most important and interesting parts from the INPUT text.
Answer with the '[number]' labels of those parts as comma-separated numbers only.

Example:

INPUT
[0] text
[1] text
[2] text
[3] text
[4] text
[5] text
[6] text

OUTPUT
2,3,4,5,6

INPUT
{candidates_text}

OUTPUT
"#
    )
}

/// Title prompt: one short title for a segment, no explanation
pub fn title_prompt(category: &str, segment_text: &str) -> String {
    format!(
        r#"You are a helpful assistant that writes titles for short clips cut from {category} videos.
Write one short, catchy title (at most ten words) for the clip whose transcript is given as INPUT.
Reply with the title only, without quotes or explanation.

INPUT
{segment_text}

OUTPUT
"#
    )
}

//! Turn free-form model output into a list of insights.

/// Returned for an empty model response.
pub const EMPTY_RESPONSE_INSIGHT: &str = "AI analysis unavailable at this time.";

/// Most insights kept from one response.
pub const MAX_PARSED_INSIGHTS: usize = 6;

/// Longest excerpt used when no line qualifies as an insight.
const EXCERPT_CHARS: usize = 200;

const BULLETS: [char; 3] = ['•', '-', '*'];

/// Extract insights from a model response.
///
/// Bulleted lines (`•`, `-`, `*`) longer than 10 characters once the bullet is
/// stripped are kept, as are un-bulleted lines longer than 20 characters that
/// are not markdown headings. If nothing qualifies, the first 200 characters
/// become a single insight.
///
/// ```
/// use foodbridge_core::analytics::insights::parse_model_response;
///
/// let text = "## Findings\n- Claims doubled on weekends\n* ok\n";
/// assert_eq!(parse_model_response(text), vec!["Claims doubled on weekends"]);
/// ```
#[must_use]
pub fn parse_model_response(content: &str) -> Vec<String> {
    if content.is_empty() {
        return vec![EMPTY_RESPONSE_INSIGHT.to_owned()];
    }

    let mut insights: Vec<String> = content
        .trim()
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            if line.starts_with(BULLETS) {
                let text = line
                    .trim_start_matches(|c: char| BULLETS.contains(&c) || c == ' ')
                    .trim();
                (text.chars().count() > 10).then(|| text.to_owned())
            } else if line.chars().count() > 20 && !line.starts_with('#') {
                Some(line.to_owned())
            } else {
                None
            }
        })
        .collect();

    if insights.is_empty() {
        let excerpt: String = content.chars().take(EXCERPT_CHARS).collect();
        if content.chars().count() > EXCERPT_CHARS {
            insights.push(format!("{excerpt}..."));
        } else {
            insights.push(excerpt);
        }
    }

    insights.truncate(MAX_PARSED_INSIGHTS);
    insights
}

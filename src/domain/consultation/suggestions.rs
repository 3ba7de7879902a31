//! Smart-reply prompt construction and output sanitising.

/// Replies offered when the gateway output is unusable.
pub const DEFAULT_SUGGESTIONS: [&str; 3] = ["Yes", "No", "Not sure"];

/// Fewer tokens than this falls back to the defaults.
pub const MIN_SUGGESTIONS: usize = 2;

/// Extra tokens beyond this are dropped.
pub const MAX_SUGGESTIONS: usize = 4;

const STRIPPED_CHARS: &[char] = &[
    '\n', '\r', '"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{300C}', '\u{300D}',
];

const SEPARATORS: &[char] = &['|', '｜'];

/// Instruction asking for three short likely answers to `question`.
pub fn suggestion_prompt(question: &str) -> String {
    format!(
        "Task: a traditional Chinese medicine consultation.\n\
         The physician just asked: \"{question}\"\n\n\
         Predict the 3 most likely short answers from the patient (at most 6 words each).\n\
         Rules:\n\
         1. Output the 3 answers directly, separated by a vertical bar \"|\".\n\
         2. Do not output any explanation, numbering or prefix.\n\
         3. For a yes/no question, output: Yes|No|Not sure\n\n\
         Good output: Sleeping badly|So-so|Sleeping well\n\
         Bad output: Option 1|Option 2|Option 3"
    )
}

/// The fallback triple as owned strings.
pub fn default_suggestions() -> Vec<String> {
    DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

/// Turns raw gateway output into 2 to 4 clean reply labels.
///
/// Newlines and quote characters are removed, the text is split on `|` or
/// `｜`, and blank tokens are dropped. Too few tokens yields the defaults.
pub fn sanitize_suggestions(raw: &str) -> Vec<String> {
    let cleaned: String = raw.trim().chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();

    let options: Vec<String> = cleaned
        .split(SEPARATORS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect();

    if options.len() < MIN_SUGGESTIONS {
        return default_suggestions();
    }
    options
}

/// Formats an error and its cause chain into a vector of display lines.
pub fn format_error_lines(context: &str, error: &anyhow::Error) -> Vec<String> {
    let mut lines = vec![context.to_string()];
    lines.extend(error.to_string().lines().map(String::from));
    for cause in error.chain().skip(1) {
        lines.extend(cause.to_string().lines().map(|line| format!("  {line}")));
    }
    lines
}

//! File naming for published articles.

/// Characters that are not allowed in a published file name.
pub const ILLEGAL_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Replace every illegal character with `_`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// File name of the published page for a title.
///
/// ```
/// use inkpipe_publish::naming::article_filename;
///
/// assert_eq!(article_filename("大纲:测试?"), "大纲_测试_.html");
/// ```
pub fn article_filename(title: &str) -> String {
    format!("{}.html", sanitize_title(title))
}

/// Last path component of a requested file name, accepting both separators.
///
/// Returns `None` when nothing usable remains (empty, `.` or `..`).
pub fn basename(filename: &str) -> Option<&str> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_filename() {
        assert_eq!(article_filename("大纲:测试?"), "大纲_测试_.html");
        assert_eq!(
            article_filename("Why we \"please\" everyone"),
            "Why we _please_ everyone.html"
        );
    }

    #[test]
    fn test_sanitize_is_total() {
        let title = "a\\b/c:d*e?f\"g<h>i|j";
        let clean = sanitize_title(title);
        assert_eq!(clean, "a_b_c_d_e_f_g_h_i_j");
        assert!(!clean.contains(ILLEGAL_CHARS));
    }

    #[test]
    fn test_sanitize_keeps_other_text() {
        assert_eq!(sanitize_title("理解‘聚光灯效应’"), "理解‘聚光灯效应’");
    }

    #[test]
    fn test_basename_strips_directories() {
        assert_eq!(basename("output/post.html"), Some("post.html"));
        assert_eq!(basename("../../etc/passwd"), Some("passwd"));
        assert_eq!(basename("..\\secret.html"), Some("secret.html"));
        assert_eq!(basename("post.html"), Some("post.html"));
    }

    #[test]
    fn test_basename_rejects_empty() {
        assert_eq!(basename("docs/"), None);
        assert_eq!(basename(".."), None);
        assert_eq!(basename(""), None);
    }
}

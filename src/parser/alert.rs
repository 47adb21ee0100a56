/// The kind of a GFM alert block quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    /// Useful information that users should know, even when skimming.
    Note,
    /// Helpful advice for doing things better or more easily.
    Tip,
    /// Key information users need to know to achieve their goal.
    Important,
    /// Urgent info that needs immediate attention to avoid problems.
    Warning,
    /// Advises about risks or negative outcomes of certain actions.
    Caution,
}

impl AlertType {
    /// The CSS class suffix used when rendering the block quote.
    pub(crate) fn css_class(&self) -> &'static str {
        match self {
            AlertType::Note => "markdown-alert-note",
            AlertType::Tip => "markdown-alert-tip",
            AlertType::Important => "markdown-alert-important",
            AlertType::Warning => "markdown-alert-warning",
            AlertType::Caution => "markdown-alert-caution",
        }
    }
}

/// Recognizes an alert marker line.  The keyword is case-sensitive and
/// nothing else may follow it on the line.
pub(crate) fn detect_alert(line: &str) -> Option<AlertType> {
    let rest = line.strip_prefix("[!")?;
    let (keyword, alert_type) = [
        ("NOTE", AlertType::Note),
        ("TIP", AlertType::Tip),
        ("IMPORTANT", AlertType::Important),
        ("WARNING", AlertType::Warning),
        ("CAUTION", AlertType::Caution),
    ]
    .into_iter()
    .find(|(keyword, _)| rest.starts_with(keyword))?;

    let rest = &rest[keyword.len()..];
    let rest = rest.strip_prefix(']')?;
    if crate::strings::is_blank(rest) {
        Some(alert_type)
    } else {
        None
    }
}

use seo_types::{CanonicalUrl, Category, Issue, Severity};

/// Build a single [`Issue`], the shape every rule function in this crate
/// converges on. `threshold_note` carries the measured value that tripped a
/// threshold (e.g. `"title length 29"`) for diagnostics; most rules pass `None`.
pub fn issue(
    code: &'static str,
    category: Category,
    severity: Severity,
    weight: i32,
    url: &CanonicalUrl,
    message: impl Into<String>,
) -> Issue {
    Issue {
        code,
        category,
        severity,
        url: url.clone(),
        message: message.into(),
        threshold_note: None,
        weight,
    }
}

pub fn issue_with_note(
    code: &'static str,
    category: Category,
    severity: Severity,
    weight: i32,
    url: &CanonicalUrl,
    message: impl Into<String>,
    threshold_note: impl Into<String>,
) -> Issue {
    Issue {
        threshold_note: Some(threshold_note.into()),
        ..issue(code, category, severity, weight, url, message)
    }
}

//! crates/course_advisor_core/src/slug.rs
//!
//! Slug derivation and the deterministic, offline course URL fallback.

use rand::Rng;

pub const MAX_SLUG_LEN: usize = 60;

/// Builds a URL-safe slug: lowercase ASCII letters, digits and hyphens only,
/// at most [`MAX_SLUG_LEN`] characters.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let kept = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-');

    let mut slug = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for c in kept {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            slug.push(c);
        }
    }

    slug.chars().take(MAX_SLUG_LEN).collect()
}

fn provider_domain(provider: &str) -> String {
    let domain: String = provider
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if domain.is_empty() {
        "online-courses".to_string()
    } else {
        domain
    }
}

/// Generates a provider-shaped course URL with a random numeric course id.
pub fn fallback_course_url(title: &str, provider: &str) -> String {
    let course_id: u32 = rand::thread_rng().gen_range(10_000_000..=99_999_999);
    fallback_course_url_with_id(title, provider, course_id)
}

/// Same as [`fallback_course_url`] with a caller-chosen course id.
pub fn fallback_course_url_with_id(title: &str, provider: &str, course_id: u32) -> String {
    let slug = slugify(title);

    match provider.trim().to_lowercase().as_str() {
        "udemy" => format!("https://www.udemy.com/course/{}/?utm_source=recommender", slug),
        "coursera" => format!(
            "https://www.coursera.org/learn/{}?specialization=recommended",
            slug
        ),
        "edx" => format!("https://www.edx.org/learn/{}", slug),
        "linkedin learning" | "linkedin" => format!(
            "https://www.linkedin.com/learning/courses/{}-{}",
            slug, course_id
        ),
        "pluralsight" => format!(
            "https://app.pluralsight.com/library/courses/{}/table-of-contents",
            slug
        ),
        _ => format!(
            "https://www.{}.com/courses/{}",
            provider_domain(provider),
            slug
        ),
    }
}

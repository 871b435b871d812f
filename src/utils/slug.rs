/// Lowercases the input, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, and strips leading/trailing dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// `slugify(base) + "-" + first six characters of the id`.
pub fn job_slug(base: &str, id: &str) -> String {
    let suffix: String = id.chars().take(6).collect();
    format!("{}-{}", slugify(base), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators_and_trims_dashes() {
        assert_eq!(slugify("Senior  Rust/Go Engineer!"), "senior-rust-go-engineer");
        assert_eq!(slugify("--Lead--"), "lead");
        assert_eq!(slugify("QA (Remote) 2"), "qa-remote-2");
    }

    #[test]
    fn non_ascii_letters_act_as_separators() {
        assert_eq!(slugify("Café Manager"), "caf-manager");
    }

    #[test]
    fn job_slug_appends_id_prefix() {
        let slug = job_slug("Engineer", "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert_eq!(slug, "engineer-3fa85f");
    }
}

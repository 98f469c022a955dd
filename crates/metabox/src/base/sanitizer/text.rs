use crate::base::Sanitizer;

///
/// Trim
///

pub struct Trim;

impl Sanitizer<String> for Trim {
    fn sanitize(&self, value: &mut String) -> Result<(), String> {
        let trimmed = value.trim();

        if trimmed.len() != value.len() {
            *value = trimmed.to_owned();
        }

        Ok(())
    }
}

///
/// SingleLine
/// Collapses line breaks and strips control characters; single-line inputs
/// must not smuggle structure into storage.
///

pub struct SingleLine;

impl Sanitizer<String> for SingleLine {
    fn sanitize(&self, value: &mut String) -> Result<(), String> {
        if !value.chars().any(char::is_control) {
            return Ok(());
        }

        *value = value
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();

        Ok(())
    }
}

///
/// Slug
/// Lowercases and maps whitespace runs to single dashes; taxonomy term
/// slugs are compared byte-for-byte host-side.
///

pub struct Slug;

impl Sanitizer<String> for Slug {
    fn sanitize(&self, value: &mut String) -> Result<(), String> {
        let mut out = String::with_capacity(value.len());
        let mut pending_dash = false;

        for c in value.trim().chars() {
            if c.is_whitespace() {
                pending_dash = !out.is_empty();
                continue;
            }

            if pending_dash {
                out.push('-');
                pending_dash = false;
            }

            out.extend(c.to_lowercase());
        }

        *value = out;
        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_removes_surrounding_whitespace() {
        let mut v = "  hello  ".to_string();
        Trim.sanitize(&mut v).unwrap();
        assert_eq!(v, "hello");
    }

    #[test]
    fn test_single_line_flattens_control_characters() {
        let mut v = "one\ntwo\tthree".to_string();
        SingleLine.sanitize(&mut v).unwrap();
        assert_eq!(v, "one two three");
    }

    #[test]
    fn test_slug_lowercases_and_dashes() {
        let mut v = "  Board Games  ".to_string();
        Slug.sanitize(&mut v).unwrap();
        assert_eq!(v, "board-games");

        let mut v = "Sci   Fi".to_string();
        Slug.sanitize(&mut v).unwrap();
        assert_eq!(v, "sci-fi");
    }
}

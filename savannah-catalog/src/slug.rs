/// Derives a URL slug from a package title.
///
/// Lowercases, turns whitespace runs into a hyphen, drops anything that is not
/// a word character or hyphen, collapses repeated hyphens and trims them from
/// both ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_space = false;

    for ch in title.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        let keep = ch == '-' || ch == '_' || ch.is_ascii_alphanumeric();
        if !keep {
            continue;
        }
        if pending_space {
            push_hyphen(&mut slug);
            pending_space = false;
        }
        if ch == '-' {
            push_hyphen(&mut slug);
        } else {
            slug.push(ch);
        }
    }

    slug.trim_matches('-').to_string()
}

fn push_hyphen(slug: &mut String) {
    if !slug.ends_with('-') {
        slug.push('-');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_to_slug() {
        assert_eq!(slugify("Cape Coast Tour!"), "cape-coast-tour");
        assert_eq!(slugify("  Kakum  --  Canopy Walk "), "kakum-canopy-walk");
        assert_eq!(slugify("Volta_Lake Day-Trip"), "volta_lake-day-trip");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_punctuation_between_words_does_not_double_hyphen() {
        assert_eq!(slugify("Accra & Aburi"), "accra-aburi");
        assert_eq!(slugify("-Mole- Safari-"), "mole-safari");
    }
}

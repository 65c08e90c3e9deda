//! Search over the classified-cause catalog

use std::collections::BTreeSet;

use crate::data::{ClassifiedCause, Level};

/// Lowercase and strip Spanish diacritics so "cancer" finds "CÁNCER"
fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

/// Causes containing `query`, most frequent first
///
/// An empty query lists the catalog. When `levels` is given only causes
/// classified in one of them are returned.
pub fn search_causes<'a>(
    causes: &'a [ClassifiedCause],
    query: &str,
    levels: Option<&BTreeSet<Level>>,
    limit: usize,
) -> Vec<&'a ClassifiedCause> {
    let needle = fold(query.trim());
    let mut hits: Vec<&ClassifiedCause> = causes
        .iter()
        .filter(|c| levels.map_or(true, |set| set.contains(&c.level)))
        .filter(|c| needle.is_empty() || fold(&c.cause).contains(&needle))
        .collect();
    hits.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.cause.cmp(&b.cause)));
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<ClassifiedCause> {
        let cause = |name: &str, level, frequency| ClassifiedCause {
            cause: name.to_string(),
            level,
            frequency,
        };
        vec![
            cause("CONSULTA GENERAL", Level::Ambulatory, 900),
            cause("CÁNCER DE MAMA", Level::HighSpecialty, 120),
            cause("APENDICITIS", Level::Hospital, 300),
            cause("CANCER DE PROSTATA", Level::HighSpecialty, 150),
        ]
    }

    #[test]
    fn test_accent_insensitive_match() {
        let causes = catalog();
        let hits = search_causes(&causes, "cancer", None, 10);
        let names: Vec<&str> = hits.iter().map(|c| c.cause.as_str()).collect();
        assert_eq!(names, vec!["CANCER DE PROSTATA", "CÁNCER DE MAMA"]);
    }

    #[test]
    fn test_empty_query_orders_by_frequency() {
        let causes = catalog();
        let hits = search_causes(&causes, "  ", None, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].cause, "CONSULTA GENERAL");
        assert_eq!(hits[1].cause, "APENDICITIS");
    }

    #[test]
    fn test_level_restriction() {
        let causes = catalog();
        let levels = BTreeSet::from([Level::Hospital]);
        let hits = search_causes(&causes, "", Some(&levels), 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].level, Level::Hospital);
    }
}

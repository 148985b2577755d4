use crate::types::ParsedResults;

/// Keep only the cases that are not a clean pass, in their original order
pub fn select_failed(results: &ParsedResults) -> ParsedResults {
    ParsedResults {
        dir: results.dir.clone(),
        cases: results
            .cases
            .iter()
            .filter(|(_, record)| !record.is_clean_pass())
            .map(|(name, record)| (name.clone(), record.clone()))
            .collect(),
    }
}

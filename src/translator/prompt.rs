//! The instruction contract sent with every translation request.

/// Procedure phrases the model must map to an exact DRG code.
///
/// Anything not listed here falls back to a substring match on the
/// description column.
pub const PROCEDURE_ALIASES: &[(&str, &str)] = &[
    ("knee replacement", "470"),
    ("hip replacement", "470"),
    ("joint replacement", "470"),
    ("heart failure", "291"),
    ("sepsis", "871"),
    ("pneumonia", "193"),
    ("heart bypass", "236"),
    ("coronary bypass", "236"),
    ("stroke", "065"),
    ("kidney failure", "683"),
    ("copd", "190"),
    ("spinal fusion", "460"),
];

const PROMPT_HEAD: &str = r#"You are a healthcare data assistant that converts questions into SQLite queries.

SCOPE:
Only answer questions about hospital procedure prices, payments, discharge volumes, quality ratings, or the providers in this dataset.
For anything else, respond with exactly: {"refusal": "I can only help with hospital pricing and quality information."}

DATABASE SCHEMA:
- providers: provider_id, name, city, state, zip_code
- procedures: provider_id, drg_code, drg_description, avg_covered_charges, avg_total_payments, avg_medicare_payments, total_discharges
- ratings: provider_id, rating (integer 1-10, a provider may have no rating)

QUERY RULES:

1. STRUCTURE:
   SELECT providers.name, providers.city, providers.state, providers.zip_code, [metric columns]
   FROM providers
   JOIN procedures ON providers.provider_id = procedures.provider_id
   [JOIN ratings ON providers.provider_id = ratings.provider_id -- only for rating queries]
   WHERE [conditions]
   ORDER BY [metric]
   [LIMIT]

2. WHERE CONDITIONS:
   - Known DRG code: procedures.drg_code = '470' (always quoted, keep leading zeros)
   - Known procedure names map to codes (use exact match on procedures.drg_code):
"#;

const PROMPT_TAIL: &str = r#"   - Other medical terms: procedures.drg_description LIKE '%term%'
   - Multiple terms: (procedures.drg_description LIKE '%cardiac%' OR procedures.drg_description LIKE '%heart%')
   - NEVER filter by providers.zip_code or providers.state

3. LIMIT RULES:
   - Question contains "near [ZIP]" or "within X miles of [ZIP]": NO LIMIT
   - Question asks for "top N": LIMIT N
   - Question asks for a single superlative ("the cheapest", "the best"): LIMIT 1, unless it also names a location
   - Otherwise: LIMIT 10
   - The application handles all distance filtering

4. ORDERING:
   - "cheapest" / "lowest cost": ORDER BY procedures.avg_covered_charges ASC
   - "best rating" / "highest rated": ORDER BY ratings.rating DESC
   - "most" / "highest volume": ORDER BY procedures.total_discharges DESC

5. IMPORTANT:
   - Always use table.column format (procedures.drg_code, not drg_code)
   - Only read from providers, procedures and ratings; only SELECT statements
   - Exactly one statement, no comments

Respond with ONLY a JSON object, either:
{"sql": "SELECT ..."}
or
{"refusal": "I can only help with hospital pricing and quality information."}"#;

/// Builds the system instruction: schema, alias table and query rules.
pub fn system_prompt() -> String {
    let aliases: String = PROCEDURE_ALIASES
        .iter()
        .map(|(phrase, code)| format!("     \"{phrase}\" -> procedures.drg_code = '{code}'\n"))
        .collect();

    format!("{PROMPT_HEAD}{aliases}{PROMPT_TAIL}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_every_alias() {
        let prompt = system_prompt();
        for (phrase, code) in PROCEDURE_ALIASES {
            assert!(prompt.contains(phrase), "missing alias {phrase}");
            assert!(prompt.contains(&format!("drg_code = '{code}'")));
        }
    }

    #[test]
    fn prompt_forbids_geographic_filters() {
        let prompt = system_prompt();
        assert!(prompt.contains("NEVER filter by providers.zip_code or providers.state"));
        assert!(prompt.contains("NO LIMIT"));
        assert!(prompt.contains("LIMIT 10"));
    }

    #[test]
    fn alias_codes_are_strings_of_digits() {
        for (_, code) in PROCEDURE_ALIASES {
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}

//! Bulk invites from pasted CSV
//!
//! The first column holds the email address and an optional second column a
//! name. At most [`MAX_CSV_ROWS`] data rows are processed per import.

use std::collections::HashSet;

use sea_orm::ConnectionTrait;

use crate::schemas::{BulkInviteResult, CsvRow};
use crate::services::invites::create_invite;

pub const MAX_CSV_ROWS: usize = 200;

/// Parsed CSV body
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCsv {
    pub rows: Vec<CsvRow>,
    pub capped: bool,
}

/// Loose email check: one `@`, something before it, and a dotted domain
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn strip_quotes(field: &str) -> &str {
    let field = field.trim();
    let field = field
        .strip_prefix('"')
        .or_else(|| field.strip_prefix('\''))
        .unwrap_or(field);
    field
        .strip_suffix('"')
        .or_else(|| field.strip_suffix('\''))
        .unwrap_or(field)
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(strip_quotes).collect()
}

fn is_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    let mentions_column = ["email", "name", "e-mail"]
        .iter()
        .any(|label| lower.contains(label));

    let first_field = split_fields(line).first().copied().unwrap_or_default().to_lowercase();
    mentions_column && !is_valid_email(&first_field)
}

/// Split CSV text into data rows, skipping blank lines and a header line
pub fn parse_csv(content: &str) -> ParsedCsv {
    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect();

    let skip = usize::from(lines.first().is_some_and(|line| is_header(line)));

    let data: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(index, line)| (index + 1, *line))
        .collect();

    let capped = data.len() > MAX_CSV_ROWS;

    let rows = data
        .into_iter()
        .take(MAX_CSV_ROWS)
        .map(|(row_number, line)| {
            let fields = split_fields(line);
            CsvRow {
                row_number,
                raw_email: fields.first().copied().unwrap_or_default().to_string(),
                name: fields
                    .get(1)
                    .filter(|name| !name.is_empty())
                    .map(|name| name.to_string()),
            }
        })
        .collect();

    ParsedCsv { rows, capped }
}

/// Create one invite per valid, unique email in the CSV
pub async fn bulk_create_invites<C: ConnectionTrait>(
    db: &C,
    group_id: Option<i64>,
    content: &str,
) -> BulkInviteResult {
    let Some(group_id) = group_id.filter(|_| !content.trim().is_empty()) else {
        return BulkInviteResult::failed("Missing required fields");
    };

    let parsed = parse_csv(content);
    let mut result = BulkInviteResult {
        capped: parsed.capped,
        ..Default::default()
    };
    let mut seen = HashSet::new();

    for row in parsed.rows {
        let email = row.raw_email.to_lowercase();

        if !is_valid_email(&email) {
            result.skipped += 1;
            if !row.raw_email.is_empty() {
                result
                    .errors
                    .push(format!("Row {}: Invalid email \"{}\"", row.row_number, row.raw_email));
            }
            continue;
        }

        if !seen.insert(email.clone()) {
            result.skipped += 1;
            result
                .errors
                .push(format!("Row {}: Duplicate email \"{}\"", row.row_number, email));
            continue;
        }

        match create_invite(db, group_id, Some(email.clone())).await {
            Ok(_) => result.created += 1,
            Err(e) => {
                tracing::error!(group_id, row = row.row_number, error = %e, "Failed to create invite");
                result.skipped += 1;
                result.errors.push(format!(
                    "Row {}: Failed to create invite for \"{}\"",
                    row.row_number, email
                ));
            }
        }
    }

    tracing::info!(
        group_id,
        created = result.created,
        skipped = result.skipped,
        capped = result.capped,
        "Bulk invite import finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_db, create_test_group, create_test_org};

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.co.uk"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@.com"));
        assert!(!is_valid_email("ada@example."));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
        assert!(!is_valid_email("ada lovelace@example.com"));
    }

    #[test]
    fn test_header_is_skipped_and_rows_numbered() {
        let parsed = parse_csv("Email,Name\r\nada@example.com,Ada\n\n  \ngrace@navy.mil\n");

        assert!(!parsed.capped);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].row_number, 2);
        assert_eq!(parsed.rows[0].raw_email, "ada@example.com");
        assert_eq!(parsed.rows[0].name.as_deref(), Some("Ada"));
        assert_eq!(parsed.rows[1].row_number, 3);
        assert_eq!(parsed.rows[1].name, None);
    }

    #[test]
    fn test_email_in_first_line_is_not_a_header() {
        let parsed = parse_csv("name@example.com,Name\nada@example.com");
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].row_number, 1);
    }

    #[test]
    fn test_quotes_are_stripped() {
        let parsed = parse_csv("\"ada@example.com\", 'Ada Lovelace'");
        assert_eq!(parsed.rows[0].raw_email, "ada@example.com");
        assert_eq!(parsed.rows[0].name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_rows_are_capped() {
        let content: String = (0..MAX_CSV_ROWS + 5)
            .map(|i| format!("user{}@example.com\n", i))
            .collect();
        let parsed = parse_csv(&content);

        assert!(parsed.capped);
        assert_eq!(parsed.rows.len(), MAX_CSV_ROWS);
    }

    #[tokio::test]
    async fn test_missing_group_or_content() {
        let db = create_test_db().await;

        for (group_id, content) in [(Some(1), "  \n"), (Some(1), ""), (None, "ada@example.com")] {
            let result = bulk_create_invites(&db, group_id, content).await;
            assert_eq!(result.created, 0);
            assert_eq!(result.errors, vec!["Missing required fields".to_string()]);
        }
    }

    #[tokio::test]
    async fn test_failed_insert_is_reported_per_row() {
        let db = create_test_db().await;

        // No group 999, so every insert hits the foreign key
        let result =
            bulk_create_invites(&db, Some(999), "email\nada@example.com\ngrace@navy.mil\n").await;

        assert_eq!(result.created, 0);
        assert_eq!(result.skipped, 2);
        assert_eq!(
            result.errors,
            vec![
                "Row 2: Failed to create invite for \"ada@example.com\"".to_string(),
                "Row 3: Failed to create invite for \"grace@navy.mil\"".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_bulk_create_invites_for_group() {
        let db = create_test_db().await;
        let org = create_test_org(&db, "Acme").await;
        let group = create_test_group(&db, org.id, "Parents").await;

        let result =
            bulk_create_invites(&db, Some(group.id), "ada@example.com\nADA@example.com\nnope\n").await;

        assert_eq!(result.created, 1);
        assert_eq!(result.skipped, 2);
        assert!(!result.capped);
    }

    #[test]
    fn test_exactly_cap_rows_is_not_capped() {
        let content: String = (0..MAX_CSV_ROWS)
            .map(|i| format!("user{}@example.com\n", i))
            .collect();
        assert!(!parse_csv(&content).capped);
    }
}

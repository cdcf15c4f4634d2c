use crate::domain::ContentKind;
use crate::payload::SubmissionPayload;

/// Splits a normalized payload into upload-sized request bodies.
///
/// Object-graph payloads are never split: they become one chunk with line
/// breaks stripped, since the submission endpoint expects single-line JSON.
/// Tabular payloads are cut into groups of at most `max_rows` data rows,
/// each group re-prefixed with the header line. Blank lines are dropped and
/// do not count against the bound; a non-positive bound disables splitting.
/// A header with no data rows yields no chunks at all.
pub fn split_chunks(payload: &SubmissionPayload, max_rows: i64) -> Vec<String> {
    match payload.kind {
        ContentKind::Json => {
            let framed = payload
                .content
                .replace("\r\n", "")
                .replace(['\r', '\n'], "");
            vec![framed]
        }
        ContentKind::Tsv => split_tsv(&payload.content, max_rows),
    }
}

fn split_tsv(content: &str, max_rows: i64) -> Vec<String> {
    let mut lines = content.split('\n').map(|line| line.trim_end_matches('\r'));
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let rows = lines
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>();

    if rows.is_empty() {
        return Vec::new();
    }

    let bound = usize::try_from(max_rows).unwrap_or(0);
    if bound == 0 || rows.len() <= bound {
        return vec![assemble(header, &rows)];
    }

    rows.chunks(bound)
        .map(|group| assemble(header, group))
        .collect()
}

fn assemble(header: &str, rows: &[&str]) -> String {
    let mut chunk = String::with_capacity(header.len() + rows.iter().map(|r| r.len() + 1).sum::<usize>() + 1);
    chunk.push_str(header);
    chunk.push('\n');
    for row in rows {
        chunk.push_str(row);
        chunk.push('\n');
    }
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tsv(content: &str) -> SubmissionPayload {
        SubmissionPayload {
            kind: ContentKind::Tsv,
            content: content.to_string(),
        }
    }

    #[test]
    fn json_single_chunk_single_line() {
        let payload = SubmissionPayload {
            kind: ContentKind::Json,
            content: "{\n  \"type\": \"case\",\r\n  \"submitter_id\": \"DB0001\"\n}\n".to_string(),
        };
        let chunks = split_chunks(&payload, 2);
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].contains('\n'));
        assert!(!chunks[0].contains('\r'));
    }

    #[test]
    fn small_payload_one_chunk() {
        let payload = tsv("type\tid\ncase\ta\ncase\tb\n");
        let chunks = split_chunks(&payload, 10);
        assert_eq!(chunks, vec!["type\tid\ncase\ta\ncase\tb\n".to_string()]);
    }

    #[test]
    fn non_positive_bound_disables_splitting() {
        let payload = tsv("type\tid\ncase\ta\ncase\tb\ncase\tc\n");
        assert_eq!(split_chunks(&payload, 0).len(), 1);
        assert_eq!(split_chunks(&payload, -5).len(), 1);
    }

    #[test]
    fn rows_split_with_repeated_header() {
        let payload = tsv("type\tid\ncase\ta\ncase\tb\ncase\tc\n");
        let chunks = split_chunks(&payload, 2);
        assert_eq!(
            chunks,
            vec![
                "type\tid\ncase\ta\ncase\tb\n".to_string(),
                "type\tid\ncase\tc\n".to_string(),
            ]
        );
    }

    #[test]
    fn blank_lines_skipped_and_order_kept() {
        let payload = tsv("type\tid\n\ncase\ta\n\r\ncase\tb\ncase\tc\n\n");
        let chunks = split_chunks(&payload, 2);
        let rows = chunks
            .iter()
            .flat_map(|chunk| chunk.lines().skip(1))
            .collect::<Vec<_>>();
        assert_eq!(rows, vec!["case\ta", "case\tb", "case\tc"]);
    }

    #[test]
    fn zero_rows_zero_chunks() {
        let payload = tsv("type\tid\n");
        assert!(split_chunks(&payload, 100).is_empty());

        let payload = tsv("type\tid\n\n\n");
        assert!(split_chunks(&payload, 100).is_empty());
    }
}

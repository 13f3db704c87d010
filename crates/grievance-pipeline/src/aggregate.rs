//! Result aggregation and export

use crate::batch::AnalyzedRecord;
use csv::WriterBuilder;
use grievance_core::{CategoryLabel, PriorityLevel, Result, SentimentLevel, Ticket};
use std::collections::BTreeMap;
use std::io::Write;

/// Columns appended to the input columns on export
pub const APPENDED_COLUMNS: [&str; 4] = ["Category", "Priority", "Sentiment", "Draft_Reply"];

/// Columns written for tickets that did not come from a table
const TICKET_COLUMNS: [&str; 10] = [
    "Complaint_ID",
    "Customer",
    "Date",
    "Complaint",
    "Category",
    "Priority",
    "Sentiment",
    "Confidence",
    "Status",
    "Draft_Reply",
];

/// Count tickets per key value. Tickets for which `key` returns `None` are
/// skipped. The map is ordered, so the result does not depend on ticket order.
pub fn distribution<'a, K, I, F>(tickets: I, key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    I: IntoIterator<Item = &'a Ticket>,
    F: Fn(&Ticket) -> Option<K>,
{
    let mut counts = BTreeMap::new();
    for ticket in tickets {
        if let Some(value) = key(ticket) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }
    counts
}

pub fn category_distribution<'a>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
) -> BTreeMap<CategoryLabel, usize> {
    distribution(tickets, |t| t.assessment.category().cloned())
}

pub fn sentiment_distribution<'a>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
) -> BTreeMap<SentimentLevel, usize> {
    distribution(tickets, |t| t.assessment.sentiment())
}

pub fn priority_distribution<'a>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
) -> BTreeMap<PriorityLevel, usize> {
    distribution(tickets, |t| t.assessment.priority())
}

/// Write the input columns plus [`APPENDED_COLUMNS`] for each record.
///
/// An input column that already carries one of those names is overwritten in
/// place, so exporting an exported table keeps a single set of result columns.
pub fn export_csv<W: Write>(writer: W, columns: &[String], records: &[AnalyzedRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    let slots: Vec<Option<usize>> = APPENDED_COLUMNS
        .iter()
        .map(|name| columns.iter().position(|c| c == name))
        .collect();

    let header = columns.iter().map(String::as_str).chain(
        APPENDED_COLUMNS
            .iter()
            .zip(&slots)
            .filter(|(_, slot)| slot.is_none())
            .map(|(name, _)| *name),
    );
    writer.write_record(header)?;

    for record in records {
        let ticket = &record.ticket;
        let values = [
            ticket.category_field(),
            ticket.priority_field(),
            ticket.sentiment_field(),
            ticket.draft_reply.as_str(),
        ];

        let mut row: Vec<&str> = record.fields.iter().map(String::as_str).collect();
        row.resize(columns.len(), "");
        for (value, slot) in values.into_iter().zip(&slots) {
            match slot {
                Some(index) => row[*index] = value,
                None => row.push(value),
            }
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write tickets with a fixed column set that the batch processor can read back
pub fn export_tickets<'a, W: Write>(
    writer: W,
    tickets: impl IntoIterator<Item = &'a Ticket>,
) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(TICKET_COLUMNS)?;

    for ticket in tickets {
        let confidence = ticket
            .assessment
            .triage()
            .map(|t| format!("{:.4}", t.confidence))
            .unwrap_or_default();
        writer.write_record([
            ticket.id.as_str(),
            ticket.customer.as_str(),
            ticket.date.as_str(),
            ticket.complaint_text.as_str(),
            ticket.category_field(),
            ticket.priority_field(),
            ticket.sentiment_field(),
            confidence.as_str(),
            ticket.status.as_str(),
            ticket.draft_reply.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use grievance_core::Triage;
    use std::time::Duration;

    fn ticket(id: &str, category: &str, sentiment: SentimentLevel) -> Ticket {
        Ticket::classified(
            id,
            "Asha",
            "text, with comma",
            Triage {
                category: category.into(),
                confidence: 0.5,
                priority: PriorityLevel::High,
                sentiment,
            },
            format!("Reply \"quoted\" for {id}\nsecond line"),
        )
    }

    #[test]
    fn test_distribution_is_order_independent() {
        let tickets = vec![
            ticket("1", "Damaged/Lost", SentimentLevel::Negative),
            ticket("2", "Delivery Delay", SentimentLevel::Negative),
            ticket("3", "Damaged/Lost", SentimentLevel::Negative),
            Ticket::failed("4", "Customer", "", "empty"),
        ];
        let mut reversed = tickets.clone();
        reversed.reverse();

        let forward = category_distribution(&tickets);
        assert_eq!(forward, category_distribution(&reversed));
        assert_eq!(forward, category_distribution(&tickets));
        assert_eq!(forward[&CategoryLabel::new("Damaged/Lost")], 2);
        assert_eq!(forward.values().sum::<usize>(), 3);

        let sentiment = sentiment_distribution(&tickets);
        assert_eq!(sentiment[&SentimentLevel::Negative], 3);
        assert_eq!(priority_distribution(&tickets)[&PriorityLevel::High], 3);
    }

    #[test]
    fn test_export_is_reimportable() {
        let records = vec![
            AnalyzedRecord {
                index: 0,
                fields: vec!["C1".to_string(), "text, with comma".to_string()],
                ticket: ticket("C1", "Damaged/Lost", SentimentLevel::Negative),
                latency: Duration::ZERO,
            },
            AnalyzedRecord {
                index: 1,
                fields: vec!["C2".to_string(), String::new()],
                ticket: Ticket::failed("C2", "Customer", "", "complaint text is empty"),
                latency: Duration::ZERO,
            },
        ];
        let columns = vec!["Complaint_ID".to_string(), "Text".to_string()];

        let mut buf = Vec::new();
        export_csv(&mut buf, &columns, &records).unwrap();
        let table = Table::from_reader(buf.as_slice()).unwrap();

        assert_eq!(
            table.headers(),
            &["Complaint_ID", "Text", "Category", "Priority", "Sentiment", "Draft_Reply"]
        );
        assert_eq!(table.rows()[0][1], "text, with comma");
        assert_eq!(table.rows()[0][2], "Damaged/Lost");
        assert_eq!(table.rows()[0][5], "Reply \"quoted\" for C1\nsecond line");
        assert_eq!(&table.rows()[1][2..5], &["Failed", "Failed", "Failed"]);
        assert_eq!(table.rows()[1][5], "");
    }

    #[test]
    fn test_export_overwrites_existing_result_columns() {
        let columns: Vec<String> = ["Complaint_ID", "Category", "Text", "Draft_Reply"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let records = vec![AnalyzedRecord {
            index: 0,
            fields: vec![
                "C1".to_string(),
                "Delivery Delay".to_string(),
                "parcel broken".to_string(),
                "old reply".to_string(),
            ],
            ticket: ticket("C1", "Damaged/Lost", SentimentLevel::Negative),
            latency: Duration::ZERO,
        }];

        let mut buf = Vec::new();
        export_csv(&mut buf, &columns, &records).unwrap();
        let table = Table::from_reader(buf.as_slice()).unwrap();

        assert_eq!(
            table.headers(),
            &["Complaint_ID", "Category", "Text", "Draft_Reply", "Priority", "Sentiment"]
        );
        assert_eq!(
            table.rows()[0],
            vec![
                "C1",
                "Damaged/Lost",
                "parcel broken",
                "Reply \"quoted\" for C1\nsecond line",
                "High",
                "Negative"
            ]
        );
    }

    #[test]
    fn test_export_tickets_columns() {
        let tickets = vec![ticket("LIVE-1", "Delivery Delay", SentimentLevel::Negative)];
        let mut buf = Vec::new();
        export_tickets(&mut buf, &tickets).unwrap();

        let table = Table::from_reader(buf.as_slice()).unwrap();
        assert_eq!(table.headers().len(), TICKET_COLUMNS.len());
        assert_eq!(table.rows()[0][0], "LIVE-1");
        assert_eq!(table.rows()[0][7], "0.5000");
        assert_eq!(table.rows()[0][8], "Open");
    }
}

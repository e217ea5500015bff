use chrono::{Local, NaiveDate};
use clap::Args;

use pantry_expiry::{
    ExpiryRow, ExpirySummary, SortColumn, SortDirection, flatten, sort_by, summarize,
};
use pantry_infra::{PantrySession, RemoteStore};

#[derive(Debug, Args)]
pub(crate) struct DashboardArgs {
    /// Column to sort by: product, category, location, quantity or expiry
    #[arg(long, default_value = "expiry")]
    sort: SortColumn,

    /// Sort descending
    #[arg(long)]
    desc: bool,

    /// Reference date for urgency (defaults to today)
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

pub(crate) fn run<S: RemoteStore>(
    session: &PantrySession<S>,
    args: DashboardArgs,
) -> anyhow::Result<()> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let ledger = session.ledger();
    let mut rows = flatten(ledger.products(), ledger.catalog(), as_of);

    let direction = if args.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    sort_by(&mut rows, args.sort, direction);

    for line in banner(&summarize(&rows)) {
        println!("{line}");
    }
    if rows.is_empty() {
        println!("no lots in stock");
        return Ok(());
    }
    println!();
    for row in &rows {
        println!("{}", format_row(row));
    }
    Ok(())
}

fn banner(summary: &ExpirySummary) -> Vec<String> {
    if summary.is_all_clear() {
        return vec!["All clear: nothing expires in the next 3 days".to_string()];
    }
    summary
        .alerts()
        .into_iter()
        .map(|(bucket, count)| {
            let noun = if count == 1 { "lot" } else { "lots" };
            format!("{}: {count} {noun}", bucket.label())
        })
        .collect()
}

fn format_row(row: &ExpiryRow) -> String {
    let location = match (&row.location_icon, &row.location) {
        (Some(icon), Some(name)) => format!("{icon} {name}"),
        _ => "-".to_string(),
    };
    let expiry = row
        .expiry
        .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
    let days = match row.days_until_expiry {
        None => String::new(),
        Some(0) => " (today)".to_string(),
        Some(d) if d < 0 => format!(" ({}d ago)", -d),
        Some(d) => format!(" (in {d}d)"),
    };

    format!(
        "{:<24} {:<14} {:<16} {:>5}  {:<10}  {}{days}",
        row.product_name,
        row.category.as_deref().unwrap_or("-"),
        location,
        row.quantity,
        expiry,
        row.bucket.label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::{LotId, ProductId};
    use pantry_expiry::UrgencyBucket;

    fn row(days: Option<i64>, bucket: UrgencyBucket) -> ExpiryRow {
        ExpiryRow {
            product_id: ProductId::new(),
            lot_id: LotId::new(),
            product_name: "Milk".to_string(),
            ean: None,
            category: None,
            location: Some("Fridge".to_string()),
            location_icon: Some("🧊".to_string()),
            quantity: 2,
            expiry: days.and_then(|_| NaiveDate::from_ymd_opt(2025, 1, 10)),
            days_until_expiry: days,
            bucket,
        }
    }

    #[test]
    fn banner_lists_alerts_or_all_clear() {
        assert_eq!(
            banner(&ExpirySummary::default()),
            ["All clear: nothing expires in the next 3 days"]
        );

        let summary = ExpirySummary {
            expired: 1,
            today: 0,
            urgent: 2,
        };
        assert_eq!(banner(&summary), ["Expired: 1 lot", "Urgent: 2 lots"]);
    }

    #[test]
    fn row_shows_label_and_relative_days() {
        let line = format_row(&row(Some(-2), UrgencyBucket::Expired));
        assert!(line.contains("🧊 Fridge"));
        assert!(line.contains("2025-01-10"));
        assert!(line.ends_with("Expired (2d ago)"));

        let line = format_row(&row(None, UrgencyBucket::None));
        assert!(line.ends_with("No expiry"));
    }
}

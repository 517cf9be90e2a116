use marketplace_tools::{data_objects::InventoryEntry, ParsedCatalog};
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};
use stock_sync_engine::{Decision, OfferDecision, SyncRunResult};

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn markdown_style(table: &mut Table) {
    table.set_format(markdown_format());
}

pub fn format_catalog(catalog: &ParsedCatalog) -> String {
    let mut table = Table::new();
    markdown_style(&mut table);
    table.set_titles(row!["Offer id", "EAN", "Reference", "Published stock", "Channel"]);
    for offer in &catalog.offers {
        table.add_row(row![
            offer.offer_id,
            offer.ean,
            offer.reference_code.as_deref().unwrap_or("-"),
            offer.published_stock,
            offer.channel
        ]);
    }
    format!("{table}\n{} offer(s), {} unreadable row(s) skipped", catalog.offers.len(), catalog.skipped_rows)
}

pub fn format_inventory(entries: &[InventoryEntry]) -> String {
    let mut table = Table::new();
    markdown_style(&mut table);
    table.set_titles(row!["EAN", "Regular", "Graded", "Non-conforming"]);
    for entry in entries {
        table.add_row(row![entry.ean, entry.regular_stock, entry.graded_stock, entry.non_conforming_stock]);
    }
    format!("{table}\n{} EAN(s)", entries.len())
}

pub fn format_decisions(decisions: &[OfferDecision]) -> String {
    let mut table = Table::new();
    markdown_style(&mut table);
    table.set_titles(row!["Offer id", "EAN", "Decision"]);
    for item in decisions {
        table.add_row(row![item.offer_id, item.ean, describe_decision(&item.decision)]);
    }
    let actionable = decisions.iter().filter(|d| d.decision.requires_dispatch()).count();
    format!("{table}\n{} decision(s), {} requiring dispatch", decisions.len(), actionable)
}

fn describe_decision(decision: &Decision) -> String {
    match decision {
        Decision::NoAction => "-".to_string(),
        Decision::SetStock { amount } => format!("set stock to {amount}"),
        Decision::SwapToMerchant { publish_stock } => {
            format!("swap to merchant channel, then set stock to {publish_stock}")
        },
        Decision::SwapToPlatform => "swap to platform channel".to_string(),
        Decision::Blocked { reason } => format!("blocked: {reason}"),
    }
}

pub fn format_run_result(result: &SyncRunResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Status: {:?}\nStarted: {}\nDuration: {}ms\n",
        result.status,
        result.started_at,
        result.duration().num_milliseconds()
    ));
    if let Some(error) = &result.error {
        out.push_str(&format!("Error: {error}\n"));
        return out;
    }
    let counts = &result.counts;
    let mut table = Table::new();
    markdown_style(&mut table);
    table.set_titles(row!["Checked", "Updated", "To merchant", "To platform", "Blocked", "Failed", "Rows skipped"]);
    table.add_row(row![
        counts.checked,
        counts.updated,
        counts.swapped_to_merchant,
        counts.swapped_to_platform,
        counts.blocked_by_safety_stock,
        counts.failed,
        counts.rows_skipped
    ]);
    out.push_str(&table.to_string());
    if !result.item_sample.is_empty() {
        out.push_str(&format!("\n{} blocked/failed item(s) in sample:\n", result.item_sample.len()));
        for item in &result.item_sample {
            out.push_str(&format!("  {} (EAN {}): {:?}\n", item.offer_id, item.ean, item.outcome));
        }
    }
    out
}

//! Parsing of the bulk offer export CSV.
//!
//! The payload is externally controlled and has drifted between API revisions, so parsing is defensive: the header
//! row is located by scanning the leading records for an **exact** match of every required column name, and any row
//! that cannot be read in full is skipped and counted rather than raised. Column lookup is never done by substring:
//! the export carries both a `fulfilmentType` and a `fulfilmentDeliveryCode` column, and substring matching binds
//! the channel lookup to whichever of the two appears first.

use log::*;
use ssg_common::{Ean, FulfilmentChannel};

use crate::MarketplaceApiError;

pub const COL_OFFER_ID: &str = "offerId";
pub const COL_EAN: &str = "ean";
pub const COL_STOCK_AMOUNT: &str = "stockAmount";
pub const COL_FULFILMENT_TYPE: &str = "fulfilmentType";
pub const COL_REFERENCE_CODE: &str = "referenceCode";

pub const REQUIRED_COLUMNS: [&str; 4] = [COL_OFFER_ID, COL_EAN, COL_STOCK_AMOUNT, COL_FULFILMENT_TYPE];

/// How many leading records are scanned for the header row before the payload is declared unusable.
const HEADER_SCAN_WINDOW: usize = 15;

/// One offer as currently listed on the marketplace. Built fresh from each export; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOffer {
    pub offer_id: String,
    pub ean: Ean,
    /// The merchant's own SKU, when the export carries the optional `referenceCode` column.
    pub reference_code: Option<String>,
    /// The stock figure currently published on the marketplace for this offer.
    pub published_stock: i64,
    pub channel: FulfilmentChannel,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedCatalog {
    pub offers: Vec<CatalogOffer>,
    /// Rows that were present but unreadable (short row, invalid EAN or stock figure, unknown channel token).
    pub skipped_rows: usize,
}

struct ColumnMap {
    offer_id: usize,
    ean: usize,
    stock_amount: usize,
    fulfilment_type: usize,
    reference_code: Option<usize>,
}

impl ColumnMap {
    /// Accepts `record` as the header row iff every required column name appears as an exact cell value.
    /// On rejection, returns the names that were missing.
    fn from_header(record: &csv::StringRecord) -> Result<Self, Vec<String>> {
        let position = |name: &str| record.iter().position(|cell| cell.trim() == name);
        let found =
            (position(COL_OFFER_ID), position(COL_EAN), position(COL_STOCK_AMOUNT), position(COL_FULFILMENT_TYPE));
        match found {
            (Some(offer_id), Some(ean), Some(stock_amount), Some(fulfilment_type)) => Ok(Self {
                offer_id,
                ean,
                stock_amount,
                fulfilment_type,
                reference_code: position(COL_REFERENCE_CODE),
            }),
            (offer_id, ean, stock_amount, fulfilment_type) => {
                let missing = REQUIRED_COLUMNS
                    .iter()
                    .zip([offer_id, ean, stock_amount, fulfilment_type])
                    .filter(|(_, found)| found.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect();
                Err(missing)
            },
        }
    }

    /// Reads one data row. `None` means the row is unusable and should be counted as skipped.
    fn offer_from_row(&self, record: &csv::StringRecord) -> Option<CatalogOffer> {
        let offer_id = record.get(self.offer_id)?.trim();
        if offer_id.is_empty() {
            return None;
        }
        let ean = record.get(self.ean)?.parse::<Ean>().ok()?;
        let published_stock = record.get(self.stock_amount)?.trim().parse::<i64>().ok()?;
        let channel = FulfilmentChannel::from_wire_token(record.get(self.fulfilment_type)?)?;
        let reference_code = self
            .reference_code
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Some(CatalogOffer { offer_id: offer_id.to_string(), ean, reference_code, published_stock, channel })
    }
}

/// Parses a raw export payload. Fails fast when no record within the scan window carries all required columns;
/// everything after the header is best-effort, with unusable rows counted in [`ParsedCatalog::skipped_rows`].
pub fn parse_catalog_export(text: &str) -> Result<ParsedCatalog, MarketplaceApiError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_reader(text.as_bytes());
    let mut columns: Option<ColumnMap> = None;
    // The closest near-miss seen during the scan, so the error can name the columns that were actually absent.
    let mut best_missing: Option<Vec<String>> = None;
    let mut catalog = ParsedCatalog::default();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                if columns.is_some() {
                    trace!("📦️ Skipping unreadable export row: {e}");
                    catalog.skipped_rows += 1;
                }
                continue;
            },
        };
        match &columns {
            None => {
                match ColumnMap::from_header(&record) {
                    Ok(map) => {
                        columns = Some(map);
                        continue;
                    },
                    Err(missing) => {
                        if best_missing.as_ref().map(|b| missing.len() < b.len()).unwrap_or(true) {
                            best_missing = Some(missing);
                        }
                    },
                }
                if index + 1 >= HEADER_SCAN_WINDOW {
                    let missing = best_missing.unwrap_or_else(all_required);
                    return Err(MarketplaceApiError::MissingRequiredColumns(missing));
                }
            },
            Some(map) => match map.offer_from_row(&record) {
                Some(offer) => catalog.offers.push(offer),
                None => catalog.skipped_rows += 1,
            },
        }
    }
    if columns.is_none() {
        return Err(MarketplaceApiError::MissingRequiredColumns(best_missing.unwrap_or_else(all_required)));
    }
    if catalog.skipped_rows > 0 {
        warn!("📦️ Export parsed with {} unreadable row(s) skipped", catalog.skipped_rows);
    }
    debug!("📦️ Parsed {} offers from export", catalog.offers.len());
    Ok(catalog)
}

fn all_required() -> Vec<String> {
    REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect()
}

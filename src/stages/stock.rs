//! Combine stock across selected supply channels
//!
//! Sums each species' stock over the chosen supply types. Species with no row
//! in the chosen channels are left out; zero-filling happens when stock is
//! joined onto the region table.

use crate::config::SupplyType;
use crate::data::StockRecord;
use crate::utils::Quantity;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedStock {
    pub species_id: String,
    /// kg, summed over the selected channels (invalid quantities skipped)
    pub combined_stock: Quantity,
}

/// Filter stock rows to `chosen` supply types and sum per species
///
/// Output is sorted by species id.
pub fn combine_suppliers(stock: &[StockRecord], chosen: &[SupplyType]) -> Vec<CombinedStock> {
    let chosen: FxHashSet<SupplyType> = chosen.iter().copied().collect();

    let mut totals: FxHashMap<&str, Quantity> = FxHashMap::default();
    for record in stock.iter().filter(|r| chosen.contains(&r.supply_type)) {
        let total = totals.entry(record.species_id.as_str()).or_insert(Quantity::ZERO);
        *total = Quantity::sum_valid([*total, record.quantity_kg]);
    }

    let mut combined: Vec<CombinedStock> = totals
        .into_iter()
        .map(|(species_id, combined_stock)| CombinedStock {
            species_id: species_id.to_string(),
            combined_stock,
        })
        .collect();
    combined.sort_by(|a, b| a.species_id.cmp(&b.species_id));

    tracing::debug!(
        "Combined stock for {} species from {} supply types",
        combined.len(),
        chosen.len()
    );
    combined
}

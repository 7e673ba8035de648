use crate::models::category::CategoryIndex;
use crate::models::portfolio::Portfolio;

/// Builds the category index from the tags attached to each holding.
///
/// Every symbol lands in the universal category plus one list per explicit
/// tag; lists keep portfolio order. Pure and idempotent.
pub fn categorize(portfolio: &Portfolio) -> CategoryIndex {
    let mut index = CategoryIndex::new();
    for holding in portfolio {
        for category in holding.all_categories() {
            index.push(category, &holding.symbol);
        }
    }
    index
}

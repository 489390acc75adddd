//! Order summary command.
//!
//! # Usage
//!
//! ```bash
//! tienda-cli summary cart.json
//! ```
//!
//! The cart file is a JSON array of line items as stored by the storefront:
//!
//! ```json
//! [{"product": {"id": 1, "name": "Polera", "base_price": "1000"}, "quantity": 2}]
//! ```

use std::fmt::Write as _;
use std::path::Path;

use tienda_core::{OrderSummary, PriceResolution, format_clp, summarize};

use super::{InputError, read_cart};

/// Print the order summary for the cart at `path`.
#[allow(clippy::print_stdout)]
pub async fn run(path: &Path) -> Result<(), InputError> {
    let items = read_cart(path).await?;
    let summary = summarize(&items);

    print!("{}", render(&summary));

    let malformed = summary.malformed_lines().count();
    if malformed > 0 {
        tracing::warn!(malformed, "Some prices could not be read and count as zero");
    }
    Ok(())
}

/// Render the summary as a plain-text table.
pub fn render(summary: &OrderSummary) -> String {
    let mut out = String::new();

    for line in &summary.lines {
        let name = if line.name.is_empty() {
            "(sin nombre)"
        } else {
            line.name.as_str()
        };
        let flag = match &line.resolution {
            PriceResolution::Malformed { raw, .. } => format!("  [precio ilegible: {raw}]"),
            PriceResolution::Missing => "  [sin precio]".to_string(),
            PriceResolution::BasePrice(_) | PriceResolution::Price(_) => String::new(),
        };
        let _ = writeln!(
            out,
            "{name:<32} {qty:>4} x {unit:>12} = {total:>12}{flag}",
            qty = line.quantity,
            unit = format_clp(line.unit_price),
            total = format_clp(line.line_total),
        );
    }

    let totals = &summary.totals;
    let _ = writeln!(out, "{:<32} {:>34}", "Subtotal", format_clp(totals.subtotal));
    let _ = writeln!(out, "{:<32} {:>34}", "Envío", format_clp(totals.shipping_fee));
    let _ = writeln!(out, "{:<32} {:>34}", "Total", format_clp(totals.total));
    out
}

//! Text and JSON rendering.

use anyhow::Result;
use print_quote::{MaterialCatalog, MaterialProfile, PriceQuote};
use serde::Serialize;

#[derive(Serialize)]
struct QuoteOutput<'a> {
    #[serde(flatten)]
    quote: &'a PriceQuote,
    price_eur_rounded: f64,
}

/// Render a quote for the terminal or as JSON.
pub fn quote(quote: &PriceQuote, json: bool) -> Result<String> {
    if json {
        let output = QuoteOutput {
            quote,
            price_eur_rounded: quote.rounded_price_eur(),
        };
        return Ok(serde_json::to_string_pretty(&output)?);
    }

    let mut text = format!(
        "Material:   {}\nInfill:     {}%\nVolume:     {:.2} cm³\nWeight:     {:.2} g\nPrice:      {:.2} EUR",
        quote.material(),
        quote.infill_percent(),
        quote.volume_cm3(),
        quote.estimated_weight_g(),
        quote.rounded_price_eur(),
    );
    if quote.minimum_applied() {
        text.push_str(" (minimum price)");
    }
    Ok(text)
}

/// Render the material catalog.
pub fn materials(catalog: &MaterialCatalog, json: bool) -> Result<String> {
    if json {
        let list: Vec<&MaterialProfile> = catalog.iter().collect();
        return Ok(serde_json::to_string_pretty(&list)?);
    }

    let mut text = format!("{:<8} {:>10} {:>14}", "Material", "EUR/g", "g/cm³");
    for profile in catalog.iter() {
        text.push_str(&format!(
            "\n{:<8} {:>10.2} {:>14.2}",
            profile.name(),
            profile.price_per_gram(),
            profile.density_g_per_cm3()
        ));
    }
    Ok(text)
}

// CSV export of one product's localized prices across every country.
use crate::error::ExportError;
use crate::pricing::{format_amount, format_ratio, ppp_ratio, psychological_round, Rates};
use csv::{Terminator, WriterBuilder};
use serde::Serialize;
use shared::utils::slugify;
use shared::{Country, Product};
use std::path::{Path, PathBuf};

pub const EXPORT_HEADER: [&str; 6] = [
    "Country",
    "Currency",
    "PPP (target/home)",
    "Lazy Bank Conversion",
    "PPP Power Price",
    "Final (.99 rounded)",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

impl ExportFile {
    pub fn write_to_dir(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

pub fn export_file_name(product_name: &str) -> String {
    format!("{}-global-pricing.csv", slugify(product_name))
}

/// Home first, then the remaining `countries` in their given order.
pub fn export_product(
    product: &Product,
    base_currency: &str,
    home: &Country,
    countries: &[Country],
    rates: Option<&Rates>,
) -> Result<ExportFile, ExportError> {
    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record([format!("Product: {}", product.name)])?;
    wtr.write_record([format!("Base Price: {}", format_amount(product.price, base_currency))])?;
    wtr.write_record([""])?;
    wtr.write_record(EXPORT_HEADER)?;

    let ordered = std::iter::once(home).chain(countries.iter().filter(|c| c.iso3 != home.iso3));
    for country in ordered {
        let is_home = country.iso3 == home.iso3;
        let ratio = ppp_ratio(home, country);
        let lazy = rates
            .and_then(|r| r.get(country.currency))
            .map(|rate| format_amount(product.price * rate, country.currency))
            .unwrap_or_else(|| "N/A".to_string());
        let ppp_price = product.price * ratio;
        let label = format!("{} {}{}", country.flag(), country.name, if is_home { " (Home)" } else { "" });

        wtr.write_record([
            label,
            country.currency.to_string(),
            format_ratio(ratio),
            lazy,
            format_amount(ppp_price, country.currency),
            format_amount(psychological_round(ppp_price), country.currency),
        ])?;
    }

    let bytes = wtr.into_inner().map_err(|e| ExportError::Buffer(e.to_string()))?;
    let contents = String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))?;
    Ok(ExportFile {
        file_name: export_file_name(&product.name),
        contents,
    })
}

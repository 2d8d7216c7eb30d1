use crate::error::CsvParseError;
use serde::Serialize;
use shared::Product;

/// Template offered to users who don't have a file at hand.
pub const SAMPLE_CSV: &str = "Product Name,Price\nLong Black Jeans,49\nLinen Summer Shirt,35\nLeather Ankle Boots,120\nCotton Basic Tee,25\nWool Blend Coat,189\n";
pub const SAMPLE_FILE_NAME: &str = "sample-products.csv";

pub const NAME_KEYWORDS: [&str; 4] = ["name", "title", "product", "item"];
pub const PRICE_KEYWORDS: [&str; 4] = ["price", "amount", "cost", "value"];

const PREVIEW_ROWS: usize = 3;

// Module for turning messy price cells into numbers
pub mod price_format {
    /// Keeps only ASCII digits and '.', then reads the leading number.
    /// Returns None unless the result is finite and strictly positive.
    pub fn clean_price(raw: &str) -> Option<f64> {
        let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
        let value: f64 = leading_number(&cleaned)?.parse().ok()?;
        (value.is_finite() && value > 0.0).then_some(value)
    }

    // "1.2.3" reads as 1.2, the way a lenient float parse stops at the first bad char.
    fn leading_number(s: &str) -> Option<&str> {
        let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
        let mut end = int_len;
        if s.as_bytes().get(int_len) == Some(&b'.') {
            let frac_len = s[int_len + 1..].bytes().take_while(u8::is_ascii_digit).count();
            if int_len == 0 && frac_len == 0 {
                return None;
            }
            end = int_len + 1 + frac_len;
        }
        if end == 0 {
            return None;
        }
        Some(&s[..end])
    }

}

pub use price_format::clean_price;

/// Index of the first header containing any keyword. Keywords are tried in
/// priority order, headers left to right, case-insensitively.
pub fn guess_index(headers: &[String], keywords: &[&str]) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    keywords
        .iter()
        .find_map(|kw| lowered.iter().position(|col| col.contains(kw)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub name: usize,
    pub price: usize,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping { name: 0, price: 1 }
    }
}

impl ColumnMapping {
    /// Header-based guess. A collision between the two guesses is kept as-is
    /// so the configure step can report it.
    pub fn infer(headers: &[String]) -> Self {
        let name = guess_index(headers, &NAME_KEYWORDS).unwrap_or(0);
        let price = guess_index(headers, &PRICE_KEYWORDS).unwrap_or(if name == 1 { 0 } else { 1 });
        ColumnMapping { name, price }
    }
}

/// Header plus data rows from one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    pub fn parse(text: &str) -> Result<Self, CsvParseError> {
        if text.trim().is_empty() {
            return Err(CsvParseError::EmptyFile);
        }
        let mut rows = parse_rows(text);
        if rows.len() < 2 {
            return Err(CsvParseError::InsufficientRows);
        }
        if rows[0].len() < 2 {
            return Err(CsvParseError::InsufficientColumns);
        }
        let data = rows.split_off(1);
        let headers = rows.remove(0);
        tracing::debug!(columns = headers.len(), rows = data.len(), "Parsed CSV table");
        Ok(ParsedTable { headers, rows: data })
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn preview(&self) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(PREVIEW_ROWS)]
    }

    pub fn hidden_row_count(&self) -> usize {
        self.rows.len().saturating_sub(PREVIEW_ROWS)
    }

    /// Rows with an empty name or an unusable price are skipped.
    pub fn products(&self, mapping: ColumnMapping) -> Vec<Product> {
        let products: Vec<Product> = self
            .rows
            .iter()
            .filter_map(|row| {
                let name = row.get(mapping.name).map(|n| n.trim()).filter(|n| !n.is_empty())?;
                let raw_price = row.get(mapping.price).map(|p| p.trim()).unwrap_or("");
                let price = clean_price(raw_price)?;
                Some(Product { name: name.to_string(), price })
            })
            .collect();
        let skipped = self.rows.len() - products.len();
        if skipped > 0 {
            tracing::debug!(skipped, kept = products.len(), "Skipped rows without a name or valid price");
        }
        products
    }
}

/// Splits text into rows of trimmed cells, dropping blank lines and rows
/// whose cells are all empty. Quoting is handled per line.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(split_line)
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect()
}

fn split_line(line: &str) -> Vec<String> {
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                row.push(cell.trim().to_string());
                cell.clear();
            }
            _ => cell.push(ch),
        }
    }
    row.push(cell.trim().to_string());
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_rows_handles_quotes_and_escapes() {
        let rows = parse_rows("a,\"b, c\",\"say \"\"hi\"\"\"\n");
        assert_eq!(rows, vec![vec!["a".to_string(), "b, c".to_string(), "say \"hi\"".to_string()]]);
    }

    #[test]
    fn test_parse_rows_universal_newlines_and_trimming() {
        let rows = parse_rows("h1 , h2\r\n x ,1\r y,2\n");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], headers(&["h1", "h2"]));
        assert_eq!(rows[1], headers(&["x", "1"]));
        assert_eq!(rows[2], headers(&["y", "2"]));
    }

    #[test]
    fn test_parse_rows_skips_blank_and_empty_rows() {
        let rows = parse_rows("h1,h2\n\n   \n , \na,1\n,,\n");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_row_count_matches_non_blank_lines_minus_header() {
        let text = "Product Name,Price\nA,1\n\nB,2\n , \nC,3\n";
        let table = ParsedTable::parse(text).unwrap();
        // 5 non-blank lines, minus header, minus one all-empty row
        assert_eq!(table.rows.len(), 3);
    }

    #[test]
    fn test_parse_empty_file() {
        assert_eq!(ParsedTable::parse("  \n\t "), Err(CsvParseError::EmptyFile));
    }

    #[test]
    fn test_parse_header_only_is_insufficient_rows() {
        assert_eq!(ParsedTable::parse("Product Name,Price\n"), Err(CsvParseError::InsufficientRows));
    }

    #[test]
    fn test_parse_single_column_is_insufficient_columns() {
        assert_eq!(ParsedTable::parse("Name\nJeans\n"), Err(CsvParseError::InsufficientColumns));
    }

    #[test]
    fn test_sample_csv_parses() {
        let table = ParsedTable::parse(SAMPLE_CSV).unwrap();
        assert_eq!(table.headers, headers(&["Product Name", "Price"]));
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.preview().len(), 3);
        assert_eq!(table.hidden_row_count(), 2);
    }

    #[test]
    fn test_guess_index_keyword_priority() {
        let h = headers(&["SKU", "Item", "Title", "Cost"]);
        // "title" outranks "item" even though Item comes first
        assert_eq!(guess_index(&h, &NAME_KEYWORDS), Some(2));
        assert_eq!(guess_index(&h, &PRICE_KEYWORDS), Some(3));
        assert_eq!(guess_index(&h, &["missing"]), None);
    }

    #[test]
    fn test_infer_mapping_from_headers() {
        let mapping = ColumnMapping::infer(&headers(&["SKU", "Retail Price", "Product Name"]));
        assert_eq!(mapping, ColumnMapping { name: 2, price: 1 });
    }

    #[test]
    fn test_infer_mapping_fallbacks() {
        assert_eq!(ColumnMapping::infer(&headers(&["a", "b", "c"])), ColumnMapping { name: 0, price: 1 });
        // name lands on column 1, so the price fallback moves to 0
        assert_eq!(ColumnMapping::infer(&headers(&["x", "label name"])), ColumnMapping { name: 1, price: 0 });
    }

    #[test]
    fn test_infer_mapping_keeps_collision() {
        let mapping = ColumnMapping::infer(&headers(&["Product Price", "Notes"]));
        assert_eq!(mapping.name, mapping.price);
    }

    #[test]
    fn test_products_skip_invalid_rows() {
        let text = "Name,Price\nJeans,$49\n,10\nShirt,free\nBoots,120\nTee\n";
        let table = ParsedTable::parse(text).unwrap();
        let products = table.products(ColumnMapping { name: 0, price: 1 });
        assert_eq!(
            products,
            vec![
                Product { name: "Jeans".to_string(), price: 49.0 },
                Product { name: "Boots".to_string(), price: 120.0 },
            ]
        );
    }
}

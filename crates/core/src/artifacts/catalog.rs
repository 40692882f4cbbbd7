use std::collections::HashMap;
use std::io;

use serde::{Deserialize, Serialize};

/// Descriptive attributes shown next to a recommended item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub title: String,
    pub brand: String,
    pub category_id: String,
    pub price: String,
    pub image_url: Option<String>,
}

impl ProductMetadata {
    /// Category, if the record carries a non-blank one.
    pub fn category(&self) -> Option<&str> {
        let category = self.category_id.trim();
        (!category.is_empty()).then_some(category)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.brand.is_empty()
            && self.category_id.is_empty()
            && self.price.is_empty()
            && self.image_url.is_none()
    }
}

/// Product metadata indexed both by item code and by external item id.
#[derive(Clone, Debug, Default)]
pub struct ProductCatalog {
    by_code: HashMap<u32, ProductMetadata>,
    by_item_id: HashMap<String, ProductMetadata>,
}

struct Columns {
    item_code: Option<usize>,
    item_id: Option<usize>,
    title: Option<usize>,
    category_id: Option<usize>,
    brand: Option<usize>,
    price: Option<usize>,
    image_url: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|header| header.trim() == name);
        Self {
            item_code: find("item_code"),
            item_id: find("item_id"),
            title: find("title"),
            category_id: find("category_id"),
            brand: find("brand"),
            price: find("price"),
            image_url: find("image_url"),
        }
    }
}

fn field(record: &csv::StringRecord, column: Option<usize>) -> String {
    column.and_then(|index| record.get(index)).map(str::trim).unwrap_or_default().to_string()
}

/// Codes exported through a dataframe can arrive as `"12.0"`.
fn parse_item_code(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(code) = raw.parse::<u32>() {
        return Some(code);
    }
    let value = raw.parse::<f64>().ok()?;
    let integral = value.is_finite() && value.fract() == 0.0;
    (integral && value >= 0.0 && value <= f64::from(u32::MAX)).then_some(value as u32)
}

impl ProductCatalog {
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns = Columns::locate(reader.headers()?);
        let mut catalog = Self::default();

        for record in reader.records() {
            let record = record?;
            let image_url = field(&record, columns.image_url);
            let metadata = ProductMetadata {
                title: field(&record, columns.title),
                brand: field(&record, columns.brand),
                category_id: field(&record, columns.category_id),
                price: field(&record, columns.price),
                image_url: (!image_url.is_empty()).then_some(image_url),
            };

            if let Some(code) = parse_item_code(&field(&record, columns.item_code)) {
                catalog.by_code.insert(code, metadata.clone());
            }
            let item_id = field(&record, columns.item_id);
            if !item_id.is_empty() {
                catalog.by_item_id.insert(item_id, metadata);
            }
        }

        Ok(catalog)
    }

    pub fn by_code(&self, code: u32) -> Option<&ProductMetadata> {
        self.by_code.get(&code)
    }

    pub fn by_item_id(&self, item_id: &str) -> Option<&ProductMetadata> {
        self.by_item_id.get(item_id)
    }

    pub fn code_entries(&self) -> usize {
        self.by_code.len()
    }

    pub fn item_id_entries(&self) -> usize {
        self.by_item_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_item_code, ProductCatalog};

    const CSV: &str = "\
item_code,item_id,title,category_id,brand,price,image_url
0,p1000,Trail Shoe,shoes,Stride,59.90,https://img.example/p1000.png
1.0,p1001,Rain Jacket,outerwear,Northline,120.00,
,p2000,Gift Card,,House,25.00,
";

    #[test]
    fn indexes_rows_by_code_and_item_id() {
        let catalog = ProductCatalog::from_reader(CSV.as_bytes()).expect("valid csv");

        assert_eq!(catalog.code_entries(), 2);
        assert_eq!(catalog.item_id_entries(), 3);

        let jacket = catalog.by_code(1).expect("float-formatted code is indexed");
        assert_eq!(jacket.title, "Rain Jacket");
        assert_eq!(jacket.image_url, None);

        let card = catalog.by_item_id("p2000").expect("indexed by item id only");
        assert_eq!(card.category(), None);
        assert_eq!(
            catalog.by_item_id("p1000").and_then(|meta| meta.image_url.as_deref()),
            Some("https://img.example/p1000.png")
        );
    }

    #[test]
    fn missing_columns_yield_empty_fields() {
        let catalog = ProductCatalog::from_reader("item_id,title\np1,Mug\n".as_bytes())
            .expect("valid csv");

        let mug = catalog.by_item_id("p1").expect("indexed");
        assert_eq!(mug.title, "Mug");
        assert!(mug.brand.is_empty());
        assert_eq!(catalog.code_entries(), 0);
    }

    #[test]
    fn later_rows_win_on_duplicate_keys() {
        let catalog =
            ProductCatalog::from_reader("item_code,item_id,title\n3,p3,Old\n3,p3,New\n".as_bytes())
                .expect("valid csv");

        assert_eq!(catalog.by_code(3).map(|meta| meta.title.as_str()), Some("New"));
        assert_eq!(catalog.by_item_id("p3").map(|meta| meta.title.as_str()), Some("New"));
    }

    #[test]
    fn item_codes_tolerate_dataframe_formatting() {
        assert_eq!(parse_item_code("12"), Some(12));
        assert_eq!(parse_item_code(" 12.0 "), Some(12));
        assert_eq!(parse_item_code("12.5"), None);
        assert_eq!(parse_item_code("nan"), None);
        assert_eq!(parse_item_code("-1"), None);
        assert_eq!(parse_item_code(""), None);
    }
}

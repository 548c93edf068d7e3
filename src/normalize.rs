//! Shape checks and field coercion for raw menu payloads.
//!
//! A payload is accepted only when both `categories` and `menuItems` are
//! arrays. Individual records that cannot be coerced are dropped without
//! failing the payload; record order is preserved.
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ValidationError;
use crate::model::{Category, MenuDataset, MenuItem, DEFAULT_DISPLAY_ORDER};

/// Largest integer an IEEE double represents exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

/// True when `raw` is an object holding `categories` and `menuItems` arrays.
pub fn is_valid_shape(raw: &Value) -> bool {
    matches!(raw.get("categories"), Some(Value::Array(_)))
        && matches!(raw.get("menuItems"), Some(Value::Array(_)))
}

/// Parse a JSON document and normalize it.
pub fn normalize_str(text: &str) -> Result<MenuDataset, ValidationError> {
    let raw: Value =
        serde_json::from_str(text).map_err(|e| ValidationError::NotJson(e.to_string()))?;
    normalize(&raw)
}

pub fn normalize(raw: &Value) -> Result<MenuDataset, ValidationError> {
    let (Some(Value::Array(raw_categories)), Some(Value::Array(raw_items))) =
        (raw.get("categories"), raw.get("menuItems"))
    else {
        return Err(ValidationError::MalformedPayload);
    };

    let categories: Vec<Category> = raw_categories
        .iter()
        .filter_map(Value::as_object)
        .filter_map(normalize_category)
        .collect();
    let menu_items: Vec<MenuItem> = raw_items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(normalize_item)
        .collect();

    let dropped_categories = raw_categories.len() - categories.len();
    let dropped_items = raw_items.len() - menu_items.len();
    if dropped_categories > 0 || dropped_items > 0 {
        debug!(dropped_categories, dropped_items, "dropped malformed menu records");
    }

    Ok(MenuDataset {
        categories,
        menu_items,
    })
}

fn normalize_category(obj: &Map<String, Value>) -> Option<Category> {
    let name = non_blank_name(obj)?;
    let id = coerce_integer(obj.get("id"))?;
    Some(Category {
        id,
        name,
        description: coerce_text(obj.get("description")),
        display_order: display_order(obj),
        is_active: obj.get("isActive") == Some(&Value::Bool(true)),
    })
}

fn normalize_item(obj: &Map<String, Value>) -> Option<MenuItem> {
    let name = non_blank_name(obj)?;
    let id = coerce_integer(obj.get("id"))?;
    let category_id = coerce_integer(obj.get("categoryId"))?;
    let price_euro = coerce_number(obj.get("priceEuro")).filter(|p| *p >= 0.0)?;
    Some(MenuItem {
        id,
        category_id,
        name,
        description: coerce_text(obj.get("description")),
        // -0.0 would serialize differently from 0.0
        price_euro: price_euro + 0.0,
        is_available: obj.get("isAvailable") != Some(&Value::Bool(false)),
        is_vegetarian: obj.get("isVegetarian") == Some(&Value::Bool(true)),
        display_order: display_order(obj),
    })
}

fn non_blank_name(obj: &Map<String, Value>) -> Option<String> {
    obj.get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
}

fn display_order(obj: &Map<String, Value>) -> f64 {
    coerce_number(obj.get("displayOrder")).map_or(DEFAULT_DISPLAY_ORDER, |order| order + 0.0)
}

/// Finite number from a JSON number or a numeric string.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn coerce_integer(value: Option<&Value>) -> Option<i64> {
    if let Some(Value::Number(n)) = value {
        if let Some(i) = n.as_i64() {
            return Some(i);
        }
    }
    let n = coerce_number(value)?;
    (n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER).then_some(n as i64)
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_payload_missing_either_array() {
        assert_eq!(
            normalize(&json!({ "categories": [] })),
            Err(ValidationError::MalformedPayload)
        );
        assert_eq!(
            normalize(&json!({ "menuItems": [] })),
            Err(ValidationError::MalformedPayload)
        );
        assert_eq!(
            normalize(&json!({ "categories": {}, "menuItems": [] })),
            Err(ValidationError::MalformedPayload)
        );
        assert_eq!(normalize(&json!([])), Err(ValidationError::MalformedPayload));
        assert_eq!(normalize(&Value::Null), Err(ValidationError::MalformedPayload));
    }

    #[test]
    fn accepts_empty_arrays() {
        let ds = normalize(&json!({ "categories": [], "menuItems": [] })).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn non_json_text_is_rejected() {
        assert!(matches!(
            normalize_str("<html>oops</html>"),
            Err(ValidationError::NotJson(_))
        ));
    }

    #[test]
    fn item_defaults_apply_when_fields_missing() {
        let ds = normalize(&json!({
            "categories": [],
            "menuItems": [{ "id": 1, "categoryId": 2, "name": "Soup", "priceEuro": 4 }]
        }))
        .unwrap();
        let item = &ds.menu_items[0];
        assert!(item.is_available);
        assert!(!item.is_vegetarian);
        assert_eq!(item.display_order, DEFAULT_DISPLAY_ORDER);
        assert_eq!(item.description, "");
    }

    #[test]
    fn only_explicit_flags_override_defaults() {
        let ds = normalize(&json!({
            "categories": [],
            "menuItems": [
                { "id": 1, "categoryId": 1, "name": "A", "priceEuro": 1, "isAvailable": "false", "isVegetarian": "true" },
                { "id": 2, "categoryId": 1, "name": "B", "priceEuro": 1, "isAvailable": false, "isVegetarian": true }
            ]
        }))
        .unwrap();
        assert!(ds.menu_items[0].is_available);
        assert!(!ds.menu_items[0].is_vegetarian);
        assert!(!ds.menu_items[1].is_available);
        assert!(ds.menu_items[1].is_vegetarian);
    }

    #[test]
    fn category_active_only_when_explicitly_true() {
        let ds = normalize(&json!({
            "categories": [
                { "id": 1, "name": "Explicit", "isActive": true },
                { "id": 2, "name": "Missing" },
                { "id": 3, "name": "Truthy", "isActive": 1 }
            ],
            "menuItems": []
        }))
        .unwrap();
        let active: Vec<bool> = ds.categories.iter().map(|c| c.is_active).collect();
        assert_eq!(active, vec![true, false, false]);
        assert_eq!(ds.categories[1].display_order, DEFAULT_DISPLAY_ORDER);
    }

    #[test]
    fn drops_malformed_records_and_keeps_order() {
        let ds = normalize(&json!({
            "categories": [
                { "id": 3, "name": "Third" },
                { "id": "x", "name": "Bad id" },
                { "id": 4, "name": "   " },
                { "id": 5 },
                null,
                { "id": "1", "name": "First" }
            ],
            "menuItems": [
                { "id": 10, "categoryId": 3, "name": "Ok", "priceEuro": "7.5" },
                { "id": 11, "categoryId": 3, "name": "No price" },
                { "id": 12, "categoryId": 3, "name": "Bad price", "priceEuro": "cheap" },
                { "id": 13, "categoryId": 3, "name": "Negative", "priceEuro": -1 },
                { "id": 14, "name": "No category", "priceEuro": 1 },
                { "id": 15.5, "categoryId": 3, "name": "Fractional id", "priceEuro": 1 },
                { "id": 16, "categoryId": 3, "name": 42, "priceEuro": 1 },
                "garbage",
                { "id": 17, "categoryId": 1, "name": "Last", "priceEuro": 0 }
            ]
        }))
        .unwrap();
        let cat_ids: Vec<i64> = ds.categories.iter().map(|c| c.id).collect();
        assert_eq!(cat_ids, vec![3, 1]);
        let item_ids: Vec<i64> = ds.menu_items.iter().map(|i| i.id).collect();
        assert_eq!(item_ids, vec![10, 17]);
        assert_eq!(ds.menu_items[0].price_euro, 7.5);
    }

    #[test]
    fn display_order_keeps_finite_numbers_and_defaults_the_rest() {
        let ds = normalize(&json!({
            "categories": [
                { "id": 1, "name": "a", "displayOrder": "2" },
                { "id": 2, "name": "b", "displayOrder": null },
                { "id": 3, "name": "c", "displayOrder": "soon" },
                { "id": 4, "name": "d", "displayOrder": 1.5 },
                { "id": 5, "name": "e", "displayOrder": -3 },
                { "id": 6, "name": "f", "displayOrder": 1e300 },
                { "id": 7, "name": "g", "displayOrder": true },
                { "id": 8, "name": "h", "displayOrder": "1e999" }
            ],
            "menuItems": []
        }))
        .unwrap();
        let orders: Vec<f64> = ds.categories.iter().map(|c| c.display_order).collect();
        assert_eq!(orders, vec![2.0, 999.0, 999.0, 1.5, -3.0, 1e300, 999.0, 999.0]);
    }

    #[test]
    fn description_is_coerced_to_text() {
        let ds = normalize(&json!({
            "categories": [
                { "id": 1, "name": "a", "description": null },
                { "id": 2, "name": "b", "description": 12 },
                { "id": 3, "name": "c", "description": ["x"] }
            ],
            "menuItems": []
        }))
        .unwrap();
        let descs: Vec<&str> = ds.categories.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(descs, vec!["", "12", ""]);
    }

    #[test]
    fn names_are_kept_untrimmed() {
        let ds = normalize(&json!({
            "categories": [{ "id": 1, "name": "  Wraps " }],
            "menuItems": []
        }))
        .unwrap();
        assert_eq!(ds.categories[0].name, "  Wraps ");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(&json!({
            "categories": [
                { "id": "2", "name": "Wraps", "displayOrder": "2", "isActive": true, "extra": 1 },
                { "id": 1, "name": "Salads", "description": 5 }
            ],
            "menuItems": [
                { "id": 201, "categoryId": "2", "name": "Wrap", "priceEuro": "7.95", "isVegan": true },
                { "id": 101, "categoryId": 1, "name": "Salad", "priceEuro": 8.1, "isAvailable": false, "isVegetarian": true, "displayOrder": 3 },
                { "id": 102, "categoryId": 1, "name": "Free", "priceEuro": -0.0 }
            ]
        }))
        .unwrap();
        let twice = normalize(&serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, twice);

        let text = serde_json::to_string(&once).unwrap();
        assert_eq!(normalize_str(&text).unwrap(), once);
    }
}

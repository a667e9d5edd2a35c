//! Lenient projection of search responses into pages of [`Item`]s.
//!
//! The upstream payload is read field by field: a missing or mistyped field becomes
//! `null` (or `0` for numbers) instead of failing the page.

use serde_json::Value;
use vitrine_core::{Item, SearchPage};

/// Read `paging.total` and `results` from a response body.
pub fn parse_page(body: &Value) -> SearchPage {
    let total = number_at(body, "/paging/total");
    let total = if total.is_finite() && total > 0.0 { total as u64 } else { 0 };

    let items = body
        .pointer("/results")
        .and_then(Value::as_array)
        .map(|results| results.iter().map(format_item).collect())
        .unwrap_or_default();

    SearchPage { total, items }
}

/// Project one upstream record into an [`Item`].
pub fn format_item(entry: &Value) -> Item {
    Item {
        id: string_at(entry, "/id"),
        name: string_at(entry, "/title"),
        link: string_at(entry, "/permalink"),
        price: number_at(entry, "/price"),
        currency: string_at(entry, "/currency_id"),
        store: string_at(entry, "/seller/eshop/nick_name"),
        state: string_at(entry, "/address/state_name"),
    }
}

fn string_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(Value::as_str).map(str::to_string)
}

fn number_at(value: &Value, pointer: &str) -> f64 {
    value.pointer(pointer).and_then(Value::as_f64).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> Value {
        json!({
            "paging": {"total": 1234, "offset": 0, "limit": 50},
            "results": [
                {
                    "id": "MLB100",
                    "title": "Smart TV 50",
                    "permalink": "https://produto.mercadolivre.com.br/MLB-100",
                    "price": 2199.9,
                    "currency_id": "BRL",
                    "seller": {"id": 1, "eshop": {"nick_name": "LOJA OFICIAL"}},
                    "address": {"state_id": "BR-SP", "state_name": "São Paulo"}
                },
                {
                    "id": "MLB101",
                    "title": "Suporte TV",
                    "price": "free",
                    "seller": {"id": 2, "eshop": null}
                },
                {"title": "no id"}
            ]
        })
    }

    #[test]
    fn test_parse_page() {
        let page = parse_page(&fixture());
        assert_eq!(page.total, 1234);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[2].id, None);
    }

    #[test]
    fn test_format_full_record() {
        let page = parse_page(&fixture());
        let item = &page.items[0];
        assert_eq!(item.id.as_deref(), Some("MLB100"));
        assert_eq!(item.name.as_deref(), Some("Smart TV 50"));
        assert_eq!(item.link.as_deref(), Some("https://produto.mercadolivre.com.br/MLB-100"));
        assert_eq!(item.price, 2199.9);
        assert_eq!(item.currency.as_deref(), Some("BRL"));
        assert_eq!(item.store.as_deref(), Some("LOJA OFICIAL"));
        assert_eq!(item.state.as_deref(), Some("São Paulo"));
    }

    #[test]
    fn test_format_sparse_record() {
        let item = format_item(&fixture()["results"][1]);
        assert_eq!(item.id.as_deref(), Some("MLB101"));
        assert_eq!(item.price, 0.0);
        assert!(item.link.is_none());
        assert!(item.store.is_none());
        assert!(item.state.is_none());
    }

    #[test]
    fn test_non_string_id_is_absent() {
        let item = format_item(&json!({"id": 42, "title": "numeric id"}));
        assert!(item.id.is_none());
    }

    #[test]
    fn test_malformed_body_is_empty_page() {
        for body in [json!({}), json!({"paging": {"total": "many"}, "results": {}}), json!([1, 2])] {
            let page = parse_page(&body);
            assert_eq!(page.total, 0);
            assert!(page.items.is_empty());
        }
    }

    #[test]
    fn test_negative_total_is_zero() {
        let page = parse_page(&json!({"paging": {"total": -5}, "results": [{"id": "MLB1"}]}));
        assert_eq!(page.total, 0);
        assert_eq!(page.items.len(), 1);
    }
}

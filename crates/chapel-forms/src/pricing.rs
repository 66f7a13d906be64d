//! Price aggregation
//!
//! Walks the visible fields of a schema in order and sums what each one
//! contributes for the current values. Missing or non-numeric inputs
//! contribute nothing; nothing here returns an error.

use crate::js;
use crate::money;
use crate::schema::{DateMode, DatePricing, FieldDescriptor, FieldKind, FieldOption, FormValues};
use crate::visibility::is_visible;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// One field's non-zero contribution to the total
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineItem {
    pub field_id: String,
    pub name: String,
    pub label: String,
    #[serde(with = "money::amount")]
    pub amount: Decimal,
}

/// Price of a single day: specific date, then weekday override, then base
pub fn weekday_price(pricing: &DatePricing, day: NaiveDate) -> Decimal {
    let key = day.format("%Y-%m-%d").to_string();
    if let Some(price) = pricing.specific_dates.get(&key) {
        return *price;
    }
    let weekday = day.weekday().num_days_from_sunday() as u8;
    if let Some(price) = pricing.weekday_overrides.get(&weekday) {
        return *price;
    }
    pricing.base_per_day.unwrap_or_default()
}

/// What a field contributes for `values`, ignoring visibility
pub fn field_contribution(field: &FieldDescriptor, values: &FormValues) -> Decimal {
    let value = values.get(&field.name);
    match &field.kind {
        FieldKind::Price { amount, .. } => amount.unwrap_or_default(),
        FieldKind::Checkbox { price } | FieldKind::Switch { price } => {
            if js::is_truthy(value) {
                price.unwrap_or_default()
            } else {
                Decimal::ZERO
            }
        }
        FieldKind::Radio { options } => value.map(|v| option_price(options, v)).unwrap_or_default(),
        FieldKind::Select { options, multiple: false } => {
            value.map(|v| option_price(options, v)).unwrap_or_default()
        }
        FieldKind::Select { options, multiple: true } => match value {
            Some(Value::Array(selected)) => saturating_sum(selected.iter().map(|v| option_price(options, v))),
            Some(single) => option_price(options, single),
            None => Decimal::ZERO,
        },
        FieldKind::Date { mode, pricing: Some(pricing) } if pricing.enabled => {
            value.map(|v| date_price(*mode, pricing, v)).unwrap_or_default()
        }
        _ => Decimal::ZERO,
    }
}

fn option_price(options: &[FieldOption], selected: &Value) -> Decimal {
    options
        .iter()
        .find(|o| o.matches(selected))
        .and_then(|o| o.price)
        .unwrap_or_default()
}

fn date_price(mode: DateMode, pricing: &DatePricing, value: &Value) -> Decimal {
    match mode {
        DateMode::Single => single_date(value)
            .map(|day| weekday_price(pricing, day))
            .unwrap_or_default(),
        DateMode::Range => {
            let Some((from, to)) = date_range(value) else {
                return Decimal::ZERO;
            };
            saturating_sum(
                from.iter_days()
                    .take_while(|day| *day <= to)
                    .map(|day| weekday_price(pricing, day)),
            )
        }
    }
}

/// Leading `yyyy-MM-dd` of a date or datetime string
pub fn parse_day(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    let head = s.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn single_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Object(range) => range.get("from").and_then(parse_day),
        other => parse_day(other),
    }
}

/// `{from, to}`; a range still missing its end counts as the single start day
pub fn date_range(value: &Value) -> Option<(NaiveDate, NaiveDate)> {
    let range = value.as_object()?;
    let from = range.get("from").and_then(parse_day)?;
    let to = range.get("to").and_then(parse_day).unwrap_or(from);
    Some((from, to))
}

/// Non-zero contributions of visible fields, in schema order
pub fn line_items(fields: &[FieldDescriptor], values: &FormValues) -> Vec<LineItem> {
    fields
        .iter()
        .filter(|f| is_visible(f.visible_if.as_deref(), values))
        .filter_map(|f| {
            let amount = field_contribution(f, values);
            (!amount.is_zero()).then(|| LineItem {
                field_id: f.id.clone(),
                name: f.name.clone(),
                label: f.label.clone(),
                amount,
            })
        })
        .collect()
}

/// Total price of the visible fields for `values`
pub fn compute_total(fields: &[FieldDescriptor], values: &FormValues) -> Decimal {
    saturating_sum(line_items(fields, values).iter().map(|item| item.amount))
}

/// Sum that clamps to `Decimal::MAX`/`Decimal::MIN` instead of overflowing
fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).unwrap_or_else(|| {
            warn!(%total, %amount, "price total overflowed, clamping");
            if amount.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        })
    })
}

/// Whether any field can carry a price, which decides if a total is shown
pub fn has_pricing(fields: &[FieldDescriptor]) -> bool {
    fields.iter().any(|f| match &f.kind {
        FieldKind::Price { .. } => true,
        FieldKind::Checkbox { price } | FieldKind::Switch { price } => price.is_some(),
        FieldKind::Select { options, .. } | FieldKind::Radio { options } => {
            options.iter().any(|o| o.price.is_some())
        }
        FieldKind::Date { pricing, .. } => pricing.as_ref().is_some_and(|p| p.enabled),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn values(v: Value) -> FormValues {
        v.as_object().cloned().unwrap_or_default()
    }

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn stay_field(mode: DateMode, pricing: DatePricing) -> FieldDescriptor {
        FieldDescriptor::new("f-stay", "stay", "Stay", FieldKind::Date { mode, pricing: Some(pricing) })
    }

    fn sunday_free() -> DatePricing {
        DatePricing {
            enabled: true,
            base_per_day: Some(dec(10)),
            weekday_overrides: BTreeMap::from([(0, dec(0))]),
            specific_dates: BTreeMap::new(),
        }
    }

    #[test]
    fn test_range_with_sunday_override() {
        // 2024-06-01 is a Saturday
        let fields = vec![stay_field(DateMode::Range, sunday_free())];
        let v = values(json!({ "stay": { "from": "2024-06-01", "to": "2024-06-03" } }));
        assert_eq!(compute_total(&fields, &v), dec(20));
    }

    #[test]
    fn test_specific_date_beats_weekday_override() {
        let mut pricing = sunday_free();
        pricing.specific_dates.insert("2024-06-02".into(), dec(7));
        assert_eq!(weekday_price(&pricing, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()), dec(7));
        assert_eq!(weekday_price(&pricing, NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()), dec(0));
        assert_eq!(weekday_price(&pricing, NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()), dec(10));
    }

    #[test]
    fn test_single_date_and_open_range() {
        let single = vec![stay_field(DateMode::Single, sunday_free())];
        assert_eq!(compute_total(&single, &values(json!({ "stay": "2024-06-01T00:00:00.000Z" }))), dec(10));

        let range = vec![stay_field(DateMode::Range, sunday_free())];
        assert_eq!(compute_total(&range, &values(json!({ "stay": { "from": "2024-06-01" } }))), dec(10));
        assert_eq!(
            compute_total(&range, &values(json!({ "stay": { "from": "2024-06-05", "to": "2024-06-01" } }))),
            dec(0)
        );
        assert_eq!(compute_total(&range, &values(json!({ "stay": "garbage" }))), dec(0));
    }

    #[test]
    fn test_disabled_date_pricing_contributes_nothing() {
        let mut pricing = sunday_free();
        pricing.enabled = false;
        let fields = vec![stay_field(DateMode::Single, pricing)];
        assert_eq!(compute_total(&fields, &values(json!({ "stay": "2024-06-01" }))), dec(0));
        assert!(!has_pricing(&fields));
    }

    #[test]
    fn test_static_only_schema_is_free() {
        let fields = vec![FieldDescriptor::new("s", "intro", "Intro", FieldKind::Static {
            content: Some("Welcome".into()),
        })];
        assert_eq!(compute_total(&fields, &values(json!({ "intro": 99 }))), dec(0));
        assert!(!has_pricing(&fields));
    }

    #[test]
    fn test_multi_select_sums_selected_options() {
        let fields = vec![FieldDescriptor::new("m", "extras", "Extras", FieldKind::Select {
            options: vec![
                FieldOption::new("Book", "book").priced(dec(5)),
                FieldOption::new("Mug", "mug").priced(dec(5)),
                FieldOption::new("Pen", "pen").priced(dec(3)),
            ],
            multiple: true,
        })];
        let v = values(json!({ "extras": ["book", "mug", "missing"] }));
        assert_eq!(compute_total(&fields, &v), dec(10));
    }

    #[test]
    fn test_flat_checkbox_and_radio() {
        let fields = vec![
            FieldDescriptor::new("p", "fee", "Fee", FieldKind::Price { amount: Some(dec(25)), currency: None }),
            FieldDescriptor::new("c", "lunch", "Lunch", FieldKind::Checkbox { price: Some(dec(8)) }),
            FieldDescriptor::new("s", "shirt", "Shirt", FieldKind::Switch { price: None }),
            FieldDescriptor::new("r", "tier", "Tier", FieldKind::Radio {
                options: vec![FieldOption::new("Basic", "basic"), FieldOption::new("Plus", "plus").priced(dec(15))],
            }),
        ];
        let v = values(json!({ "lunch": true, "shirt": true, "tier": "plus" }));
        assert_eq!(compute_total(&fields, &v), dec(48));

        let v = values(json!({ "lunch": false, "tier": "basic" }));
        assert_eq!(compute_total(&fields, &v), dec(25));
        assert!(has_pricing(&fields));
    }

    #[test]
    fn test_hidden_fields_are_skipped() {
        let fields = vec![
            FieldDescriptor::new("a", "attending", "Attending", FieldKind::Checkbox { price: None }),
            FieldDescriptor::new("b", "dinner", "Dinner", FieldKind::Checkbox { price: Some(dec(30)) })
                .visible_if("attending == true"),
        ];
        let v = values(json!({ "attending": false, "dinner": true }));
        assert_eq!(compute_total(&fields, &v), dec(0));

        let v = values(json!({ "attending": true, "dinner": true }));
        let items = line_items(&fields, &v);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "dinner");
        assert_eq!(items[0].amount, dec(30));
    }

    #[test]
    fn test_huge_prices_clamp_instead_of_overflowing() {
        let fields = vec![
            FieldDescriptor::new("a", "gift", "Gift", FieldKind::Price { amount: Some(Decimal::MAX), currency: None }),
            FieldDescriptor::new("b", "pledge", "Pledge", FieldKind::Price { amount: Some(Decimal::MAX), currency: None }),
        ];
        assert_eq!(compute_total(&fields, &FormValues::new()), Decimal::MAX);

        let pricing = DatePricing {
            enabled: true,
            base_per_day: Some(Decimal::from_i128_with_scale(10_i128.pow(25), 0)),
            weekday_overrides: BTreeMap::new(),
            specific_dates: BTreeMap::new(),
        };
        let range = vec![stay_field(DateMode::Range, pricing)];
        let v = values(json!({ "stay": { "from": "2000-01-01", "to": "2030-01-01" } }));
        assert_eq!(compute_total(&range, &v), Decimal::MAX);
    }

    #[test]
    fn test_saturating_sum_clamps_negative() {
        assert_eq!(saturating_sum([Decimal::MIN, dec(-1)]), Decimal::MIN);
        assert_eq!(saturating_sum([dec(2), dec(-5)]), dec(-3));
    }

    proptest! {
        #[test]
        fn prop_static_fields_never_cost(n in 0usize..8, raw in any::<i64>()) {
            let fields: Vec<_> = (0..n)
                .map(|i| FieldDescriptor::new(i.to_string(), format!("s{}", i), "", FieldKind::Static { content: None }))
                .collect();
            let mut v = FormValues::new();
            for i in 0..n {
                v.insert(format!("s{}", i), json!(raw));
            }
            prop_assert_eq!(compute_total(&fields, &v), Decimal::ZERO);
        }
    }
}

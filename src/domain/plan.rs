//! Raw vendor plan records
//!
//! The plan provider spells the same field several ways depending on the
//! endpoint and account. [`FieldMap`] keeps those spellings in one place as
//! ordered lookup lists; the rest of the crate only sees [`PlanRecord`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered field-name lookups for a vendor's plan schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub code: Vec<String>,
    pub name: Vec<String>,
    pub price: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for FieldMap {
    fn default() -> Self {
        FieldMap {
            code: owned(&[
                "countryCode", "CountryCode", "country_code", "countryIso", "iso2", "ISO2", "iso",
                "code",
            ]),
            name: owned(&[
                "countryName", "CountryName", "country_name", "country", "Country", "destination",
                "Destination",
            ]),
            price: owned(&[
                "price", "Price", "retailPrice", "RetailPrice", "salePrice", "SalePrice", "amount",
                "cost",
            ]),
        }
    }
}

impl FieldMap {
    /// Read one plan object through this field map
    pub fn read(&self, raw: &Value) -> PlanRecord {
        let Some(obj) = raw.as_object() else {
            return PlanRecord::default();
        };

        PlanRecord {
            country_code: first_text(obj, &self.code),
            country_name: first_text(obj, &self.name),
            price: first_number(obj, &self.price),
        }
    }
}

/// Plan fields the catalog cares about, after field-name resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanRecord {
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub price: Option<f64>,
}

fn first_text(obj: &Map<String, Value>, keys: &[String]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_number(obj: &Map<String, Value>, keys: &[String]) -> Option<f64> {
    keys.iter().find_map(|k| obj.get(k).and_then(coerce_number))
}

/// Finite number from a JSON number or numeric string
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

// ============================================================================
// Plan list location
// ============================================================================

type ListLocator = fn(&Value) -> Option<&Vec<Value>>;

fn nested_information(v: &Value) -> Option<&Vec<Value>> {
    v.get("data")?.get("getInformation")?.as_array()
}

fn array_at<'a>(v: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    v.get(key)?.as_array()
}

fn information(v: &Value) -> Option<&Vec<Value>> {
    array_at(v, "getInformation")
}

fn data(v: &Value) -> Option<&Vec<Value>> {
    array_at(v, "data")
}

fn plans(v: &Value) -> Option<&Vec<Value>> {
    array_at(v, "plans")
}

fn result(v: &Value) -> Option<&Vec<Value>> {
    array_at(v, "result")
}

fn bare(v: &Value) -> Option<&Vec<Value>> {
    v.as_array()
}

/// Places the vendor has been seen to put the plan array, in priority order
const PLAN_LIST_LOCATORS: &[ListLocator] =
    &[nested_information, information, data, plans, result, bare];

/// The plan array inside a raw plan response, if any
pub fn plan_list(response: &Value) -> Option<&Vec<Value>> {
    PLAN_LIST_LOCATORS.iter().find_map(|locate| locate(response))
}

/// Mutable access to the same array [`plan_list`] would return
pub fn plan_list_mut(response: &mut Value) -> Option<&mut Vec<Value>> {
    if response.pointer("/data/getInformation").is_some_and(Value::is_array) {
        return response.pointer_mut("/data/getInformation")?.as_array_mut();
    }
    for key in ["getInformation", "data", "plans", "result"] {
        if response.get(key).is_some_and(Value::is_array) {
            return response.get_mut(key)?.as_array_mut();
        }
    }
    response.as_array_mut()
}

/// Owned plan records of a raw response, empty when none are found
pub fn plan_records(response: &Value) -> Vec<Value> {
    plan_list(response).cloned().unwrap_or_default()
}

/// Drop every plan whose country code is not `code` (case-insensitive).
///
/// Returns the number of plans kept. Responses without a plan list are left
/// untouched and report zero.
pub fn retain_country(response: &mut Value, fields: &FieldMap, code: &str) -> usize {
    let Some(plans) = plan_list_mut(response) else {
        return 0;
    };

    plans.retain(|plan| {
        fields
            .read(plan)
            .country_code
            .is_some_and(|c| c.eq_ignore_ascii_case(code))
    });
    plans.len()
}

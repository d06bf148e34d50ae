//! Display strings for the server-rendered pages.
//!
//! Strings live in `i18n/en.json`, addressed by dotted keys such as
//! `"home.title"`. Unknown keys render as the key itself.
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const EN: &str = include_str!("../i18n/en.json");

static BUNDLE: OnceLock<Value> = OnceLock::new();

fn bundle() -> &'static Value {
    BUNDLE.get_or_init(|| match serde_json::from_str(EN) {
        Ok(value) => value,
        Err(err) => {
            log::error!("failed to parse bundled strings: {err}");
            Value::Object(serde_json::Map::new())
        }
    })
}

fn get_nested_value<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(obj, |current, k| current.get(k))
}

fn render_value(value: &Value, args: Option<&BTreeMap<&str, String>>) -> Option<String> {
    let mut text = value.as_str()?.to_string();
    if let Some(args_map) = args {
        for (k, v) in args_map {
            text = text.replace(&format!("{{{k}}}"), v);
        }
    }
    Some(text)
}

/// Look up a display string.
#[must_use]
pub fn t(key: &str) -> String {
    tr(key, None)
}

/// Look up a display string and substitute `{name}` placeholders.
#[must_use]
pub fn tr(key: &str, args: Option<&BTreeMap<&str, String>>) -> String {
    get_nested_value(bundle(), key)
        .and_then(|v| render_value(v, args))
        .unwrap_or_else(|| key.to_string())
}

/// Shorthand for `tr` with inline pairs.
#[must_use]
pub fn tf(key: &str, pairs: &[(&str, String)]) -> String {
    let args: BTreeMap<&str, String> = pairs.iter().cloned().collect();
    tr(key, Some(&args))
}

/// Money amounts are whole dollars.
#[must_use]
pub fn fmt_money(amount: i64) -> String {
    format!("${amount}")
}

#[must_use]
pub fn fmt_pct(value: f64) -> String {
    format!("{value:.2}%")
}

#[must_use]
pub fn fmt_p_value(p: f64) -> String {
    if p < 0.0001 {
        "< 0.0001".to_string()
    } else {
        format!("{p:.4}")
    }
}

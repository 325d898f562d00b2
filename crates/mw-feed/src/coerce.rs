//! Field readers over loosely-typed upstream objects.
//!
//! Each reader takes an ordered alias list; the first alias holding a usable
//! value wins. Nothing here fails: fallbacks are recorded in
//! [`CoercionDiagnostics`] instead.

use chrono::DateTime;
use mw_schemas::Side;
use serde_json::{Map, Value};

use crate::diagnostics::{CoercionDiagnostics, CoercionKind};

pub(crate) type Object = Map<String, Value>;

fn present<'a>(obj: &'a Object, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

/// First alias holding a finite JSON number. Numeric strings are not parsed.
pub(crate) fn number(obj: &Object, aliases: &[&str], diag: &mut CoercionDiagnostics) -> f64 {
    let mut seen = false;
    for alias in aliases {
        match present(obj, alias) {
            None => continue,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) if f.is_finite() => return f,
                _ => {
                    seen = true;
                    diag.record(CoercionKind::NonNumeric, alias);
                }
            },
            Some(_) => {
                seen = true;
                diag.record(CoercionKind::NonNumeric, alias);
            }
        }
    }
    if !seen {
        diag.record(CoercionKind::MissingNumeric, aliases.first().copied().unwrap_or(""));
    }
    0.0
}

/// First alias holding a non-blank string, trimmed.
pub(crate) fn text(obj: &Object, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| match present(obj, alias) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// Raw entity identifier. Non-string scalars are stringified.
pub(crate) fn entity_name(obj: &Object, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| match present(obj, alias) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::String(_)) => None,
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Human-readable timestamp. Strings pass through trimmed; numbers are
/// epoch seconds rendered as `YYYY-MM-DD HH:MM:SS` UTC; absent is `""`.
pub(crate) fn timestamp(obj: &Object, aliases: &[&str], diag: &mut CoercionDiagnostics) -> String {
    for alias in aliases {
        match present(obj, alias) {
            Some(Value::String(s)) if !s.trim().is_empty() => return s.trim().to_string(),
            Some(Value::Number(n)) => {
                if let Some(rendered) = n.as_f64().and_then(format_epoch_secs) {
                    return rendered;
                }
                return n.to_string();
            }
            _ => continue,
        }
    }
    diag.record(CoercionKind::MissingText, aliases.first().copied().unwrap_or(""));
    String::new()
}

fn format_epoch_secs(secs: f64) -> Option<String> {
    if !secs.is_finite() || secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Explicit side from the `side` field, if recognizable.
pub(crate) fn side(obj: &Object) -> Option<Side> {
    match present(obj, "side") {
        Some(Value::String(s)) => Side::parse(s),
        _ => None,
    }
}

/// `5` → `"5x"`, `2.5` → `"2.5x"`; strings unchanged; absent → `"1x"`.
pub(crate) fn leverage(obj: &Object, diag: &mut CoercionDiagnostics) -> String {
    for alias in ["lev", "leverage"] {
        match present(obj, alias) {
            Some(Value::Number(n)) => return format!("{n}x"),
            Some(Value::String(s)) if !s.trim().is_empty() => return s.trim().to_string(),
            _ => continue,
        }
    }
    diag.record(CoercionKind::DefaultLeverage, "lev");
    "1x".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Object {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn first_numeric_alias_wins_and_non_numeric_is_skipped() {
        let mut d = CoercionDiagnostics::new();
        let o = obj(json!({"pnl": "12.5", "realized_pnl": 7.0}));
        assert_eq!(number(&o, &["pnl", "realized_pnl"], &mut d), 7.0);
        assert_eq!(d.count(CoercionKind::NonNumeric), 1);

        let o = obj(json!({"pnl": 0, "realized_pnl": 7.0}));
        assert_eq!(number(&o, &["pnl", "realized_pnl"], &mut d), 0.0);

        let o = obj(json!({"other": 1}));
        assert_eq!(number(&o, &["pnl", "realized_pnl"], &mut d), 0.0);
        assert_eq!(d.count(CoercionKind::MissingNumeric), 1);
    }

    #[test]
    fn epoch_seconds_render_as_utc() {
        let mut d = CoercionDiagnostics::new();
        let o = obj(json!({"entry_time": 1_700_000_000}));
        assert_eq!(
            timestamp(&o, &["entry_human_time", "entry_time"], &mut d),
            "2023-11-14 22:13:20"
        );
        let o = obj(json!({"entry_human_time": " 10/25 14:30 "}));
        assert_eq!(timestamp(&o, &["entry_human_time", "entry_time"], &mut d), "10/25 14:30");
        assert!(d.is_clean());
        assert_eq!(timestamp(&obj(json!({})), &["exit_time"], &mut d), "");
        assert_eq!(d.count(CoercionKind::MissingText), 1);
    }

    #[test]
    fn leverage_uses_number_text() {
        let mut d = CoercionDiagnostics::new();
        assert_eq!(leverage(&obj(json!({"leverage": 5})), &mut d), "5x");
        assert_eq!(leverage(&obj(json!({"lev": 2.5})), &mut d), "2.5x");
        assert_eq!(leverage(&obj(json!({"lev": "10x"})), &mut d), "10x");
        assert!(d.is_clean());
        assert_eq!(leverage(&obj(json!({})), &mut d), "1x");
        assert_eq!(d.count(CoercionKind::DefaultLeverage), 1);
    }

    #[test]
    fn entity_name_stringifies_scalars() {
        assert_eq!(entity_name(&obj(json!({"id": 42})), &["name", "id"]), Some("42".to_string()));
        assert_eq!(entity_name(&obj(json!({"name": ""})), &["name"]), None);
    }
}

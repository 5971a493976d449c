//! JSON data blocks embedded in the page.

use crate::error::Result;
use serde::Serialize;

/// Serialize a value as compact JSON that is safe inside a `<script>`
/// element.
///
/// Non-ASCII text is kept as UTF-8. `</` is written `<\/`, which JSON
/// reads back as the same string but which can never close the script
/// element the data sits in.
pub fn to_embedded_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compact_utf8() {
        let json = to_embedded_json(&json!([{"cat": "Débitmètre", "n": 2}])).unwrap();
        assert_eq!(json, r#"[{"cat":"Débitmètre","n":2}]"#);
    }

    #[test]
    fn test_script_close_is_escaped() {
        let json = to_embedded_json(&json!({"obs": "voir </script><b>"})).unwrap();
        assert!(!json.contains("</script>"));
        let back: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back["obs"], "voir </script><b>");
    }
}

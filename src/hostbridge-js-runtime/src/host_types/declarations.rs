use hostbridge_js_common::NAMESPACE_SEPARATOR;
use serde_json::Value;

use super::specifier::is_identifier;
use super::{HostMember, HostType};

/// Render TypeScript ambient module declarations for the given host types, one
/// `declare module "hosttypes/..."` block per type, keyed by dotted path.
pub fn declarations<'a>(types: impl IntoIterator<Item = (&'a str, &'a HostType)>) -> String {
    let mut out = String::new();
    for (path, host_type) in types {
        let specifier = super::HostTypePath::from_dotted(path).to_specifier();
        let export_name = path.rsplit(NAMESPACE_SEPARATOR).next().unwrap_or(path);

        out.push_str(&format!("declare module {} {{\n", quoted(&specifier)));
        out.push_str("    const handle: {\n");
        for (name, member) in host_type.members() {
            let line = match member {
                HostMember::Function(_) => format!("{}(...args: any[]): any;", property(name)),
                HostMember::Constant(value) => {
                    format!("readonly {}: {};", property(name), ts_type(value))
                }
            };
            out.push_str(&format!("        {line}\n"));
        }
        out.push_str("    };\n");
        if is_identifier(export_name) {
            out.push_str(&format!("    export {{ handle as {export_name} }};\n"));
        }
        out.push_str(&format!(
            "    const exports: {{ readonly {}: typeof handle }};\n",
            property(export_name)
        ));
        out.push_str("    export default exports;\n");
        out.push_str("}\n");
    }
    out
}

fn quoted(text: &str) -> String {
    // a JSON string literal is a valid TypeScript string literal
    serde_json::Value::from(text).to_string()
}

fn property(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quoted(name)
    }
}

fn ts_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "unknown[]",
        Value::Object(_) => "Record<string, unknown>",
    }
}

use std::borrow::Cow;

use anyhow::Context as _;
use rquickjs::promise::MaybePromise;
use rquickjs::{Ctx, Function, Module, Persistent, Value};

use crate::guards::JsResultExt as _;

/// An event handler: the `handler` export of a script module, kept alive across contexts.
#[derive(Clone)]
pub(crate) struct Handler {
    func: Persistent<Function<'static>>,
}

impl Handler {
    /// Declare `script` as the module `module_name`, evaluate it, and keep its `handler` export.
    ///
    /// Any import the script makes is resolved here, so a missing module fails compilation.
    pub(crate) fn compile(ctx: &Ctx<'_>, module_name: &str, script: &str) -> anyhow::Result<Self> {
        let source = with_handler_export(script).into_owned();
        let module = Module::declare(ctx.clone(), module_name, source).catch(ctx)?;
        let (module, evaluated) = module.eval().catch(ctx)?;
        evaluated.finish::<()>().catch(ctx)?;

        let func: Function = module.get("handler").catch(ctx)?;
        Ok(Self {
            func: Persistent::save(ctx, func),
        })
    }

    /// Call the handler with a JSON event and return its result as JSON.
    pub(crate) fn call(&self, ctx: &Ctx<'_>, event: String) -> anyhow::Result<String> {
        let func = self.func.clone().restore(ctx).catch(ctx)?;
        let event = ctx.json_parse(event).catch(ctx)?;

        // async handlers are fine as long as they settle without outside help
        let result: MaybePromise = func.call((event,)).catch(ctx)?;
        let result: Value = result.finish().catch(ctx)?;

        ctx.json_stringify(result)
            .catch(ctx)?
            .context("The handler function did not return a value")?
            .to_string()
            .catch(ctx)
    }
}

/// Scripts that only define `handler` get the export added for them.
fn with_handler_export(script: &str) -> Cow<'_, str> {
    if has_export(script) {
        Cow::Borrowed(script)
    } else {
        Cow::Owned(format!("{script}\nexport {{ handler }};"))
    }
}

/// Whether `script` has an `export` of its own.
///
/// Looks for the keyword as a token outside comments and string literals. Longer names
/// like `exports`, property accesses and object keys don't count.
fn has_export(script: &str) -> bool {
    let mut chars = script.char_indices().peekable();
    let mut previous = None;
    while let Some((start, c)) = chars.next() {
        match c {
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                chars.by_ref().find(|&(_, c)| c == '\n');
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut star = false;
                chars.by_ref().find(|&(_, c)| {
                    let closes = star && c == '/';
                    star = c == '*';
                    closes
                });
            }
            '"' | '\'' | '`' => {
                while let Some((_, next)) = chars.next() {
                    match next {
                        '\\' => {
                            chars.next();
                        }
                        next if next == c => break,
                        _ => {}
                    }
                }
                previous = Some(c);
            }
            c if unicode_ident::is_xid_start(c) || c == '$' || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, c)) = chars.peek() {
                    if !(unicode_ident::is_xid_continue(c) || c == '$') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let word = &script[start..end];
                let is_key = script[end..].trim_start().starts_with(':');
                if word == "export" && previous != Some('.') && !is_key {
                    return true;
                }
                previous = Some(c);
            }
            c if c.is_whitespace() => {}
            c => previous = Some(c),
        }
    }
    false
}

/// The module name a handler is declared under, `<dir>/<function name>.js`.
///
/// Relative imports in the handler script are resolved against `dir`.
pub(crate) fn module_name(function_name: &str, dir: &str) -> String {
    let dir = dir.replace('\\', "/");
    let dir = if dir.is_empty() { "." } else { dir.trim_end_matches('/') };
    let file = match function_name {
        "" => "handler".to_string(),
        name => name.replace('\\', "/"),
    };

    let mut name = format!("{dir}/{file}");
    if !name.ends_with(".js") && !name.ends_with(".mjs") {
        name.push_str(".js");
    }
    name
}

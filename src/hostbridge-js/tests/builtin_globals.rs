#![allow(clippy::disallowed_macros)]

use hostbridge_js::{EngineBuilder, Script};

#[test]
fn builtin_globals_should_be_defined() {
    let handler = Script::from_content(
        r#"
        function assert(condition, message) {
            if (!condition) {
                throw new Error(message);
            }
        }

        function handler(event) {
            assert(typeof console.log === "function", "console.log should be defined");
            assert(typeof print === "function", "print should be defined");
            assert(typeof require === "function", "require should be defined");

            return 0;
        }
        "#,
    );

    let mut engine = EngineBuilder::new().build().unwrap();
    engine.add_handler("handler", handler).unwrap();

    let res = engine.handle_event("handler", "{}".to_string(), None).unwrap();

    assert_eq!(res, "0");
}

#[test]
fn global_require_matches_require_module() {
    let handler = Script::from_content(
        r#"
        import { require as moduleRequire } from "require";
        function handler(event) {
            return [
                require === moduleRequire,
                Object.keys(require("hosttypes/game/Limits")),
                Object.keys(moduleRequire("hosttypes/game/Limits")),
            ];
        }
        "#,
    );

    let mut engine = EngineBuilder::new()
        .host_type(
            "game.Limits",
            hostbridge_js::HostType::new().with_constant("MAX_PLAYERS", 8),
        )
        .build()
        .unwrap();
    engine.add_handler("handler", handler).unwrap();

    let res = engine.handle_event("handler", "{}".to_string(), None).unwrap();
    assert_eq!(res, r#"[true,["Limits"],["Limits"]]"#);
}

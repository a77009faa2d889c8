//! Host types imported through `hosttypes/...` specifiers

#![allow(clippy::disallowed_macros)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hostbridge_js::{
    Engine, EngineBuilder, HostFunction, HostLookup, HostType, Script, embed_modules,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn player_entity() -> HostType {
    HostType::new()
        .with_constant("MAX_HEALTH", 20)
        .with_function(
            "describe",
            HostFunction::new_serde(|name: String| -> anyhow::Result<String> {
                Ok(format!("player {name}"))
            }),
        )
}

/// An engine whose symbol lookup knows `game.PlayerEntity`, counting every lookup.
fn game_engine() -> (Engine, Arc<AtomicUsize>) {
    init_tracing();

    let lookups = Arc::new(AtomicUsize::new(0));
    let counter = lookups.clone();
    let engine = EngineBuilder::new()
        .with_module_loader(embed_modules! {
            "local/helper.js" => @inline "export const helper = 'native';",
        })
        .with_symbol_lookup(move |path| {
            counter.fetch_add(1, Ordering::SeqCst);
            match path {
                "game.PlayerEntity" => HostLookup::Found(player_entity()),
                "game.Broken" => HostLookup::LookupError("class initialisation failed".into()),
                _ => HostLookup::NotFound,
            }
        })
        .build()
        .unwrap();
    (engine, lookups)
}

fn run(engine: &mut Engine, script: &str) -> anyhow::Result<String> {
    engine.add_handler("handler", Script::from_content(script).with_virtual_base("/"))?;
    engine.handle_event("handler", "{}".to_string(), None)
}

#[test]
fn require_host_type() {
    let (mut engine, lookups) = game_engine();
    let res = run(
        &mut engine,
        r#"
        function handler(event) {
            const exports = require("hosttypes/game/PlayerEntity");
            return [Object.keys(exports), exports.PlayerEntity.MAX_HEALTH];
        }
        "#,
    )
    .unwrap();
    assert_eq!(res, r#"[["PlayerEntity"],20]"#);
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_host_type_is_module_not_found() {
    let (mut engine, lookups) = game_engine();
    let res = run(
        &mut engine,
        r#"
        function failure(specifier) {
            try {
                require(specifier);
                return "loaded";
            } catch (e) {
                return `${e.name}`;
            }
        }
        function handler(event) {
            return [
                failure("hosttypes/unknown/Nope"),
                failure("hosttypes/game/Broken"),
                failure("./local/missing.js"),
            ];
        }
        "#,
    )
    .unwrap();
    let names: Vec<String> = serde_json::from_str(&res).unwrap();
    assert_ne!(names[0], "loaded");
    assert_eq!(names[0], names[1]);
    assert_eq!(names[0], names[2]);
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[test]
fn plain_modules_are_untouched() {
    let (mut engine, lookups) = game_engine();
    let res = run(
        &mut engine,
        r#"
        import { helper } from "./local/helper.js";
        function handler(event) {
            return [helper, require("./local/helper.js").helper];
        }
        "#,
    )
    .unwrap();
    assert_eq!(res, r#"["native","native"]"#);
    assert_eq!(lookups.load(Ordering::SeqCst), 0);
}

#[test]
fn import_host_type() {
    let (mut engine, lookups) = game_engine();
    let res = run(
        &mut engine,
        r#"
        import { PlayerEntity } from "hosttypes/game/PlayerEntity";
        function handler(event) {
            const direct = require("hosttypes/game/PlayerEntity").PlayerEntity;
            return [PlayerEntity.describe("steve"), direct.describe("steve")];
        }
        "#,
    )
    .unwrap();
    assert_eq!(res, r#"["player steve","player steve"]"#);
    // once for the import, once for the direct require
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_import_fails_the_handler() {
    let (mut engine, lookups) = game_engine();
    let res = run(
        &mut engine,
        r#"
        import { Broken } from "hosttypes/game/Broken";
        function handler(event) {
            return Broken;
        }
        "#,
    );
    assert!(res.is_err());
    assert_eq!(engine.handlers().count(), 0);
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}

#[test]
fn builder_types_are_declared() {
    let mut engine = EngineBuilder::new()
        .host_type("game.PlayerEntity", player_entity())
        .host_type("game.world.Block", HostType::new().with_constant("SOLID", true))
        .build()
        .unwrap();
    let declarations = engine.host_type_declarations().unwrap();

    assert!(declarations.contains(r#"declare module "hosttypes/game/PlayerEntity" {"#));
    assert!(declarations.contains(r#"declare module "hosttypes/game/world/Block" {"#));
    assert!(declarations.contains("readonly SOLID: boolean;"));
    assert!(declarations.contains("export { handle as Block };"));
}

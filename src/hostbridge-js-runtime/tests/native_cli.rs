use std::fs::write;
use std::process::Command;

use escargot::CargoBuild;
use tempfile::tempdir;

#[test]
fn smoke_test() {
    let dir = tempdir().unwrap();

    write(
        dir.path().join("index.js"),
        r#"
            import * as math from './math.js';
            function handler(event) {
                console.log(JSON.stringify(event));
                return math.add(event.a, 41);
            }
        "#,
    )
    .unwrap();

    write(
        dir.path().join("math.js"),
        r#"
            const add = (a, b) => a + b;
            const subtract = (a, b) => a - b;
            export { add, subtract };
        "#,
    )
    .unwrap();

    let output = js_runtime_cli()
        .arg(dir.path().join("./index.js"))
        .arg(r#"{"a":1,"b":[1,2,3]}"#)
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines = stdout.trim().lines().collect::<Vec<_>>();

    assert_eq!(lines, [r#"{"a":1,"b":[1,2,3]}"#, "Handler result: 42",]);
}

#[test]
fn host_types_from_manifest_and_std() {
    let dir = tempdir().unwrap();

    write(dir.path().join("greeting.txt"), "hello from disk").unwrap();

    write(
        dir.path().join("types.json"),
        r#"{ "game.Limits": { "constants": { "MAX_PLAYERS": 20 } } }"#,
    )
    .unwrap();

    write(
        dir.path().join("index.js"),
        r#"
            import { FileSystem } from 'hosttypes/std/FileSystem';
            const { Limits } = require('hosttypes/game/Limits');
            function handler(event) {
                return [FileSystem.readFile(event.file), Limits.MAX_PLAYERS];
            }
        "#,
    )
    .unwrap();

    let output = js_runtime_cli()
        .arg("--host-types")
        .arg(dir.path().join("types.json"))
        .arg(dir.path().join("index.js"))
        .arg(r#"{"file":"greeting.txt"}"#)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), r#"Handler result: ["hello from disk",20]"#);
}

#[test]
fn unknown_host_type_fails_like_a_missing_file() {
    let dir = tempdir().unwrap();

    write(
        dir.path().join("index.js"),
        r#"
            function handler(event) {
                const messages = [];
                for (const specifier of ['hosttypes/unknown/Nope', './nope.js']) {
                    try {
                        require(specifier);
                    } catch (e) {
                        messages.push(e.name);
                    }
                }
                return messages;
            }
        "#,
    )
    .unwrap();

    let output = js_runtime_cli()
        .arg(dir.path().join("index.js"))
        .arg("{}")
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let result = stdout.trim().strip_prefix("Handler result: ").unwrap();
    let names: Vec<String> = serde_json::from_str(result).unwrap();
    assert_eq!(names.len(), 2);
    assert_eq!(names[0], names[1]);
}

#[test]
fn prints_declarations() {
    let dir = tempdir().unwrap();

    write(
        dir.path().join("types.json"),
        r#"{ "game.Limits": { "constants": { "MAX_PLAYERS": 20 } } }"#,
    )
    .unwrap();

    let output = js_runtime_cli()
        .arg("--host-types")
        .arg(dir.path().join("types.json"))
        .arg("--declarations")
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#"declare module "hosttypes/game/Limits" {"#));
    assert!(stdout.contains("readonly MAX_PLAYERS: number;"));
    assert!(stdout.contains(r#"declare module "hosttypes/std/FileSystem" {"#));
    assert!(stdout.contains("readFile(...args: any[]): any;"));
}

fn js_runtime_cli() -> Command {
    CargoBuild::new()
        .manifest_path(env!("CARGO_MANIFEST_PATH"))
        .bin("hostbridge-js-runtime")
        .current_release()
        .current_target()
        .run()
        .unwrap()
        .command()
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{Context as _, Result};
use clap::Parser;
use hostbridge_js_runtime::{HostFunction, HostType, JsRuntime};
use serde::Deserialize;
use tracing::{debug, instrument};
use tracing_subscriber::EnvFilter;

struct Host;

impl hostbridge_js_runtime::Host for Host {
    fn resolve_module(&self, base: String, name: String) -> Result<String> {
        let base = PathBuf::from(base);
        let path = base.join(&name);

        let path = path
            .canonicalize()
            .with_context(|| format!("Resolving module {name:?} from {base:?}"))?;
        Ok(path.display().to_string())
    }

    fn load_module(&self, name: String) -> Result<String> {
        fs::read_to_string(&name).with_context(|| format!("Loading module {name:?}"))
    }
}

const EXAMPLES: &str = "\u{001b}[1;4mExamples:\u{001b}[0m
  Run a handler script located at ./handler.js with an event '{\"name\":\"hostbridge\"}':
    $ cat ./handler.js
    function handler(event) {
        return `hello ${event.name}`
    }

    $ hostbridge-js-runtime ./handler.js '{\"name\":\"hostbridge\"}'
    Handler result: \"hello hostbridge\"

  Import host types, either built-in or declared in a manifest:
    $ cat ./index.js
    import { Environment } from 'hosttypes/std/Environment';
    const { Limits } = require('hosttypes/game/Limits');
    function handler(event) {
        return { home: Environment.get('HOME'), players: Limits.MAX_PLAYERS };
    }

    $ cat ./types.json
    { \"game.Limits\": { \"constants\": { \"MAX_PLAYERS\": 20 } } }

    $ hostbridge-js-runtime --host-types ./types.json ./index.js '{}'
    Handler result: {\"home\":\"/home/user\",\"players\":20}

  Print TypeScript declarations for the host types instead of running anything:
    $ hostbridge-js-runtime --host-types ./types.json --declarations
";

/// Run a JavaScript handler script with a given event, resolving `hosttypes/...` imports
/// to host types.
///
/// The handler script is expected to export a function named `handler` that takes a single argument
/// (the event) and returns a value.
#[derive(clap::Parser)]
#[command(version, about)]
#[clap(after_help = EXAMPLES)]
struct Cli {
    /// The path to the JavaScript handler script file.
    #[arg(required_unless_present = "declarations")]
    file: Option<PathBuf>,

    /// The event to pass to the handler function as a JSON string.
    #[arg(required_unless_present = "declarations")]
    event: Option<String>,

    /// A JSON manifest of extra host types, mapping dotted paths to `{ "constants": { ... } }`.
    #[arg(long, value_name = "FILE")]
    host_types: Option<PathBuf>,

    /// Print TypeScript declarations for the available host types and exit.
    #[arg(long)]
    declarations: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    #[serde(default)]
    constants: serde_json::Map<String, serde_json::Value>,
}

fn read_manifest(path: &Path) -> Result<BTreeMap<String, HostType>> {
    let manifest = fs::read_to_string(path)
        .with_context(|| format!("Reading host type manifest from {path:?}"))?;
    let manifest: BTreeMap<String, ManifestEntry> = serde_json::from_str(&manifest)
        .with_context(|| format!("Parsing host type manifest {path:?}"))?;

    Ok(manifest
        .into_iter()
        .map(|(path, entry)| {
            let host_type = entry
                .constants
                .into_iter()
                .fold(HostType::new(), |ty, (name, value)| ty.with_constant(name, value));
            (path, host_type)
        })
        .collect())
}

fn std_host_types() -> [(&'static str, HostType); 2] {
    let file_system = HostType::new().with_function(
        "readFile",
        HostFunction::new_serde(|path: String| -> Result<String> {
            fs::read_to_string(&path).with_context(|| format!("Reading {path:?}"))
        }),
    );
    let environment = HostType::new().with_function(
        "get",
        HostFunction::new_serde(|name: String| -> Result<Option<String>> {
            Ok(env::var(name).ok())
        }),
    );
    [("std.FileSystem", file_system), ("std.Environment", environment)]
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    if let Err(err) = builder.try_init() {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}

#[instrument(skip_all, level = "info")]
fn main() -> Result<()> {
    init_tracing();

    let Cli {
        file,
        event,
        host_types,
        declarations,
    } = Cli::parse();

    let mut runtime = JsRuntime::new(Host)?;

    for (path, host_type) in std_host_types() {
        runtime.register_host_type(path, host_type)?;
    }
    if let Some(manifest) = host_types {
        for (path, host_type) in read_manifest(&manifest)? {
            debug!(path = %path, "registering host type from manifest");
            runtime.register_host_type(path, host_type)?;
        }
    }

    if declarations {
        print!("{}", runtime.host_type_declarations()?);
        return Ok(());
    }

    let (Some(file), Some(event)) = (file, event) else {
        anyhow::bail!("A handler script and an event are required");
    };

    let handler_script = fs::read_to_string(&file)
        .with_context(|| format!("Reading handler script from {:?}", file))?;

    let handler_pwd = file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    env::set_current_dir(handler_pwd).with_context(|| {
        format!("Setting current directory to handler script directory {handler_pwd:?}")
    })?;

    runtime.register_handler("handler", handler_script, ".")?;

    let result = runtime.run_handler("handler".to_string(), event, false)?;
    println!("Handler result: {result}");

    Ok(())
}

//! Constants shared between the host and guest sides of hostbridge-js.
#![no_std]

/// Module specifier prefix reserved for host type imports.
///
/// `import { PlayerEntity } from "hosttypes/game/PlayerEntity"` asks for the host type
/// `game.PlayerEntity` instead of a file.
pub const HOST_TYPES_PREFIX: &str = "hosttypes/";

/// Separator between the segments of a module specifier.
pub const PATH_SEPARATOR: char = '/';

/// Separator between the segments of a host type path.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Text of the location the ESM resolver hands out when a specifier has to be
/// retried through `require`.
///
/// Only the text is shared here. The runtime recognises the token by identity, so a
/// location that merely spells the same text is not a retry request.
pub const TRY_COMMON_JS_TOKEN: &str = "custom:///try-common-js-token";

/// Name of the built-in module that provides `require`.
pub const REQUIRE_MODULE: &str = "require";

//! The directive catalog: which contexts a directive may appear in, and how
//! many arguments (or block/no-block) each context admits.
//!
//! Generalized from a handful of block directives to the full HTTP/Stream/
//! Mail catalog plus an arity dimension.

use std::sync::OnceLock;

/// Bitmask identifying the block contexts a directive variant may occur in.
pub type ContextMask = u32;

pub const MAIN: ContextMask = 1 << 0;
pub const EVENTS: ContextMask = 1 << 1;
pub const HTTP: ContextMask = 1 << 2;
pub const HTTP_SERVER: ContextMask = 1 << 3;
pub const HTTP_LOCATION: ContextMask = 1 << 4;
pub const HTTP_UPSTREAM: ContextMask = 1 << 5;
pub const HTTP_SERVER_IF: ContextMask = 1 << 6;
pub const HTTP_LOCATION_IF: ContextMask = 1 << 7;
pub const HTTP_LIMIT_EXCEPT: ContextMask = 1 << 8;
pub const HTTP_TYPES: ContextMask = 1 << 9;
pub const HTTP_MAP: ContextMask = 1 << 10;
pub const MAIL: ContextMask = 1 << 11;
pub const MAIL_SERVER: ContextMask = 1 << 12;
pub const STREAM: ContextMask = 1 << 13;
pub const STREAM_SERVER: ContextMask = 1 << 14;
pub const STREAM_UPSTREAM: ContextMask = 1 << 15;

/// Legal (almost) everywhere a directive may appear: main plus every block.
pub const ANY: ContextMask = MAIN
    | EVENTS
    | HTTP
    | HTTP_SERVER
    | HTTP_LOCATION
    | HTTP_UPSTREAM
    | HTTP_SERVER_IF
    | HTTP_LOCATION_IF
    | HTTP_LIMIT_EXCEPT
    | MAIL
    | MAIL_SERVER
    | STREAM
    | STREAM_SERVER
    | STREAM_UPSTREAM;

pub const HTTP_BLOCK_LIKE: ContextMask = HTTP_SERVER | HTTP_LOCATION | HTTP_SERVER_IF | HTTP_LOCATION_IF;

/// Given the name of the block directive on top of the context stack and the
/// context it was opened in, return the child context pushed for its body.
/// Returns `None` for directives whose block doesn't introduce a named
/// context (e.g. `types {}`, `map {}`, `geo {}`), in which case the parser
/// keeps the current context for arity/legality checks on children, and for
/// unknown/extension block directives.
pub fn child_context(directive_name: &str, current: ContextMask) -> ContextMask {
    match directive_name {
        "http" => HTTP,
        "events" => EVENTS,
        "server" if current & (MAIN | HTTP) != 0 => HTTP_SERVER,
        "server" if current & STREAM != 0 => STREAM_SERVER,
        "server" if current & MAIL != 0 => MAIL_SERVER,
        "location" => HTTP_LOCATION,
        "upstream" if current & HTTP != 0 => HTTP_UPSTREAM,
        "upstream" if current & STREAM != 0 => STREAM_UPSTREAM,
        "if" if current & HTTP_SERVER != 0 => HTTP_SERVER_IF,
        "if" if current & HTTP_LOCATION != 0 => HTTP_LOCATION_IF,
        "limit_except" => HTTP_LIMIT_EXCEPT,
        "types" => HTTP_TYPES,
        "map" | "geo" | "split_clients" => HTTP_MAP,
        "mail" => MAIL,
        "stream" => STREAM,
        _ => current,
    }
}

/// How a directive's block-or-statement shape constrains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockShape {
    /// Must end in `;`; a `{` is an error.
    Forbidden,
    /// Must open a `{ ... }` block.
    Required,
}

/// The arity/shape rule for one catalog variant.
#[derive(Debug, Clone, Copy)]
pub struct ArityRule {
    pub min_args: u8,
    /// `None` means unbounded.
    pub max_args: Option<u8>,
    pub shape: BlockShape,
}

impl ArityRule {
    const fn new(min_args: u8, max_args: Option<u8>, shape: BlockShape) -> Self {
        Self { min_args, max_args, shape }
    }

    fn accepts(&self, arg_count: usize, is_block: bool) -> bool {
        let shape_ok = match self.shape {
            BlockShape::Forbidden => !is_block,
            BlockShape::Required => is_block,
        };
        if !shape_ok {
            return false;
        }
        let count = arg_count as u8;
        count >= self.min_args && self.max_args.is_none_or(|max| count <= max)
    }
}

/// One legal occurrence of a directive: the contexts it is allowed in, and
/// the arity/shape it requires there.
#[derive(Debug, Clone, Copy)]
pub struct DirectiveVariant {
    pub contexts: ContextMask,
    pub arity: ArityRule,
}

/// A catalog entry: all legal variants of one directive name.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub variants: &'static [DirectiveVariant],
}

macro_rules! stmt {
    ($min:expr, $max:expr) => {
        ArityRule::new($min, $max, BlockShape::Forbidden)
    };
}

macro_rules! block {
    ($min:expr, $max:expr) => {
        ArityRule::new($min, $max, BlockShape::Required)
    };
}

/// Directives whose block body should be treated as an opaque string rather
/// than recursively parsed (OpenResty/lua-nginx-module convention).
pub fn is_raw_block_directive(name: &str) -> bool {
    name.ends_with("_by_lua_block")
}

/// Directive names whose body is a brace-delimited block in at least one
/// variant. Used by the parser to decide whether `{` after an unrecognized
/// directive is itself legal syntax, independent of context/arity legality.
pub fn is_known_block_opener(name: &str) -> bool {
    if is_raw_block_directive(name) {
        return true;
    }
    matches!(
        name,
        "http"
            | "server"
            | "location"
            | "upstream"
            | "events"
            | "stream"
            | "mail"
            | "types"
            | "if"
            | "limit_except"
            | "geo"
            | "map"
            | "split_clients"
            | "match"
    )
}

static CATALOG: OnceLock<Vec<CatalogEntry>> = OnceLock::new();

/// Look up the catalog entry for a directive name, if the catalog has one registered.
pub fn lookup(name: &str) -> Option<&'static CatalogEntry> {
    catalog().iter().find(|e| e.name == name)
}

/// The full static directive catalog, built once.
pub fn catalog() -> &'static [CatalogEntry] {
    CATALOG.get_or_init(build_catalog).as_slice()
}

fn build_catalog() -> Vec<CatalogEntry> {
    vec![
        // ── Core / main ─────────────────────────────────────────────
        entry("user", &[variant(MAIN, stmt!(1, Some(2)))]),
        entry("worker_processes", &[variant(MAIN, stmt!(1, Some(1)))]),
        entry("worker_rlimit_nofile", &[variant(MAIN, stmt!(1, Some(1)))]),
        entry("pid", &[variant(MAIN, stmt!(1, Some(1)))]),
        entry("daemon", &[variant(MAIN, stmt!(1, Some(1)))]),
        entry("error_log", &[variant(MAIN | HTTP | HTTP_SERVER | HTTP_LOCATION | STREAM | STREAM_SERVER, stmt!(1, Some(2)))]),
        entry("include", &[variant(ANY, stmt!(1, Some(1)))]),
        entry(
            "events",
            &[variant(MAIN, block!(0, Some(0)))],
        ),
        entry(
            "http",
            &[variant(MAIN, block!(0, Some(0)))],
        ),
        entry(
            "stream",
            &[variant(MAIN, block!(0, Some(0)))],
        ),
        entry(
            "mail",
            &[variant(MAIN, block!(0, Some(0)))],
        ),
        // ── events ───────────────────────────────────────────────────
        entry("worker_connections", &[variant(EVENTS, stmt!(1, Some(1)))]),
        entry("use", &[variant(EVENTS, stmt!(1, Some(1)))]),
        entry("multi_accept", &[variant(EVENTS, stmt!(1, Some(1)))]),
        // ── http block structure ────────────────────────────────────
        entry(
            "server",
            &[
                variant(HTTP, block!(0, Some(0))),
                variant(STREAM, block!(0, Some(0))),
                variant(MAIL, block!(0, Some(0))),
                // `upstream { server ...; }` member directive: same name, statement shape.
                variant(HTTP_UPSTREAM | STREAM_UPSTREAM, stmt!(1, None)),
            ],
        ),
        entry(
            "location",
            &[variant(HTTP_SERVER | HTTP_LOCATION, block!(1, Some(2)))],
        ),
        entry(
            "upstream",
            &[
                variant(HTTP, block!(1, Some(1))),
                variant(STREAM, block!(1, Some(1))),
            ],
        ),
        entry(
            "types",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, block!(0, Some(0)))],
        ),
        entry(
            "if",
            &[variant(HTTP_SERVER | HTTP_LOCATION, block!(1, Some(1)))],
        ),
        entry(
            "limit_except",
            &[variant(HTTP_LOCATION, block!(1, None))],
        ),
        entry(
            "map",
            &[variant(HTTP | STREAM | MAIN, block!(2, Some(2)))],
        ),
        entry("geo", &[variant(HTTP | STREAM | MAIN, block!(1, Some(2)))]),
        entry(
            "split_clients",
            &[variant(HTTP | STREAM | MAIN, block!(2, Some(2)))],
        ),
        // ── server-level ─────────────────────────────────────────────
        entry(
            "listen",
            &[
                variant(HTTP_SERVER, stmt!(1, None)),
                variant(STREAM_SERVER, stmt!(1, None)),
                variant(MAIL_SERVER, stmt!(1, None)),
            ],
        ),
        entry(
            "server_name",
            &[variant(HTTP_SERVER | MAIL_SERVER, stmt!(1, None))],
        ),
        entry("root", &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION | HTTP_LOCATION_IF, stmt!(1, Some(1)))]),
        entry("alias", &[variant(HTTP_LOCATION, stmt!(1, Some(1)))]),
        entry("index", &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, None))]),
        entry("try_files", &[variant(HTTP_SERVER | HTTP_LOCATION, stmt!(2, None))]),
        entry(
            "return",
            &[variant(HTTP_SERVER | HTTP_LOCATION | HTTP_LOCATION_IF | HTTP_SERVER_IF, stmt!(1, Some(2)))],
        ),
        entry(
            "rewrite",
            &[variant(HTTP_SERVER | HTTP_LOCATION | HTTP_LOCATION_IF | HTTP_SERVER_IF, stmt!(2, Some(3)))],
        ),
        entry("set", &[variant(ANY, stmt!(2, Some(2)))]),
        entry(
            "server_tokens",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))],
        ),
        entry(
            "autoindex",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))],
        ),
        entry(
            "gzip",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))],
        ),
        entry(
            "gzip_types",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, None))],
        ),
        entry(
            "gzip_min_length",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))],
        ),
        entry(
            "client_max_body_size",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))],
        ),
        entry(
            "keepalive_timeout",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(2)))],
        ),
        entry(
            "sendfile",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))],
        ),
        entry(
            "tcp_nopush",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))],
        ),
        // ── ssl ──────────────────────────────────────────────────────
        entry(
            "ssl_certificate",
            &[variant(HTTP_SERVER | STREAM_SERVER | MAIL_SERVER, stmt!(1, Some(1)))],
        ),
        entry(
            "ssl_certificate_key",
            &[variant(HTTP_SERVER | STREAM_SERVER | MAIL_SERVER, stmt!(1, Some(1)))],
        ),
        entry(
            "ssl_protocols",
            &[variant(HTTP | HTTP_SERVER | STREAM | STREAM_SERVER | MAIL | MAIL_SERVER, stmt!(1, None))],
        ),
        entry(
            "ssl_ciphers",
            &[variant(HTTP | HTTP_SERVER | STREAM | STREAM_SERVER | MAIL | MAIL_SERVER, stmt!(1, Some(1)))],
        ),
        entry(
            "ssl_prefer_server_ciphers",
            &[variant(HTTP | HTTP_SERVER | STREAM | STREAM_SERVER | MAIL | MAIL_SERVER, stmt!(1, Some(1)))],
        ),
        // ── proxy / upstream ─────────────────────────────────────────
        entry(
            "proxy_pass",
            &[variant(HTTP_LOCATION | HTTP_LOCATION_IF | HTTP_LIMIT_EXCEPT, stmt!(1, Some(1)))],
        ),
        entry(
            "proxy_set_header",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(2, Some(2)))],
        ),
        entry(
            "proxy_pass_header",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))],
        ),
        entry(
            "proxy_read_timeout",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))],
        ),
        entry(
            "proxy_connect_timeout",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))],
        ),
        entry("proxy_keepalive", &[variant(HTTP_UPSTREAM, stmt!(1, Some(1)))]),
        entry("resolver", &[variant(ANY, stmt!(1, None))]),
        entry("proxy_next_upstream", &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, None))]),
        // ── stream ───────────────────────────────────────────────────
        entry("proxy_timeout", &[variant(STREAM | STREAM_SERVER, stmt!(1, Some(1)))]),
        // ── mail ─────────────────────────────────────────────────────
        entry("smtp_auth", &[variant(MAIL | MAIL_SERVER, stmt!(1, None))]),
        entry("pop3_capabilities", &[variant(MAIL | MAIL_SERVER, stmt!(1, None))]),
        entry("imap_capabilities", &[variant(MAIL | MAIL_SERVER, stmt!(1, None))]),
        // ── logging/misc ambient directives legal almost anywhere ───
        entry("access_log", &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION | STREAM | STREAM_SERVER, stmt!(1, None))]),
        entry("add_header", &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION | HTTP_LOCATION_IF, stmt!(2, Some(3)))]),
        entry("default_type", &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))]),
        entry("charset", &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(1)))]),
        entry("expires", &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, stmt!(1, Some(2)))]),
        // ── lua-nginx-module (openresty) ─────────────────────────────
        entry(
            "lua_shared_dict",
            &[variant(HTTP, stmt!(2, Some(2)))],
        ),
        entry(
            "lua_package_path",
            &[variant(HTTP, stmt!(1, Some(1)))],
        ),
        entry(
            "content_by_lua_block",
            &[variant(HTTP_SERVER | HTTP_LOCATION, block!(0, Some(0)))],
        ),
        entry(
            "access_by_lua_block",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, block!(0, Some(0)))],
        ),
        entry(
            "init_by_lua_block",
            &[variant(HTTP, block!(0, Some(0)))],
        ),
        entry(
            "log_by_lua_block",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, block!(0, Some(0)))],
        ),
        entry(
            "rewrite_by_lua_block",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, block!(0, Some(0)))],
        ),
        entry(
            "header_filter_by_lua_block",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, block!(0, Some(0)))],
        ),
        entry(
            "body_filter_by_lua_block",
            &[variant(HTTP | HTTP_SERVER | HTTP_LOCATION, block!(0, Some(0)))],
        ),
    ]
}

const fn variant(contexts: ContextMask, arity: ArityRule) -> DirectiveVariant {
    DirectiveVariant { contexts, arity }
}

fn entry(name: &'static str, variants: &'static [DirectiveVariant]) -> CatalogEntry {
    CatalogEntry { name, variants }
}

impl CatalogEntry {
    /// Whether any variant admits this context/arity/shape combination.
    pub fn admits(&self, context: ContextMask, arg_count: usize, is_block: bool) -> bool {
        self.variants
            .iter()
            .any(|v| v.contexts & context != 0 && v.arity.accepts(arg_count, is_block))
    }

    /// Whether any variant admits this context at all, regardless of arity.
    pub fn admits_context(&self, context: ContextMask) -> bool {
        self.variants.iter().any(|v| v.contexts & context != 0)
    }

    /// Whether any variant (in any context) accepts this arity/shape.
    pub fn admits_arity(&self, arg_count: usize, is_block: bool) -> bool {
        self.variants.iter().any(|v| v.arity.accepts(arg_count, is_block))
    }
}

//! Integration tests covering representative real-world nginx configuration
//! shapes end to end: parse, legality, and faithful/pretty emission.

use nginx_conf_parser::builder::{build_faithful, build_pretty, PrettyOptions};
use nginx_conf_parser::parser::{parse_string, ParseOptions};

const FULL_HTTP_SERVER: &str = r#"
user  nginx;
worker_processes  auto;

events {
    worker_connections  1024;
}

http {
    include       mime.types;
    default_type  application/octet-stream;

    server {
        listen       80;
        server_name  example.com;

        location / {
            root   /usr/share/nginx/html;
            index  index.html index.htm;
        }

        location /api/ {
            proxy_pass http://backend;
            proxy_set_header Host $host;
        }
    }

    upstream backend {
        server 127.0.0.1:8080;
        server 127.0.0.1:8081;
    }
}
"#;

const STREAM_BLOCK: &str = r#"
stream {
    upstream db {
        server 10.0.0.1:5432;
    }

    server {
        listen 5432;
        proxy_pass db;
    }
}
"#;

const LUA_DIRECTIVES: &str = r#"
http {
    server {
        location /hello {
            content_by_lua_block {
                ngx.say("hello, " .. ngx.var.arg_name)
            }
        }
    }
}
"#;

#[test]
fn parses_full_http_server_without_errors() {
    let outcome = parse_string(FULL_HTTP_SERVER, &ParseOptions::default()).expect("parse should succeed");
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.config.directives().count(), 4); // user, worker_processes, events, http
}

#[test]
fn parses_stream_block_without_errors() {
    let outcome = parse_string(STREAM_BLOCK, &ParseOptions::default()).expect("parse should succeed");
    assert!(outcome.errors.is_empty());
}

#[test]
fn parses_lua_content_block_as_raw_text() {
    let outcome = parse_string(LUA_DIRECTIVES, &ParseOptions::default()).expect("parse should succeed");
    let http = outcome.config.directives().next().unwrap();
    let server = http.block.as_ref().unwrap().directives().next().unwrap();
    let location = server.block.as_ref().unwrap().directives().next().unwrap();
    let lua_directive = location.block.as_ref().unwrap().directives().next().unwrap();
    assert!(lua_directive.is("content_by_lua_block"));
    let block = lua_directive.block.as_ref().unwrap();
    assert!(block.is_raw());
    assert!(block.raw_content.as_ref().unwrap().contains("ngx.say"));
}

#[test]
fn faithful_build_is_byte_identical_to_source() {
    for source in [FULL_HTTP_SERVER, STREAM_BLOCK, LUA_DIRECTIVES] {
        let outcome = parse_string(source, &ParseOptions::default()).expect("parse should succeed");
        assert_eq!(build_faithful(&outcome.config), source);
    }
}

#[test]
fn pretty_build_reparses_to_the_same_tree_shape() {
    let outcome = parse_string(FULL_HTTP_SERVER, &ParseOptions::default()).unwrap();
    let pretty = build_pretty(&outcome.config, &PrettyOptions::default());
    let reparsed = parse_string(&pretty, &ParseOptions::default()).expect("pretty output should re-parse");
    assert_eq!(reparsed.config.all_directives().count(), outcome.config.all_directives().count());
}

#[test]
fn strict_mode_rejects_unknown_directives() {
    let options = ParseOptions { strict: true, catch_errors: false, ..ParseOptions::default() };
    let err = parse_string("main_conf_made_up_directive 1;\n", &options).unwrap_err();
    assert!(matches!(err, nginx_conf_parser::ParseError::UnknownDirective { .. }));
}

#[test]
fn non_strict_mode_tolerates_unknown_directives() {
    let outcome = parse_string("main_conf_made_up_directive 1;\n", &ParseOptions::default()).unwrap();
    assert_eq!(outcome.config.directives().count(), 1);
}

#[test]
fn catch_errors_gathers_multiple_violations_in_one_pass() {
    let source = "listen 80;\nproxy_pass http://x;\nworker_processes 1;\n";
    let options = ParseOptions { catch_errors: true, ..ParseOptions::default() };
    let outcome = parse_string(source, &options).unwrap();
    assert_eq!(outcome.errors.len(), 2);
    assert_eq!(outcome.config.directives().count(), 1);
}

#[test]
fn if_condition_is_parsed_as_a_single_argument() {
    let source = r#"
http {
    server {
        location / {
            if ($request_method = POST) {
                return 405;
            }
        }
    }
}
"#;
    let outcome = parse_string(source, &ParseOptions::default()).expect("parse should succeed");
    assert!(outcome.errors.is_empty(), "unexpected errors: {:?}", outcome.errors);

    let http = outcome.config.directives().next().unwrap();
    let server = http.block.as_ref().unwrap().directives().next().unwrap();
    let location = server.block.as_ref().unwrap().directives().next().unwrap();
    let if_directive = location.block.as_ref().unwrap().directives().next().unwrap();

    assert!(if_directive.is("if"));
    assert_eq!(if_directive.args.len(), 1);
    assert_eq!(if_directive.args[0].raw, "($request_method = POST)");

    let return_directive = if_directive.block.as_ref().unwrap().directives().next().unwrap();
    assert!(return_directive.is("return"));
    assert_eq!(return_directive.args.len(), 1);
}

#[test]
fn set_captures_its_value_as_one_verbatim_argument() {
    let outcome = parse_string("set $backend upstream_one;\n", &ParseOptions::default())
        .expect("parse should succeed");
    assert!(outcome.errors.is_empty(), "unexpected errors: {:?}", outcome.errors);
    let directive = outcome.config.directives().next().unwrap();
    assert!(directive.is("set"));
    assert_eq!(directive.args.len(), 2);
    assert_eq!(directive.args[0].raw, "$backend");
    assert_eq!(directive.args[1].raw, "upstream_one");
}

#[test]
fn if_condition_round_trips_through_faithful_build() {
    let source = "http {\n    server {\n        location / {\n            if ($request_method = POST) {\n                return 405;\n            }\n        }\n    }\n}\n";
    let outcome = parse_string(source, &ParseOptions::default()).expect("parse should succeed");
    assert_eq!(build_faithful(&outcome.config), source);
}

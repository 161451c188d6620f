use super::Commands;
use nginx_conf_parser::parser::ParseOptions;
use nginx_conf_parser::{include::IncludedFile, parse_string, parse_tree, payload};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

pub fn run(command: Commands) -> ExitCode {
    let Commands::Parse {
        file,
        no_catch,
        single,
        strict,
        no_check_ctx,
        no_check_args,
        ignore,
        include_comments,
        combine,
        pretty,
    } = command
    else {
        unreachable!("run_parse called with a non-Parse command");
    };

    let options = ParseOptions {
        catch_errors: !no_catch,
        ignore,
        single,
        strict,
        check_ctx: !no_check_ctx,
        check_args: !no_check_args,
        comments: include_comments,
    };

    let files: Vec<IncludedFile> = if file.as_os_str() == "-" {
        let mut content = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut content) {
            eprintln!("error reading from stdin: {e}");
            return ExitCode::from(2);
        }
        let result = parse_string(&content, &options);
        vec![IncludedFile { path: PathBuf::from("<stdin>"), config: result }]
    } else {
        if !file.is_file() {
            eprintln!("error: {} is not a file", file.display());
            return ExitCode::from(2);
        }
        parse_tree(&file, &options)
    };

    let payload = payload::build_payload(&files, options.comments);
    let payload = if combine { payload::combine(payload) } else { payload };
    let json = if pretty {
        serde_json::to_string_pretty(&payload)
    } else {
        serde_json::to_string(&payload)
    };

    match json {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error serializing payload: {e}");
            return ExitCode::from(2);
        }
    }

    match payload.status {
        payload::Status::Ok => ExitCode::SUCCESS,
        payload::Status::Failed => ExitCode::from(1),
    }
}

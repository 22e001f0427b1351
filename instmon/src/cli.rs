//! Argument parsing for the `instmon` binary.

use crate::api::DEFAULT_API;
use crate::ws::DEFAULT_WS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add { name: String, ip: String },
    Remove { id: i64 },
    Watch { instance_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub api: String,
    pub ws: String,
    pub command: Command,
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--api URL|-a URL] [--ws URL|-w URL] <COMMAND>\n\
         Commands:\n  \
           list             list registered instances\n  \
           add NAME IP      register an instance\n  \
           rm ID            remove an instance\n  \
           watch ID         live dashboard for an instance\n\
         Environment: INSTMON_API (default {DEFAULT_API}), INSTMON_WS (default {DEFAULT_WS})"
    )
}

/// `Err` carries the text to print: usage for `--help`, or an error plus usage.
pub fn parse_args<I, F>(args: I, env: F) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
    F: Fn(&str) -> Option<String>,
{
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "instmon".into());
    let mut api = env("INSTMON_API").filter(|v| !v.is_empty());
    let mut ws = env("INSTMON_WS").filter(|v| !v.is_empty());
    let mut positional: Vec<String> = Vec::new();

    let bad = |msg: &str| format!("{msg}\n{}", usage(&prog));
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "--api" | "-a" | "--ws" | "-w" => {
                let Some(v) = it.next() else {
                    return Err(bad(&format!("Missing value for {arg}")));
                };
                if arg == "--api" || arg == "-a" {
                    api = Some(v);
                } else {
                    ws = Some(v);
                }
            }
            _ if arg.starts_with("--api=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    api = Some(v.to_string());
                }
            }
            _ if arg.starts_with("--ws=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    ws = Some(v.to_string());
                }
            }
            _ => positional.push(arg),
        }
    }

    let command = match positional.as_slice() {
        [cmd] if cmd == "list" || cmd == "ls" => Command::List,
        [cmd, name, ip] if cmd == "add" => Command::Add {
            name: name.clone(),
            ip: ip.clone(),
        },
        [cmd, id] if cmd == "rm" || cmd == "delete" => Command::Remove {
            id: id
                .parse()
                .map_err(|_| bad(&format!("invalid instance id: {id}")))?,
        },
        [cmd, id] if cmd == "watch" => {
            if id.is_empty() {
                return Err(bad("instance id must not be empty"));
            }
            Command::Watch {
                instance_id: id.clone(),
            }
        }
        [] => return Err(usage(&prog)),
        _ => return Err(bad("Unexpected arguments.")),
    };

    Ok(ParsedArgs {
        api: api.unwrap_or_else(|| DEFAULT_API.to_string()),
        ws: ws.unwrap_or_else(|| DEFAULT_WS.to_string()),
        command,
    })
}

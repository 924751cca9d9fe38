use rhyme_core::config::EngineConfig;
use rhyme_core::error::OverrideError;
use rhyme_core::{Candidate, RhymeEngine, SortMode};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

// Line protocol for a host UI process. One command per stdin line, one JSON
// object per stdout line. stdout carries nothing else, so diagnostics go to a
// log file.

fn get_config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("rhyme_config.json"))
}

fn get_log_path() -> PathBuf {
    let mut path = PathBuf::from("target");
    path.push("rhyme_bridge.log");
    path
}

/// Makes sure the log can be written, starting each run with an empty file.
fn prepare_log(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    File::create(path).map(drop)
}

fn log(message: &str) {
    if let Ok(mut file) = File::options().create(true).append(true).open(get_log_path()) {
        let _ = writeln!(file, "{}", message);
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Reply<'a> {
    Ready {
        enabled: bool,
        mode: SortMode,
    },
    Candidates {
        base: &'a str,
        enabled: bool,
        mode: SortMode,
        candidates: Vec<Candidate>,
    },
    Mutation {
        changed: bool,
        persisted: bool,
    },
    Count {
        count: u64,
    },
    Error {
        message: String,
    },
}

fn main() -> io::Result<()> {
    if let Err(e) = prepare_log(&get_log_path()) {
        eprintln!("rhyme_bridge: log disabled: {}", e);
    }
    log("--- Rhyme bridge starting ---");

    let config = EngineConfig::load_or_default(Path::new(&get_config_path()));
    let mut engine = RhymeEngine::from_config(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut base = String::new();

    send(
        &mut stdout,
        &Reply::Ready {
            enabled: engine.is_enabled(),
            mode: engine.sort_mode(),
        },
    )?;

    for line in stdin.lock().lines() {
        let input = line?;
        log(&format!("<- {:?}", input));
        let mut parts = input.split_whitespace();
        let command = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();

        let reply = match command {
            "LOAD_VOCAB" => {
                engine.set_vocabulary(args.iter().copied());
                Reply::Count {
                    count: engine.vocabulary().len() as u64,
                }
            }
            "SELECT" => {
                base = args.join(" ");
                candidates_reply(&engine, &base)
            }
            "SORT" => match args.first().map(|m| m.parse::<SortMode>()) {
                Some(Ok(mode)) => {
                    engine.set_sort_mode(mode);
                    candidates_reply(&engine, &base)
                }
                Some(Err(message)) => Reply::Error { message },
                None => {
                    engine.cycle_sort_mode();
                    candidates_reply(&engine, &base)
                }
            },
            "REJECT" | "UNREJECT" | "ADD" | "REMOVE" | "SLANT" | "UNSLANT" => {
                let Some(word) = args.first() else {
                    send(&mut stdout, &Reply::Error { message: "missing word".into() })?;
                    continue;
                };
                let result = match command {
                    "REJECT" => engine.reject(&base, word),
                    "UNREJECT" => engine.unreject(&base, word),
                    "ADD" => engine.add_manual(&base, word),
                    "REMOVE" => engine.remove_manual(&base, word),
                    "SLANT" => engine.tag_slant(&base, word),
                    _ => engine.untag_slant(&base, word),
                };
                mutation_reply(result)
            }
            "USE" => Reply::Count {
                count: args.first().map(|w| engine.record_usage(w)).unwrap_or(0),
            },
            "EXIT" => {
                log("Received EXIT, saving usage counts.");
                if let Err(e) = engine.save_usage() {
                    log(&format!("Error saving usage: {}", e));
                }
                break;
            }
            other => Reply::Error {
                message: format!("unknown command '{}'", other),
            },
        };
        send(&mut stdout, &reply)?;
    }
    log("Shutting down.");
    Ok(())
}

fn candidates_reply<'a>(engine: &RhymeEngine, base: &'a str) -> Reply<'a> {
    Reply::Candidates {
        base,
        enabled: engine.is_enabled(),
        mode: engine.sort_mode(),
        candidates: engine.get_candidates_ranked(base, engine.sort_mode()),
    }
}

fn mutation_reply(result: Result<bool, OverrideError>) -> Reply<'static> {
    match result {
        Ok(changed) => Reply::Mutation {
            changed,
            persisted: true,
        },
        Err(OverrideError::Persist(e)) => {
            log(&format!("Persistence failed: {}", e));
            Reply::Mutation {
                changed: true,
                persisted: false,
            }
        }
        Err(OverrideError::Rejected(reason)) => Reply::Error {
            message: reason.to_string(),
        },
    }
}

fn send(stdout: &mut io::Stdout, reply: &Reply<'_>) -> io::Result<()> {
    let json = serde_json::to_string(reply).map_err(io::Error::other)?;
    log(&format!("-> {}", json));
    writeln!(stdout, "{}", json)?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_directory_is_created_and_old_log_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh").join("target").join("rhyme_bridge.log");
        prepare_log(&path).unwrap();
        assert!(path.exists());

        std::fs::write(&path, "previous run\n").unwrap();
        prepare_log(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn missing_base_manual_add_is_an_error_reply() {
        let reply = mutation_reply(Err(rhyme_core::error::ManualRejection::MissingBase.into()));
        assert!(matches!(reply, Reply::Error { message } if message == "no base word selected"));
    }
}

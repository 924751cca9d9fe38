use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use rhyme_core::config::EngineConfig;
use rhyme_core::core::tier::group_by_tier;
use rhyme_core::{RhymeEngine, SortMode, Tier};
use std::fs;
use std::io::{self, stdin, stdout, Write};
use std::path::{Path, PathBuf};

const CONFIG_PATH: &str = "rhyme_config.json";
const DATASET_PATH: &str = "rhyme_data.json";
const OVERRIDES_PATH: &str = "rhyme_overrides.json";
const USAGE_PATH: &str = "rhyme_usage.json";

fn session_config() -> EngineConfig {
    let mut config = EngineConfig::load_or_default(Path::new(CONFIG_PATH));
    config.phoneme_data_path.get_or_insert_with(|| PathBuf::from(DATASET_PATH));
    config.overrides_path.get_or_insert_with(|| PathBuf::from(OVERRIDES_PATH));
    config.usage_path.get_or_insert_with(|| PathBuf::from(USAGE_PATH));
    config
}

fn main() -> io::Result<()> {
    let mut engine = RhymeEngine::from_config(session_config());
    if !engine.is_enabled() {
        eprintln!("[ERROR] Phoneme dataset could not be loaded; rhyme lookup is disabled.");
    }
    let mut words: Vec<String> = engine
        .lexicon()
        .map(|store| store.words().map(str::to_string).collect())
        .unwrap_or_default();
    words.sort();
    engine.set_vocabulary(words);

    let mut base = String::new();
    let mut status = String::from("Type a word and press [Enter].");

    loop {
        print_ui(&engine, &base, &status)?;
        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim();

        status = match cmd {
            "exit" => break,
            "" => continue,
            s if s.starts_with(':') => run_command(&mut engine, &base, &s[1..]),
            s => {
                base = s.to_string();
                format!("Selected '{}'.", base)
            }
        };
    }

    println!("\nSaving usage counts...");
    if let Err(e) = engine.save_usage() {
        eprintln!("[ERROR] Could not save usage counts: {}", e);
    }
    Ok(())
}

/// Handles `:verb argument` commands. Returns the status line to display.
fn run_command(engine: &mut RhymeEngine, base: &str, line: &str) -> String {
    let (verb, arg) = match line.split_once(' ') {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };
    if base.is_empty() && !matches!(verb, "sort" | "vocab") {
        return "Select a base word first.".to_string();
    }
    let target = resolve_target(engine, base, arg);

    let outcome = match verb {
        "sort" if arg.is_empty() => Ok(format!("Sorting by {}.", engine.cycle_sort_mode())),
        "sort" => match arg.parse::<SortMode>() {
            Ok(mode) => {
                engine.set_sort_mode(mode);
                Ok(format!("Sorting by {}.", mode))
            }
            Err(e) => Ok(e),
        },
        "vocab" => Ok(load_vocabulary(engine, arg)),
        "r" => engine.reject(base, &target).map(|_| format!("Rejected '{}'.", target)),
        "u" => engine.unreject(base, &target).map(|_| format!("Restored '{}'.", target)),
        "a" => engine.add_manual(base, &target).map(|_| format!("Added '{}'.", target)),
        "d" => engine.remove_manual(base, &target).map(|_| format!("Removed '{}'.", target)),
        "s" => engine.toggle_slant(base, &target).map(|tagged| {
            if tagged {
                format!("Tagged '{}' as slant.", target)
            } else {
                format!("Untagged '{}'.", target)
            }
        }),
        "use" => {
            let count = engine.record_usage(&target);
            Ok(format!("'{}' used {} time(s).", target, count))
        }
        other => Ok(format!("Unknown command ':{}'.", other)),
    };
    outcome.unwrap_or_else(|e| format!("[!] {}", e))
}

/// `:r 2` refers to the second listed suggestion; anything else is a word.
fn resolve_target(engine: &RhymeEngine, base: &str, arg: &str) -> String {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => engine
            .suggestions(base)
            .into_iter()
            .nth(n - 1)
            .unwrap_or_else(|| arg.to_string()),
        _ => arg.to_string(),
    }
}

/// Replaces the vocabulary with a word list, one word per line.
fn load_vocabulary(engine: &mut RhymeEngine, path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(text) => {
            let words: Vec<&str> = text.lines().map(str::trim).filter(|w| !w.is_empty()).collect();
            let count = words.len();
            engine.set_vocabulary(words);
            format!("Loaded {} words from '{}'.", count, path)
        }
        Err(e) => format!("Could not read '{}': {}", path, e),
    }
}

fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Perfect => Color::Green,
        Tier::Strong => Color::Cyan,
        Tier::Standard => Color::White,
        Tier::Weak => Color::DarkGrey,
        Tier::Manual => Color::Yellow,
        Tier::Slant => Color::Magenta,
        Tier::Unknown => Color::DarkRed,
    }
}

fn print_ui(engine: &RhymeEngine, base: &str, status: &str) -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{}", "Freestyle Rhyme Finder".bold());
    println!("---------------------------------------------------------------");
    println!("Type a word to select it. ':sort [mode]' ':r N' ':u word' ':a word'");
    println!("':d word' ':s N' ':use N' ':vocab file'. 'exit' to save and quit.\n");

    if !engine.is_enabled() {
        println!("{}", "Rhyme lookup disabled (no phoneme data).".red());
    }
    println!("Sort mode: {}   Vocabulary: {} words", engine.sort_mode(), engine.vocabulary().len());

    if !base.is_empty() {
        let ranked = engine.get_candidates_ranked(base, engine.sort_mode());
        println!("\nRhymes for [{}]:", base.bold());
        if ranked.is_empty() {
            println!("  No rhymes found.");
        } else if engine.sort_mode() == SortMode::Similarity {
            let mut index = 0;
            for (tier, group) in group_by_tier(&ranked) {
                println!("  -- {} --", tier.label().with(tier_color(tier)));
                for candidate in group {
                    index += 1;
                    println!("  :{}: {} ({:.2})", index, candidate.word, candidate.score);
                }
            }
        } else {
            for (i, candidate) in ranked.iter().enumerate() {
                let word = candidate.word.as_str().with(tier_color(candidate.tier));
                println!("  :{}: {} [{}]", i + 1, word, candidate.tier);
            }
        }
    }

    println!("\n{}", status);
    print!("\n> ");
    out.flush()
}

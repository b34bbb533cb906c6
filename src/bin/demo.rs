//! Smoke-test CLI exercising the automata core: parse a regex and test a word against it,
//! or dump a handful of sample automata as graphviz `.dot` files.
//!
//! Grounded on `HeroicKatora-automata/src/bin/test.rs`'s "build a couple of automata and
//! dump dot files" shape, modernized with a `clap`-derive front-end (the pack's clearest
//! small `clap` binary is `strem-org-strem/src/bin/strem/cli.rs`) and `tracing-subscriber`
//! for `RUST_LOG`-driven logging. Not a supported product surface (spec.md §1) — the CLI
//! front-end itself is out of core scope; this is the ambient "does it run" tooling the
//! teacher repo also ships.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use automata::alphabet::Alphabet;
use automata::{parser as regex_parser, sample};

#[derive(Parser)]
#[command(name = "automata-demo", version, about = "Smoke-test CLI for the automata core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a regex over the default `a`,`b` alphabet and test it against a word.
    Match {
        /// Regex concrete syntax (spec.md §6), e.g. "(a+b)*ab".
        regex: String,
        /// The word to test for membership.
        word: String,
    },
    /// Dump a handful of sample automata as graphviz `.dot` files.
    Dot {
        /// Directory to write `.dot` files into.
        #[arg(long, default_value = "./output")]
        out_dir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Match { regex, word } => run_match(&regex, &word),
        Command::Dot { out_dir } => run_dot(&out_dir),
    }
}

fn run_match(regex: &str, word: &str) {
    let alphabet = Alphabet::default_ab();
    match regex_parser::parse(regex, &alphabet) {
        Ok(re) => {
            let accepted = re.accepts(word);
            info!(%regex, %word, accepted, "parsed regex and tested word");
            println!("{}", accepted);
        }
        Err(err) => {
            eprintln!("error parsing regex {:?}: {}", regex, err);
            std::process::exit(1);
        }
    }
}

fn run_dot(out_dir: &PathBuf) {
    std::fs::create_dir_all(out_dir).expect("failed to create output directory");
    let alphabet = Alphabet::default_ab();

    let automata = [
        ("ends_with_ab", sample::ends_with(&alphabet, "ab").automaton),
        ("subword_abb", sample::subword(&alphabet, "abb").automaton),
        ("all_words", sample::all_words(&alphabet).automaton),
        ("minimize1", sample::minimize1(&alphabet).automaton.minimize()),
    ];

    for (name, automaton) in automata {
        let path = out_dir.join(format!("{name}.dot"));
        let mut output = Vec::new();
        automaton.write_dot(&mut output).expect("failed to render dot file");
        std::fs::write(&path, output).expect("failed to write dot file");
        info!(path = %path.display(), "wrote automaton dot file");
    }
}

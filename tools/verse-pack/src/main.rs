use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "--version") {
        println!(
            "verse-pack {} built {}",
            env!("VERSE_PACK_VERSION"),
            env!("VERSE_PACK_BUILD_TIME")
        );
        return;
    }
    if args.len() < 2 {
        eprintln!("Usage: verse-pack <source.tsv> <out_dir> [--per-slot N] [--level L]");
        std::process::exit(1);
    }

    let input = args.remove(0);
    let output = args.remove(0);
    let mut options = verse_pack::Options::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--per-slot" => {
                i += 1;
                match args.get(i).and_then(|s| s.parse::<usize>().ok()) {
                    Some(n) if n > 0 => options.per_slot = n,
                    _ => {
                        eprintln!("--per-slot needs a positive number");
                        std::process::exit(1);
                    }
                }
            }
            "--level" => {
                i += 1;
                match args.get(i).and_then(|s| s.parse::<u8>().ok()) {
                    Some(level) if level <= 10 => options.level = level,
                    _ => {
                        eprintln!("--level needs a number between 0 and 10");
                        std::process::exit(1);
                    }
                }
            }
            other => log::warn!("ignoring unknown argument {other}"),
        }
        i += 1;
    }

    match verse_pack::build(Path::new(&input), Path::new(&output), &options) {
        Ok(summary) => println!(
            "Wrote pack to {output}: {} / {} times filled",
            summary.filled,
            verseclock_core::store::SLOT_COUNT
        ),
        Err(err) => {
            eprintln!("Pack build failed: {err}");
            std::process::exit(1);
        }
    }
}

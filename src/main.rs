#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!(
        "The aica-render CLI requires the \"cli\" feature. Rebuild with `--features cli` to enable it."
    );
}

#[cfg(feature = "cli")]
mod cli {
    use std::env;
    use std::path::PathBuf;
    use std::time::Instant;

    use anyhow::{bail, Context, Result};
    use log::LevelFilter;

    use aica::{MixingMode, Session, SAMPLE_RATE};

    const USAGE: &str = "usage: aica-render [-v|-vv|-vvv] [--batched] <session.json> <out.wav>";

    struct Arguments {
        session: PathBuf,
        output: PathBuf,
        verbose: u8,
        batched: bool,
    }

    fn parse_args() -> Result<Arguments> {
        let mut positional = Vec::new();
        let mut verbose = 0u8;
        let mut batched = false;

        for arg in env::args().skip(1) {
            match arg.as_str() {
                "-h" | "--help" => {
                    println!("{USAGE}");
                    std::process::exit(0);
                }
                "--batched" => batched = true,
                "--verbose" => verbose = verbose.saturating_add(1),
                flag if flag.starts_with("-v") && flag[1..].chars().all(|c| c == 'v') => {
                    verbose = verbose.saturating_add((flag.len() - 1) as u8);
                }
                flag if flag.starts_with('-') => bail!("unknown option {flag}\n{USAGE}"),
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        let [session, output]: [PathBuf; 2] = positional
            .try_into()
            .map_err(|_| anyhow::anyhow!("expected a session file and an output file\n{USAGE}"))?;

        Ok(Arguments {
            session,
            output,
            verbose,
            batched,
        })
    }

    pub fn run() -> Result<()> {
        let args = parse_args()?;

        let level = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        simple_logger::SimpleLogger::new()
            .with_level(level)
            .init()
            .context("failed to install logger")?;

        let mut session = Session::from_json_file(&args.session)
            .with_context(|| format!("failed to load session {}", args.session.display()))?;
        if args.batched {
            session.config.mixing = MixingMode::Batched;
        }

        let start = Instant::now();
        let frames = session
            .render_to_wav(&args.output)
            .with_context(|| format!("failed to render to {}", args.output.display()))?;

        println!(
            "Rendered {} frames ({:.2}s of audio) to {} in {:.2}s",
            frames,
            frames as f64 / SAMPLE_RATE as f64,
            args.output.display(),
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::run()
}

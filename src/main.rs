use alien_invasion::app::{App, REPORT_PATH};
use alien_invasion::settings::Settings;
use color_eyre::{Result, eyre::bail};
use crossterm::{
    cursor::Show,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

const USAGE: &str = "usage: alien_invasion [--config <settings.json>] [--log-file <path>]";

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    log_file: PathBuf,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args {
        config: None,
        log_file: PathBuf::from("alien_invasion.log"),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(path) => parsed.config = Some(path.into()),
                None => bail!("--config needs a path\n{USAGE}"),
            },
            "--log-file" => match args.next() {
                Some(path) => parsed.log_file = path.into(),
                None => bail!("--log-file needs a path\n{USAGE}"),
            },
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument `{other}`\n{USAGE}"),
        }
    }
    Ok(parsed)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = parse_args(std::env::args().skip(1))?;

    // The terminal belongs to the game, so logs go to a file
    let log_file = File::create(&args.log_file)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    }
    .validate()?;

    let supports_keyboard_enhancement = matches!(
        crossterm::terminal::supports_keyboard_enhancement(),
        Ok(true)
    );
    log::info!("Keyboard enhancement supported: {supports_keyboard_enhancement}");

    // Setup terminal manually for full control
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Key release events need the enhancement flags, pushed after entering the alternate screen
    if supports_keyboard_enhancement {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }

    let result = Terminal::new(CrosstermBackend::new(stdout))
        .map_err(Into::into)
        .and_then(|terminal| App::new(settings, terminal, PathBuf::from(REPORT_PATH)).run());

    // Cleanup
    let mut stdout = std::io::stdout();
    if supports_keyboard_enhancement {
        execute!(stdout, PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen, Show)?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let parsed = args(&[]).unwrap();
        assert!(parsed.config.is_none());
        assert_eq!(parsed.log_file, PathBuf::from("alien_invasion.log"));
    }

    #[test]
    fn test_paths() {
        let parsed = args(&["--config", "easy.json", "--log-file", "/tmp/game.log"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("easy.json")));
        assert_eq!(parsed.log_file, PathBuf::from("/tmp/game.log"));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--fullscreen"]).is_err());
    }
}

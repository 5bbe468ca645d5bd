//! Command-line interface for `voice-panel`

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use voice_panel_domain::Language;

use crate::audio::AudioStitcher;
use crate::config::PanelConfig;
use crate::panel::{PanelRenderer, PanelRequest};
use crate::script::{DEFAULT_PANEL, ScriptGenerator, TemplateStore, preview_markdown};
use crate::setup;
use crate::utils::{ensure_dir, format_duration, sanitize_filename};
use crate::voice::{ElevenLabsVoiceModel, VoiceCloner};

/// Voice Panel - celebrity panel discussions from cloned voices
#[derive(Parser, Debug)]
#[command(name = "voice-panel", author, version, about)]
pub struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a panel discussion on a topic
    Panel(PanelArgs),
    /// Speak custom text in one character's voice
    Single(SingleArgs),
    /// List characters and topics
    List(ListArgs),
    /// Print the generated script without synthesising it
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
pub struct PanelArgs {
    /// Discussion topic
    pub topic: String,

    /// Speaking order (defaults to the built-in panel)
    #[arg(long, num_args = 1..)]
    pub characters: Vec<String>,

    /// Output WAV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Silence between speakers in milliseconds
    #[arg(long)]
    pub pause_ms: Option<u32>,

    /// Keep each clip at its original loudness
    #[arg(long)]
    pub no_normalize: bool,

    /// WAV file crossfaded before the panel
    #[arg(long)]
    pub intro: Option<PathBuf>,

    /// WAV file crossfaded after the panel
    #[arg(long)]
    pub outro: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SingleArgs {
    /// Character id
    pub character: String,

    /// Text to speak
    pub text: String,

    /// Language tag; "Auto" lets the model detect it
    #[arg(short, long, default_value = Language::AUTO)]
    pub language: String,

    /// Output WAV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// List characters
    #[arg(long)]
    pub characters: bool,

    /// List topics
    #[arg(long)]
    pub topics: bool,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Discussion topic
    pub topic: String,

    /// Speaking order (defaults to the built-in panel)
    #[arg(long, num_args = 1..)]
    pub characters: Vec<String>,
}

/// Default output for a panel on `topic`.
pub fn default_panel_output(config: &PanelConfig, topic: &str) -> PathBuf {
    config
        .generated_dir()
        .join(format!("panel_{}.wav", sanitize_filename(topic)))
}

/// Default output for a single custom utterance.
pub fn default_single_output(config: &PanelConfig, character: &str) -> PathBuf {
    config
        .generated_dir()
        .join(format!("{}_custom.wav", sanitize_filename(character)))
}

/// Parse-independent entry point used by `main`.
pub fn run(cli: Cli) -> Result<()> {
    let config = PanelConfig::discover(cli.config.as_deref()).context("Failed to load config")?;
    setup::init_tracing(config.debug || cli.verbose).map_err(anyhow::Error::msg)?;

    let characters_file = config.characters_file();
    let store = TemplateStore::load(&characters_file)
        .with_context(|| format!("Failed to load templates from {}", characters_file.display()))?;
    if store.is_empty() {
        bail!("No characters defined in {}", characters_file.display());
    }
    let generator = ScriptGenerator::new(store);

    match cli.command {
        Commands::List(args) => list(&generator, &args),
        Commands::Preview(args) => preview(&generator, args),
        Commands::Panel(args) => panel(&config, &generator, args),
        Commands::Single(args) => single(&config, &generator, args),
    }
}

fn order(characters: Vec<String>) -> Option<Vec<String>> {
    (!characters.is_empty()).then_some(characters)
}

fn list(generator: &ScriptGenerator, args: &ListArgs) -> Result<()> {
    let show_characters = args.characters || !args.topics;

    if show_characters {
        println!("Characters:");
        for id in generator.available_characters() {
            if let Some(profile) = generator.store().character(&id) {
                println!("  {id:<12} {} ({})", profile.name, profile.language);
            }
        }
    }

    if args.topics {
        if show_characters {
            println!();
        }
        println!("Topics:");
        for topic in generator.available_topics() {
            println!("  {topic}");
        }
        let aliases = generator.store().aliases();
        if !aliases.is_empty() {
            println!("Aliases:");
            for (alias, canonical) in aliases {
                println!("  {alias} -> {canonical}");
            }
        }
    }

    Ok(())
}

fn preview(generator: &ScriptGenerator, args: PreviewArgs) -> Result<()> {
    let characters = order(args.characters);
    let script = generator.generate_panel_script(&args.topic, characters.as_deref());
    if script.is_empty() {
        bail!("No script lines generated; check the character ids");
    }
    print!("{}", preview_markdown(&script));
    Ok(())
}

fn panel(config: &PanelConfig, generator: &ScriptGenerator, args: PanelArgs) -> Result<()> {
    let characters = order(args.characters);
    let ids: Vec<String> = match &characters {
        Some(ids) => ids.clone(),
        None => DEFAULT_PANEL.iter().map(|s| s.to_string()).collect(),
    };

    let output = match args.output {
        Some(path) => path,
        None => {
            ensure_dir(config.generated_dir()).context("Failed to create output directory")?;
            default_panel_output(config, &args.topic)
        }
    };

    let mut request = PanelRequest::new(&args.topic, &output)
        .with_pause_ms(args.pause_ms.unwrap_or(config.pause_between_speakers_ms));
    request.characters = characters;
    request.normalize = !args.no_normalize;
    request.intro = args.intro;
    request.outro = args.outro;

    let model =
        ElevenLabsVoiceModel::from_settings(&config.model).context("Failed to set up voice model")?;
    let mut cloner = VoiceCloner::new(model);
    let stitcher = AudioStitcher::new(config.sample_rate);

    let pb = ProgressBar::new(100);
    let style = ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")
        .context("Failed to create progress bar template")?
        .progress_chars("█▉▊▋▌▍▎▏ ");
    pb.set_style(style);

    let result = {
        let mut renderer =
            PanelRenderer::new(generator, &mut cloner, &stitcher, config.voices_path());
        let report = renderer.load_voices(&ids);
        for (id, path) in &report.missing {
            pb.println(format!("⚠ no voice sample for {id} at {}", path.display()));
        }
        for (id, error) in &report.failed {
            pb.println(format!("⚠ could not clone {id}: {error}"));
        }
        renderer.render_panel(&request, &pb)
    };
    cloner.release_all();

    let outcome = result.context("Panel rendering failed")?;
    pb.finish_with_message("Done!");

    println!(
        "Saved {} of {} lines ({}) to {}",
        outcome.spoken.len(),
        outcome.script.len(),
        format_duration(outcome.audio.duration_secs()),
        outcome.output_path.display()
    );
    for failure in &outcome.failed {
        println!(
            "  skipped line {} ({}): {}",
            failure.index + 1,
            failure.character_id,
            failure.error
        );
    }
    Ok(())
}

fn single(config: &PanelConfig, generator: &ScriptGenerator, args: SingleArgs) -> Result<()> {
    let output = match args.output {
        Some(path) => path,
        None => {
            ensure_dir(config.generated_dir()).context("Failed to create output directory")?;
            default_single_output(config, &args.character)
        }
    };
    let language = Language::new(args.language);

    let model =
        ElevenLabsVoiceModel::from_settings(&config.model).context("Failed to set up voice model")?;
    let mut cloner = VoiceCloner::new(model);
    let stitcher = AudioStitcher::new(config.sample_rate);

    let result = {
        let mut renderer =
            PanelRenderer::new(generator, &mut cloner, &stitcher, config.voices_path());
        renderer.load_voices(&[args.character.as_str()]);
        renderer.render_single(&args.character, &args.text, Some(&language), &output)
    };
    cloner.release_all();

    let audio = result.context("Speech generation failed")?;
    println!(
        "Saved {} of {} to {}",
        format_duration(audio.duration_secs()),
        args.character,
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_panel_command() -> Result<()> {
        let cli = Cli::try_parse_from([
            "voice-panel",
            "panel",
            "AI",
            "--characters",
            "modi",
            "srk",
            "--pause-ms",
            "300",
            "--no-normalize",
            "-v",
        ])?;
        assert!(cli.verbose);
        let Commands::Panel(args) = cli.command else {
            bail!("expected panel command");
        };
        assert_eq!(args.topic, "AI");
        assert_eq!(args.characters, ["modi", "srk"]);
        assert_eq!(args.pause_ms, Some(300));
        assert!(args.no_normalize);
        Ok(())
    }

    #[test]
    fn parses_single_with_language() -> Result<()> {
        let cli = Cli::try_parse_from(["voice-panel", "single", "srk", "Hello!", "-l", "Hindi"])?;
        let Commands::Single(args) = cli.command else {
            bail!("expected single command");
        };
        assert_eq!(args.character, "srk");
        assert_eq!(args.language, "Hindi");
        assert!(args.output.is_none());
        Ok(())
    }

    #[test]
    fn single_language_defaults_to_auto() -> Result<()> {
        let cli = Cli::try_parse_from(["voice-panel", "single", "modi", "Namaste"])?;
        let Commands::Single(args) = cli.command else {
            bail!("expected single command");
        };
        assert_eq!(args.language, Language::AUTO);
        assert!(Language::new(args.language).is_auto());
        Ok(())
    }

    #[test]
    fn default_outputs_are_sanitized() {
        let config = PanelConfig::default();
        let path = default_panel_output(&config, "AI: the future");
        assert!(path.ends_with("outputs/generated/panel_AI__the_future.wav"));
        let path = default_single_output(&config, "srk");
        assert!(path.ends_with("outputs/generated/srk_custom.wav"));
    }
}

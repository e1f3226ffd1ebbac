use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use memebot::constants::DEFAULT_FONT_PATH;
use memebot::meme::{MemeComposer, MemeFont, SplitPolicy, clean};
use std::path::PathBuf;

/// Put a caption on a picture, no network involved.
///
/// Minimal UX:
///   compose_meme cat.jpg cat_meme.jpg "This cat is judging your life choices."
#[derive(Parser, Debug)]
#[command(name = "compose_meme")]
#[command(about = "Lay a caption out as top and bottom meme text on a local image")]
struct Args {
    /// Image to caption (jpeg or png)
    input: PathBuf,

    /// Where to write the meme; the format follows the extension
    output: PathBuf,

    /// Caption, cleaned and split the same way the bot does it
    caption: String,

    /// TTF/OTF font to draw with
    #[arg(long, default_value = DEFAULT_FONT_PATH, env = "MEMEBOT_FONT")]
    font: PathBuf,

    /// How to break the caption into two lines
    #[arg(long, value_enum, default_value_t = Policy::Balanced)]
    policy: Policy,

    /// Print the cleaned caption halves before drawing
    #[arg(long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    /// Half the words on each line
    Words,
    /// Roughly half the characters on each line
    Balanced,
}

impl From<Policy> for SplitPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Words => SplitPolicy::WordCount,
            Policy::Balanced => SplitPolicy::CharacterBalanced,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if !args.input.is_file() {
        return Err(anyhow!("No such image: {}", args.input.display()));
    }

    let font = MemeFont::load(&args.font)
        .with_context(|| format!("Failed to load font {}", args.font.display()))?;
    let policy = SplitPolicy::from(args.policy);

    if args.verbose {
        let halves = policy.split(&clean(&args.caption));
        println!("upper: {:?}", halves.upper);
        println!("lower: {:?}", halves.lower);
    }

    MemeComposer::new(font)
        .with_policy(policy)
        .compose(&args.input, &args.output, &args.caption)
        .with_context(|| format!("Failed to compose {}", args.output.display()))?;

    println!("Wrote {}", args.output.display());
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use md2docx::highlight::SyntectHighlighter;
use md2docx::Options;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Output .docx path.
    output: PathBuf,

    /// Glob selecting the Markdown files; matches are sorted before joining.
    #[arg(long, default_value = "*.md")]
    files: String,

    /// Also write the annotated intermediate HTML here.
    #[arg(long)]
    dump_html: Option<PathBuf>,

    /// Directory relative image paths are resolved against.
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Leave code blocks uncolored.
    #[arg(long)]
    no_highlight: bool,

    /// Syntax highlighting theme.
    #[arg(long, default_value = SyntectHighlighter::DEFAULT_THEME)]
    theme: String,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let opts = Options {
        files: args.files,
        base_dir: args.base_dir,
        dump_html: args.dump_html,
        highlight_theme: (!args.no_highlight).then_some(args.theme),
        ..Options::default()
    };
    md2docx::run(&args.output, &opts)
}

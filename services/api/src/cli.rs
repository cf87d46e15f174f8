use crate::quiz::{run_analyze, run_quiz, AnalyzeArgs, QuizArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mbti_insight::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "mbti-insight",
    about = "Score MBTI questionnaires and request AI personality analyses",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Take a questionnaire on the terminal and print the resulting analysis
    Quiz(QuizArgs),
    /// Print the analysis for a known four-letter type code
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quiz(args) => run_quiz(args).await,
        Command::Analyze(args) => run_analyze(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["mbti-insight"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn quiz_accepts_comma_separated_answers() {
        let cli = Cli::try_parse_from([
            "mbti-insight",
            "quiz",
            "--variant",
            "short",
            "--answers",
            "5,5,5,5,5,5,5,5",
            "--offline",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Quiz(args)) => {
                assert_eq!(args.variant, "short");
                assert_eq!(args.answers.as_deref(), Some("5,5,5,5,5,5,5,5"));
                assert!(args.offline);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn analyze_takes_a_positional_code() {
        let cli = Cli::try_parse_from(["mbti-insight", "analyze", "intj", "--long-context"])
            .expect("parses");

        match cli.command {
            Some(Command::Analyze(args)) => {
                assert_eq!(args.code, "intj");
                assert!(args.long_context);
                assert!(args.model.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
